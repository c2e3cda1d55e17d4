use std::env;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use kiln::config::{ConfigEngine, Settings};
use kiln::error::HostError;
use kiln::event::{EventBridge, QueuedSource, TerminalSource};
use kiln::logging::{self, LogTarget};
use kiln::render::Canvas;
use kiln::scripting::{Globals, HostContext, ScriptHost};

const USAGE: &str = "usage: kiln [--config FILE] [--replay EVENTS.json] [SCRIPT] [ARGS...]";

/// Replay mode draws into nothing; this is the size scripts see.
const REPLAY_SIZE: (u16, u16) = (80, 24);

#[derive(Debug, Default)]
struct Args {
    config: Option<PathBuf>,
    replay: Option<PathBuf>,
    script: Option<PathBuf>,
}

impl Args {
    /// Options come first; the first positional argument is the script and
    /// everything after it belongs to the script (visible through `ARGS`).
    fn parse(args: impl IntoIterator<Item = String>) -> Result<Self, String> {
        let mut parsed = Args::default();
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" => {
                    let file = args.next().ok_or("--config needs a file")?;
                    parsed.config = Some(PathBuf::from(file));
                }
                "--replay" => {
                    let file = args.next().ok_or("--replay needs a file")?;
                    parsed.replay = Some(PathBuf::from(file));
                }
                "-h" | "--help" => return Err(USAGE.to_string()),
                flag if flag.starts_with("--") => return Err(format!("unknown option {flag}")),
                _ => {
                    parsed.script = Some(PathBuf::from(arg));
                    break;
                }
            }
        }
        Ok(parsed)
    }
}

fn main() -> ExitCode {
    let args = match Args::parse(env::args().skip(1)) {
        Ok(args) => args,
        Err(msg) => {
            eprintln!("{msg}");
            return ExitCode::FAILURE;
        }
    };

    let target = match (&args.replay, logging::default_log_file()) {
        (None, Some(file)) => LogTarget::File(file),
        _ => LogTarget::Stderr,
    };
    logging::init_logging(target);

    match run(args) {
        Ok(None) => ExitCode::SUCCESS,
        Ok(Some((title, message))) => {
            eprintln!("{title}: {message}");
            ExitCode::FAILURE
        }
        Err(e) => {
            log::error!("{e}");
            eprintln!("kiln: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Runs the script; returns a fatal error the script reported, if any.
fn run(args: Args) -> Result<Option<(String, String)>, HostError> {
    let mut config = ConfigEngine::new();
    match &args.config {
        Some(path) => config.load_file(path)?,
        None => config.load_default()?,
    }
    let settings = config.settings();

    let script = args
        .script
        .clone()
        .or_else(|| settings.init_script.clone())
        .or_else(Settings::default_init_script)
        .ok_or_else(|| HostError::Config("no script given and no config directory".into()))?;
    let globals = Globals::detect(env::args().collect());

    if let Some(replay) = &args.replay {
        let source = QueuedSource::from_replay_file(replay)?;
        let (width, height) = REPLAY_SIZE;
        let canvas = Canvas::with_writer(io::sink(), width, height);
        let context = HostContext::new(EventBridge::new(source), canvas, settings);
        return run_script(context, &globals, &script);
    }

    Canvas::setup()?;
    let result = Canvas::terminal().map_err(HostError::from).and_then(|canvas| {
        let source = TerminalSource::new(Duration::from_millis(settings.double_click_ms));
        let context = HostContext::new(EventBridge::new(source), canvas, settings);
        run_script(context, &globals, &script)
    });
    // Restore the terminal even when the script failed
    Canvas::teardown()?;
    result
}

fn run_script(
    context: HostContext,
    globals: &Globals,
    script: &std::path::Path,
) -> Result<Option<(String, String)>, HostError> {
    let mut host = ScriptHost::new(context, globals);
    {
        let ctx = host.context();
        let mut ctx = ctx.borrow_mut();
        let title = ctx.window.title.clone();
        ctx.set_title(&title)?;
    }

    log::info!("running {}", script.display());
    let result = host.load_file(script);
    host.shutdown();
    let fatal = host.context().borrow_mut().take_fatal();
    result.map(|()| fatal)
}
