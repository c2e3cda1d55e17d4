//! system - events, time, window and filesystem
//!
//! Usage in Rhai:
//! ```rhai
//! loop {
//!     let ev = system::poll_event();
//!     if ev == () { system::wait_event(0.5); continue; }
//!     if ev[0] == "quit" { break; }
//! }
//! ```

use std::path::Path;
use std::rc::Rc;
use std::thread;
use std::time::Duration;

use log::warn;
use rhai::{Array, Dynamic, EvalAltResult, FnPtr, NativeCallContext};

use super::dirmonitor::run_deliveries;
use super::fs;
use crate::event::{EventArg, ScriptEvent};
use crate::scripting::context::{SharedContext, WINDOW_MODES};

/// `[kind, args...]`
pub fn event_to_array(event: &ScriptEvent) -> Array {
    let mut array = Array::new();
    array.push(Dynamic::from(event.kind().to_string()));
    for arg in event.payload() {
        array.push(match arg {
            EventArg::Str(s) => Dynamic::from(s),
            EventArg::Int(n) => Dynamic::from(n),
        });
    }
    array
}

fn seconds(secs: f64) -> Duration {
    Duration::try_from_secs_f64(secs.max(0.0)).unwrap_or(Duration::MAX)
}

fn wait(context: &SharedContext, timeout: Option<Duration>) -> Result<bool, Box<EvalAltResult>> {
    context
        .borrow_mut()
        .wait_event(timeout)
        .map_err(|e| e.to_string().into())
}

pub fn create_module(context: SharedContext) -> rhai::Module {
    let mut module = rhai::Module::new();

    // poll_event() -> [kind, args...] | ()
    {
        let ctx = Rc::clone(&context);
        module.set_native_fn(
            "poll_event",
            move |call: NativeCallContext| -> Result<Dynamic, Box<EvalAltResult>> {
                // The borrow must be released before callbacks run; they may
                // call back into the host.
                let deliveries = ctx.borrow_mut().watches.take_deliveries();
                run_deliveries(deliveries, |callback: &FnPtr, path| {
                    callback.call_within_context(&call, (path,))
                })?;

                let event = ctx.borrow_mut().poll_event().map_err(|e| e.to_string())?;
                Ok(match event {
                    Some(event) => Dynamic::from_array(event_to_array(&event)),
                    None => Dynamic::UNIT,
                })
            },
        );
    }

    // wait_event() / wait_event(seconds) -> bool
    {
        let ctx = Rc::clone(&context);
        module.set_native_fn("wait_event", move || wait(&ctx, None));
    }
    {
        let ctx = Rc::clone(&context);
        module.set_native_fn("wait_event", move |secs: f64| {
            wait(&ctx, Some(seconds(secs)))
        });
    }
    {
        let ctx = Rc::clone(&context);
        module.set_native_fn("wait_event", move |secs: i64| {
            wait(&ctx, Some(seconds(secs as f64)))
        });
    }

    {
        let ctx = Rc::clone(&context);
        module.set_native_fn(
            "get_time",
            move || -> Result<i64, Box<EvalAltResult>> { Ok(ctx.borrow().elapsed_secs()) },
        );
    }

    module.set_native_fn("sleep", |secs: f64| {
        thread::sleep(seconds(secs));
        Ok(())
    });
    module.set_native_fn("sleep", |secs: i64| {
        thread::sleep(seconds(secs as f64));
        Ok(())
    });

    // Window

    {
        let ctx = Rc::clone(&context);
        module.set_native_fn(
            "set_window_title",
            move |title: &str| -> Result<(), Box<EvalAltResult>> {
                ctx.borrow_mut()
                    .set_title(title)
                    .map_err(|e| e.to_string().into())
            },
        );
    }
    {
        let ctx = Rc::clone(&context);
        module.set_native_fn(
            "get_window_title",
            move || -> Result<String, Box<EvalAltResult>> {
                Ok(ctx.borrow().window.title.clone())
            },
        );
    }
    {
        let ctx = Rc::clone(&context);
        module.set_native_fn(
            "get_window_size",
            move || -> Result<Array, Box<EvalAltResult>> {
                let (w, h) = ctx.borrow().canvas.size();
                Ok(vec![Dynamic::from(w as i64), Dynamic::from(h as i64)])
            },
        );
    }
    {
        let ctx = Rc::clone(&context);
        module.set_native_fn(
            "set_window_mode",
            move |mode: &str| -> Result<(), Box<EvalAltResult>> {
                if !WINDOW_MODES.contains(&mode) {
                    return Err(format!("unknown window mode '{mode}'").into());
                }
                ctx.borrow_mut().window.mode = mode.to_string();
                Ok(())
            },
        );
    }
    {
        let ctx = Rc::clone(&context);
        module.set_native_fn(
            "get_window_mode",
            move || -> Result<String, Box<EvalAltResult>> {
                Ok(ctx.borrow().window.mode.clone())
            },
        );
    }
    {
        let ctx = Rc::clone(&context);
        module.set_native_fn("set_window_bordered", move |bordered: bool| {
            ctx.borrow_mut().window.bordered = bordered;
            Ok(())
        });
    }
    {
        let ctx = Rc::clone(&context);
        module.set_native_fn("show_fatal_error", move |title: &str, message: &str| {
            ctx.borrow_mut().report_fatal(title, message);
            Ok(())
        });
    }

    // Filesystem

    module.set_native_fn(
        "absolute_path",
        |path: &str| -> Result<String, Box<EvalAltResult>> {
            fs::absolute_path(Path::new(path))
                .map(|p| p.to_string_lossy().into_owned())
                .map_err(|e| format!("{path}: {e}").into())
        },
    );

    module.set_native_fn(
        "get_file_info",
        |path: &str| -> Result<Dynamic, Box<EvalAltResult>> {
            match fs::file_info(Path::new(path)) {
                Ok(info) => rhai::serde::to_dynamic(info),
                Err(e) => {
                    warn!(target: "kiln::fs", "get_file_info {path}: {e}");
                    Ok(Dynamic::from(e.to_string()))
                }
            }
        },
    );

    module.set_native_fn(
        "list_dir",
        |path: &str| -> Result<Dynamic, Box<EvalAltResult>> {
            match fs::list_dir(Path::new(path)) {
                Ok(names) => Ok(Dynamic::from_array(
                    names.into_iter().map(Dynamic::from).collect(),
                )),
                Err(e) => {
                    warn!(target: "kiln::fs", "list_dir {path}: {e}");
                    Ok(Dynamic::from(e.to_string()))
                }
            }
        },
    );

    module.set_native_fn(
        "mkdir",
        |path: &str| -> Result<bool, Box<EvalAltResult>> {
            match std::fs::create_dir(path) {
                Ok(()) => Ok(true),
                Err(e) => {
                    warn!(target: "kiln::fs", "mkdir {path}: {e}");
                    Ok(false)
                }
            }
        },
    );

    module.set_native_fn("chdir", |path: &str| -> Result<(), Box<EvalAltResult>> {
        std::env::set_current_dir(path).map_err(|e| format!("chdir {path}: {e}").into())
    });

    module.set_native_fn(
        "get_fs_type",
        |path: &str| -> Result<String, Box<EvalAltResult>> { Ok(fs::fs_type(Path::new(path))) },
    );

    module
}
