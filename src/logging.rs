//! Logging setup for the host
//!
//! Everything logs through the `log` facade. The filter comes from `KILN_LOG`
//! (falling back to `RUST_LOG`), e.g. `KILN_LOG=kiln::watch=trace`.
//!
//! While the terminal is in raw mode stderr belongs to the screen, so the binary
//! sends logs to a file instead (see [`LogTarget`]).

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Once;
use std::time::{SystemTime, UNIX_EPOCH};

use log::{Level, LevelFilter};

static INIT: Once = Once::new();

/// Where log records end up
#[derive(Debug, Clone)]
pub enum LogTarget {
    Stderr,
    File(PathBuf),
}

/// Default log file: `<cache dir>/kiln/kiln.log`
pub fn default_log_file() -> Option<PathBuf> {
    dirs::cache_dir().map(|p| p.join("kiln").join("kiln.log"))
}

/// Initialise logging (idempotent; later calls are ignored).
pub fn init_logging(target: LogTarget) {
    INIT.call_once(|| {
        let env = if std::env::var_os("KILN_LOG").is_some() {
            "KILN_LOG"
        } else {
            "RUST_LOG"
        };

        let mut builder = env_logger::Builder::new();
        builder
            .filter_module("kiln", LevelFilter::Info)
            .filter_module("notify", LevelFilter::Warn)
            .parse_env(env)
            .format(|buf, record| {
                writeln!(
                    buf,
                    "[{}] [{}] [{}] {}",
                    timestamp(),
                    level_letter(record.level()),
                    record.target(),
                    record.args()
                )
            });

        if let LogTarget::File(path) = &target {
            match open_log_file(path) {
                Ok(file) => {
                    builder.target(env_logger::Target::Pipe(Box::new(file)));
                }
                Err(e) => eprintln!("kiln: cannot open log file {}: {e}", path.display()),
            }
        }

        let _ = builder.try_init();
    });
}

fn open_log_file(path: &Path) -> std::io::Result<File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    File::options().create(true).append(true).open(path)
}

fn level_letter(level: Level) -> &'static str {
    match level {
        Level::Error => "E",
        Level::Warn => "W",
        Level::Info => "I",
        Level::Debug => "D",
        Level::Trace => "T",
    }
}

/// Wall-clock `HH:MM:SS.mmm` (UTC)
fn timestamp() -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();

    let secs = now.as_secs();
    format!(
        "{:02}:{:02}:{:02}.{:03}",
        (secs / 3600) % 24,
        (secs / 60) % 60,
        secs % 60,
        now.subsec_millis()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_letters_are_single_chars() {
        for level in [Level::Error, Level::Warn, Level::Info, Level::Debug, Level::Trace] {
            assert_eq!(level_letter(level).len(), 1);
        }
    }

    #[test]
    fn timestamp_has_fixed_shape() {
        let ts = timestamp();
        assert_eq!(ts.len(), 12);
        assert_eq!(&ts[2..3], ":");
        assert_eq!(&ts[8..9], ".");
    }

    #[test]
    fn log_file_can_be_opened_in_fresh_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("kiln.log");
        assert!(open_log_file(&path).is_ok());
        assert!(path.exists());
    }
}
