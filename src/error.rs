use std::path::PathBuf;

/// Errors surfaced by the host to `main` and to the Rust-side API.
#[derive(thiserror::Error, Debug)]
pub enum HostError {
    #[error("platform error: {0}")]
    Platform(#[from] std::io::Error),

    #[error(transparent)]
    Watch(#[from] WatchError),

    #[error("script error: {0}")]
    Script(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("replay file error: {0}")]
    Replay(String),
}

/// Errors from a single watcher. These never tear the watcher down.
#[derive(thiserror::Error, Debug)]
pub enum WatchError {
    #[error("notify error: {0}")]
    Notify(#[from] notify::Error),

    #[error("path is not being watched: {0:?}")]
    NotWatched(PathBuf),

    #[error("watcher has been stopped")]
    Stopped,
}
