//! kiln - a scriptable terminal application host
//!
//! A Rhai script drives the application; the host gives it translated input
//! events, a drawing surface, directory watchers and regex matching.

pub mod config;
pub mod error;
pub mod event;
pub mod logging;
pub mod render;
pub mod scripting;
pub mod watch;

pub use error::{HostError, WatchError};
