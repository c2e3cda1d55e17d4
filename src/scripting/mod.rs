//! Scripting module - Rhai host for the application script
//!
//! Native functions are grouped into static modules:
//! - `system::*` - events, time, window, filesystem
//! - `renderer::*` - drawing and fonts
//! - `dirmonitor::*` - directory watchers
//! - `regex::*` - compiled patterns

mod api;
mod context;
mod engine;
mod globals;

pub use api::fs::FileInfo;
pub use api::regex::{ANCHORED, ENDANCHORED};
pub use api::system::event_to_array;
pub use context::{HostContext, SharedContext, WINDOW_MODES, WindowState};
pub use engine::ScriptHost;
pub use globals::Globals;
