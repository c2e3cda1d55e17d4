//! Directory monitoring
//!
//! Each [`DirWatcher`] owns a `notify` watcher and one listener thread. Listener
//! threads never call back into script code: they push [`Notification`]s onto the
//! [`Handoff`] queue, and the script thread drains it through
//! [`WatchService::take_deliveries`].

mod handoff;
mod service;
mod watcher;

pub use handoff::{Handoff, HandoffSender, Notification, WatcherId};
pub use service::{Delivery, WatchHandle, WatchService};
pub use watcher::{DirWatcher, ListenerState};
