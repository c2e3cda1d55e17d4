//! Event bridge: native window/input events -> script events
//!
//! - `native` - the platform-side event union and the `EventSource` trait
//! - `translate` - fixed dispatch tables into the script vocabulary
//! - `bridge` - `poll` / `wait_with_timeout` over any source
//! - `terminal` - crossterm source used by the binary
//! - `queued` - in-memory source for tests and replays

mod bridge;
mod native;
mod queued;
mod script_event;
mod terminal;
mod translate;

pub use bridge::{EventBridge, Events};
pub use native::{
    BUTTON_LEFT, BUTTON_MIDDLE, BUTTON_RIGHT, BUTTON_X1, BUTTON_X2, ButtonState, EventSource,
    NativeEvent, WindowReason,
};
pub use queued::{QueueHandle, QueuedSource};
pub use script_event::{EventArg, MouseButton, ScriptEvent};
pub use terminal::{ClickTracker, TerminalSource};
pub use translate::translate;
