use std::io;
use std::time::Duration;

use serde::{Deserialize, Serialize};

// Raw mouse button codes carried by `NativeEvent::MouseButton`
pub const BUTTON_LEFT: u8 = 1;
pub const BUTTON_MIDDLE: u8 = 2;
pub const BUTTON_RIGHT: u8 = 3;
pub const BUTTON_X1: u8 = 4;
pub const BUTTON_X2: u8 = 5;

/// An event as the platform queue reports it, before translation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NativeEvent {
    Quit,
    Window {
        reason: WindowReason,
        #[serde(default)]
        data1: i32,
        #[serde(default)]
        data2: i32,
    },
    MouseButton {
        state: ButtonState,
        button: u8,
        x: i32,
        y: i32,
        #[serde(default = "one")]
        clicks: u8,
    },
    MouseMotion {
        x: i32,
        y: i32,
        xrel: i32,
        yrel: i32,
    },
    MouseWheel {
        #[serde(default)]
        x: i32,
        y: i32,
    },
    Key {
        state: ButtonState,
        key: String,
    },
    TextInput {
        text: String,
    },
    /// Anything the platform reports that has no representation here
    Other,
}

fn one() -> u8 {
    1
}

/// Sub-reason of a window event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowReason {
    Shown,
    Hidden,
    Exposed,
    Moved,
    Resized,
    SizeChanged,
    Minimized,
    Maximized,
    Restored,
    Enter,
    Leave,
    FocusGained,
    FocusLost,
    Close,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonState {
    Pressed,
    Released,
}

/// A platform queue of native events
///
/// Implementations only report what happened; they never run script code.
pub trait EventSource {
    /// Take the next queued event without blocking.
    fn poll_native(&mut self) -> io::Result<Option<NativeEvent>>;

    /// Block until an event is queued or `timeout` elapses (`None` waits forever).
    /// Does not consume the event.
    fn wait_native(&mut self, timeout: Option<Duration>) -> io::Result<bool>;
}
