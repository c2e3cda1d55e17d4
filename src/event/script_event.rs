/// Mouse buttons named in the script vocabulary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
    X1,
    X2,
}

impl MouseButton {
    pub fn name(self) -> &'static str {
        match self {
            MouseButton::Left => "left",
            MouseButton::Middle => "middle",
            MouseButton::Right => "right",
            MouseButton::X1 => "x",
            MouseButton::X2 => "y",
        }
    }
}

/// One positional payload value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventArg {
    Str(String),
    Int(i64),
}

impl From<&str> for EventArg {
    fn from(s: &str) -> Self {
        EventArg::Str(s.to_string())
    }
}

impl From<String> for EventArg {
    fn from(s: String) -> Self {
        EventArg::Str(s)
    }
}

impl From<i32> for EventArg {
    fn from(n: i32) -> Self {
        EventArg::Int(n as i64)
    }
}

impl From<u8> for EventArg {
    fn from(n: u8) -> Self {
        EventArg::Int(n as i64)
    }
}

/// A translated event, ready to hand to script code
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptEvent {
    Quit,
    Exposed,
    Restored,
    Resized {
        width: i32,
        height: i32,
    },
    MousePressed {
        button: MouseButton,
        x: i32,
        y: i32,
        clicks: u8,
    },
    MouseReleased {
        button: MouseButton,
        x: i32,
        y: i32,
        clicks: u8,
    },
    MouseMoved {
        x: i32,
        y: i32,
        dx: i32,
        dy: i32,
    },
    MouseWheel {
        delta: i32,
    },
    KeyPressed {
        key: String,
    },
    KeyReleased {
        key: String,
    },
    TextInput {
        text: String,
    },
}

impl ScriptEvent {
    /// Name of the event kind as scripts see it
    pub fn kind(&self) -> &'static str {
        match self {
            ScriptEvent::Quit => "quit",
            ScriptEvent::Exposed => "exposed",
            ScriptEvent::Restored => "restored",
            ScriptEvent::Resized { .. } => "resized",
            ScriptEvent::MousePressed { .. } => "mousepressed",
            ScriptEvent::MouseReleased { .. } => "mousereleased",
            ScriptEvent::MouseMoved { .. } => "mousemoved",
            ScriptEvent::MouseWheel { .. } => "mousewheel",
            ScriptEvent::KeyPressed { .. } => "keypressed",
            ScriptEvent::KeyReleased { .. } => "keyreleased",
            ScriptEvent::TextInput { .. } => "textinput",
        }
    }

    /// Kind-specific positional values, in order
    pub fn payload(&self) -> Vec<EventArg> {
        match self {
            ScriptEvent::Quit | ScriptEvent::Exposed | ScriptEvent::Restored => Vec::new(),
            ScriptEvent::Resized { width, height } => vec![(*width).into(), (*height).into()],
            ScriptEvent::MousePressed {
                button,
                x,
                y,
                clicks,
            }
            | ScriptEvent::MouseReleased {
                button,
                x,
                y,
                clicks,
            } => vec![
                button.name().into(),
                (*x).into(),
                (*y).into(),
                (*clicks).into(),
            ],
            ScriptEvent::MouseMoved { x, y, dx, dy } => {
                vec![(*x).into(), (*y).into(), (*dx).into(), (*dy).into()]
            }
            ScriptEvent::MouseWheel { delta } => vec![(*delta).into()],
            ScriptEvent::KeyPressed { key } | ScriptEvent::KeyReleased { key } => {
                vec![key.clone().into()]
            }
            ScriptEvent::TextInput { text } => vec![text.clone().into()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resized_payload_is_width_then_height() {
        let ev = ScriptEvent::Resized {
            width: 800,
            height: 600,
        };
        assert_eq!(ev.kind(), "resized");
        assert_eq!(ev.payload(), vec![EventArg::Int(800), EventArg::Int(600)]);
    }

    #[test]
    fn mouse_payload_starts_with_button_name() {
        let ev = ScriptEvent::MouseReleased {
            button: MouseButton::X2,
            x: 1,
            y: 2,
            clicks: 2,
        };
        assert_eq!(
            ev.payload(),
            vec![
                EventArg::Str("y".into()),
                EventArg::Int(1),
                EventArg::Int(2),
                EventArg::Int(2)
            ]
        );
    }

    #[test]
    fn bare_kinds_have_empty_payload() {
        assert!(ScriptEvent::Quit.payload().is_empty());
        assert!(ScriptEvent::Exposed.payload().is_empty());
        assert!(ScriptEvent::Restored.payload().is_empty());
    }
}
