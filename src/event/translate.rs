//! Native -> script event translation tables

use super::native::{
    BUTTON_LEFT, BUTTON_MIDDLE, BUTTON_RIGHT, BUTTON_X1, BUTTON_X2, ButtonState, NativeEvent,
    WindowReason,
};
use super::script_event::{MouseButton, ScriptEvent};

/// Translate one native event. `None` means the event is not part of the
/// script vocabulary and should be skipped.
pub fn translate(event: NativeEvent) -> Option<ScriptEvent> {
    match event {
        NativeEvent::Quit => Some(ScriptEvent::Quit),
        NativeEvent::Window {
            reason,
            data1,
            data2,
        } => translate_window(reason, data1, data2),
        NativeEvent::MouseButton {
            state,
            button,
            x,
            y,
            clicks,
        } => {
            let button = mouse_button(button)?;
            Some(match state {
                ButtonState::Pressed => ScriptEvent::MousePressed {
                    button,
                    x,
                    y,
                    clicks,
                },
                ButtonState::Released => ScriptEvent::MouseReleased {
                    button,
                    x,
                    y,
                    clicks,
                },
            })
        }
        NativeEvent::MouseMotion { x, y, xrel, yrel } => Some(ScriptEvent::MouseMoved {
            x,
            y,
            dx: xrel,
            dy: yrel,
        }),
        // Horizontal-only scrolling has no vertical delta to report
        NativeEvent::MouseWheel { y: 0, .. } => None,
        NativeEvent::MouseWheel { y, .. } => Some(ScriptEvent::MouseWheel { delta: y }),
        NativeEvent::Key { state, key } => Some(match state {
            ButtonState::Pressed => ScriptEvent::KeyPressed { key },
            ButtonState::Released => ScriptEvent::KeyReleased { key },
        }),
        NativeEvent::TextInput { text } if text.is_empty() => None,
        NativeEvent::TextInput { text } => Some(ScriptEvent::TextInput { text }),
        NativeEvent::Other => None,
    }
}

fn translate_window(reason: WindowReason, data1: i32, data2: i32) -> Option<ScriptEvent> {
    match reason {
        WindowReason::Exposed => Some(ScriptEvent::Exposed),
        WindowReason::Restored => Some(ScriptEvent::Restored),
        WindowReason::Resized => Some(ScriptEvent::Resized {
            width: data1,
            height: data2,
        }),
        _ => None,
    }
}

fn mouse_button(code: u8) -> Option<MouseButton> {
    match code {
        BUTTON_LEFT => Some(MouseButton::Left),
        BUTTON_MIDDLE => Some(MouseButton::Middle),
        BUTTON_RIGHT => Some(MouseButton::Right),
        BUTTON_X1 => Some(MouseButton::X1),
        BUTTON_X2 => Some(MouseButton::X2),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window(reason: WindowReason) -> NativeEvent {
        NativeEvent::Window {
            reason,
            data1: 0,
            data2: 0,
        }
    }

    #[test]
    fn resize_carries_dimensions() {
        let ev = translate(NativeEvent::Window {
            reason: WindowReason::Resized,
            data1: 800,
            data2: 600,
        });
        assert_eq!(
            ev,
            Some(ScriptEvent::Resized {
                width: 800,
                height: 600
            })
        );
    }

    #[test]
    fn only_three_window_reasons_are_kept() {
        let kept: Vec<WindowReason> = [
            WindowReason::Shown,
            WindowReason::Hidden,
            WindowReason::Exposed,
            WindowReason::Moved,
            WindowReason::Resized,
            WindowReason::SizeChanged,
            WindowReason::Minimized,
            WindowReason::Maximized,
            WindowReason::Restored,
            WindowReason::Enter,
            WindowReason::Leave,
            WindowReason::FocusGained,
            WindowReason::FocusLost,
            WindowReason::Close,
        ]
        .into_iter()
        .filter(|r| translate(window(*r)).is_some())
        .collect();

        assert_eq!(
            kept,
            vec![
                WindowReason::Exposed,
                WindowReason::Resized,
                WindowReason::Restored
            ]
        );
    }

    #[test]
    fn button_table() {
        let names: Vec<&str> = (1..=5)
            .map(|code| mouse_button(code).unwrap().name())
            .collect();
        assert_eq!(names, vec!["left", "middle", "right", "x", "y"]);
        assert!(mouse_button(0).is_none());
        assert!(mouse_button(9).is_none());
    }

    #[test]
    fn press_and_release_keep_clicks() {
        let ev = translate(NativeEvent::MouseButton {
            state: ButtonState::Released,
            button: BUTTON_RIGHT,
            x: 10,
            y: 20,
            clicks: 2,
        });
        assert_eq!(
            ev,
            Some(ScriptEvent::MouseReleased {
                button: MouseButton::Right,
                x: 10,
                y: 20,
                clicks: 2
            })
        );
    }

    #[test]
    fn motion_passes_deltas_through() {
        let ev = translate(NativeEvent::MouseMotion {
            x: 5,
            y: 6,
            xrel: -1,
            yrel: 3,
        });
        assert_eq!(
            ev,
            Some(ScriptEvent::MouseMoved {
                x: 5,
                y: 6,
                dx: -1,
                dy: 3
            })
        );
    }

    #[test]
    fn wheel_without_vertical_delta_is_dropped() {
        assert_eq!(translate(NativeEvent::MouseWheel { x: 1, y: 0 }), None);
        assert_eq!(
            translate(NativeEvent::MouseWheel { x: 0, y: -2 }),
            Some(ScriptEvent::MouseWheel { delta: -2 })
        );
    }

    #[test]
    fn other_is_dropped() {
        assert_eq!(translate(NativeEvent::Other), None);
        assert_eq!(
            translate(NativeEvent::TextInput {
                text: String::new()
            }),
            None
        );
    }
}
