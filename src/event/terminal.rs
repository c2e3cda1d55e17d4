//! crossterm-backed native event queue

use std::collections::VecDeque;
use std::io;
use std::time::{Duration, Instant};

use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEvent, MouseEventKind,
};

use super::native::{
    BUTTON_LEFT, BUTTON_MIDDLE, BUTTON_RIGHT, ButtonState, EventSource, NativeEvent,
    WindowReason,
};

/// Longest single blocking poll when waiting without a timeout
const WAIT_FOREVER_STEP: Duration = Duration::from_secs(60);

/// Reads terminal events and reports them as native events
pub struct TerminalSource {
    pending: VecDeque<NativeEvent>,
    clicks: ClickTracker,
    last_pos: Option<(i32, i32)>,
}

impl TerminalSource {
    pub fn new(double_click: Duration) -> Self {
        Self {
            pending: VecDeque::new(),
            clicks: ClickTracker::new(double_click),
            last_pos: None,
        }
    }

    fn convert(&mut self, event: Event) {
        match event {
            Event::Resize(w, h) => self.pending.push_back(NativeEvent::Window {
                reason: WindowReason::Resized,
                data1: w as i32,
                data2: h as i32,
            }),
            // The screen may be stale after the terminal regains focus
            Event::FocusGained => self.pending.push_back(NativeEvent::Window {
                reason: WindowReason::Exposed,
                data1: 0,
                data2: 0,
            }),
            Event::FocusLost => self.pending.push_back(NativeEvent::Window {
                reason: WindowReason::FocusLost,
                data1: 0,
                data2: 0,
            }),
            Event::Mouse(mouse) => self.convert_mouse(mouse, Instant::now()),
            Event::Key(key) => self.convert_key(key),
            Event::Paste(text) => self.pending.push_back(NativeEvent::TextInput { text }),
        }
    }

    fn convert_mouse(&mut self, mouse: MouseEvent, now: Instant) {
        let x = mouse.column as i32;
        let y = mouse.row as i32;

        let native = match mouse.kind {
            MouseEventKind::Down(button) => {
                let button = button_code(button);
                let clicks = self.clicks.press(button, (x, y), now);
                NativeEvent::MouseButton {
                    state: ButtonState::Pressed,
                    button,
                    x,
                    y,
                    clicks,
                }
            }
            MouseEventKind::Up(button) => NativeEvent::MouseButton {
                state: ButtonState::Released,
                button: button_code(button),
                x,
                y,
                clicks: self.clicks.current(),
            },
            MouseEventKind::Drag(_) | MouseEventKind::Moved => {
                let (px, py) = self.last_pos.unwrap_or((x, y));
                NativeEvent::MouseMotion {
                    x,
                    y,
                    xrel: x - px,
                    yrel: y - py,
                }
            }
            MouseEventKind::ScrollUp => NativeEvent::MouseWheel { x: 0, y: 1 },
            MouseEventKind::ScrollDown => NativeEvent::MouseWheel { x: 0, y: -1 },
            MouseEventKind::ScrollLeft => NativeEvent::MouseWheel { x: -1, y: 0 },
            MouseEventKind::ScrollRight => NativeEvent::MouseWheel { x: 1, y: 0 },
        };

        self.last_pos = Some((x, y));
        self.pending.push_back(native);
    }

    fn convert_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            let native = if key.kind == KeyEventKind::Release {
                NativeEvent::Other
            } else {
                NativeEvent::Quit
            };
            self.pending.push_back(native);
            return;
        }

        let Some(name) = key_name(&key) else {
            self.pending.push_back(NativeEvent::Other);
            return;
        };

        let state = match key.kind {
            KeyEventKind::Press | KeyEventKind::Repeat => ButtonState::Pressed,
            KeyEventKind::Release => ButtonState::Released,
        };
        self.pending.push_back(NativeEvent::Key { state, key: name });

        if state == ButtonState::Pressed {
            if let Some(text) = text_of(&key) {
                self.pending.push_back(NativeEvent::TextInput { text });
            }
        }
    }
}

impl EventSource for TerminalSource {
    fn poll_native(&mut self) -> io::Result<Option<NativeEvent>> {
        if self.pending.is_empty() && event::poll(Duration::ZERO)? {
            let event = event::read()?;
            self.convert(event);
        }
        Ok(self.pending.pop_front())
    }

    fn wait_native(&mut self, timeout: Option<Duration>) -> io::Result<bool> {
        if !self.pending.is_empty() {
            return Ok(true);
        }
        match timeout {
            Some(timeout) => event::poll(timeout),
            None => loop {
                if event::poll(WAIT_FOREVER_STEP)? {
                    return Ok(true);
                }
            },
        }
    }
}

fn button_code(button: event::MouseButton) -> u8 {
    match button {
        event::MouseButton::Left => BUTTON_LEFT,
        event::MouseButton::Middle => BUTTON_MIDDLE,
        event::MouseButton::Right => BUTTON_RIGHT,
    }
}

/// Counts repeated presses of the same button on the same cell
#[derive(Debug)]
pub struct ClickTracker {
    interval: Duration,
    last: Option<(u8, (i32, i32), Instant)>,
    count: u8,
}

impl ClickTracker {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: None,
            count: 0,
        }
    }

    /// Register a press and return its click count (1 for a single click).
    pub fn press(&mut self, button: u8, pos: (i32, i32), now: Instant) -> u8 {
        let repeat = match self.last {
            Some((b, p, at)) => {
                b == button && p == pos && now.saturating_duration_since(at) <= self.interval
            }
            None => false,
        };

        self.count = if repeat {
            self.count.saturating_add(1)
        } else {
            1
        };
        self.last = Some((button, pos, now));
        self.count
    }

    /// Count of the most recent press sequence
    pub fn current(&self) -> u8 {
        self.count.max(1)
    }
}

/// Script-facing key name, e.g. `"a"`, `"return"`, `"ctrl+s"`
fn key_name(key: &KeyEvent) -> Option<String> {
    let base = match key.code {
        KeyCode::Char(' ') => "space".to_string(),
        KeyCode::Char(c) => c.to_lowercase().collect(),
        KeyCode::Enter => "return".to_string(),
        KeyCode::Esc => "escape".to_string(),
        KeyCode::Backspace => "backspace".to_string(),
        KeyCode::Tab | KeyCode::BackTab => "tab".to_string(),
        KeyCode::Delete => "delete".to_string(),
        KeyCode::Insert => "insert".to_string(),
        KeyCode::Home => "home".to_string(),
        KeyCode::End => "end".to_string(),
        KeyCode::PageUp => "pageup".to_string(),
        KeyCode::PageDown => "pagedown".to_string(),
        KeyCode::Left => "left".to_string(),
        KeyCode::Right => "right".to_string(),
        KeyCode::Up => "up".to_string(),
        KeyCode::Down => "down".to_string(),
        KeyCode::F(n) => format!("f{}", n),
        _ => return None,
    };

    let mut name = String::new();
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        name.push_str("ctrl+");
    }
    if key.modifiers.contains(KeyModifiers::ALT) {
        name.push_str("alt+");
    }
    if key.modifiers.contains(KeyModifiers::SHIFT) || key.code == KeyCode::BackTab {
        // Shifted characters already arrive as their own glyph
        if !matches!(key.code, KeyCode::Char(_)) {
            name.push_str("shift+");
        }
    }
    name.push_str(&base);
    Some(name)
}

/// Text produced by a key press, if any
fn text_of(key: &KeyEvent) -> Option<String> {
    if key
        .modifiers
        .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
    {
        return None;
    }
    match key.code {
        KeyCode::Char(c) => Some(c.to_string()),
        _ => None,
    }
}
