use std::cell::RefCell;
use std::collections::VecDeque;
use std::io;
use std::path::Path;
use std::rc::Rc;
use std::time::Duration;

use super::native::{EventSource, NativeEvent};
use crate::error::HostError;

/// In-memory native event queue
///
/// Drives the bridge in tests and in headless `--replay` runs.
pub struct QueuedSource {
    queue: Rc<RefCell<VecDeque<NativeEvent>>>,
    quit_when_drained: bool,
}

/// Pushes into a [`QueuedSource`] after it has been handed to a bridge
#[derive(Clone)]
pub struct QueueHandle {
    queue: Rc<RefCell<VecDeque<NativeEvent>>>,
}

impl QueueHandle {
    pub fn push(&self, event: NativeEvent) {
        self.queue.borrow_mut().push_back(event);
    }
}

impl QueuedSource {
    pub fn new() -> Self {
        Self {
            queue: Rc::new(RefCell::new(VecDeque::new())),
            quit_when_drained: false,
        }
    }

    pub fn from_events(events: impl IntoIterator<Item = NativeEvent>) -> Self {
        let source = Self::new();
        source.queue.borrow_mut().extend(events);
        source
    }

    /// Load a JSON array of native events. Once the recording is exhausted the
    /// source reports a single `Quit` so scripted runs terminate.
    pub fn from_replay_file(path: &Path) -> Result<Self, HostError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| HostError::Replay(format!("{}: {}", path.display(), e)))?;
        let events: Vec<NativeEvent> = serde_json::from_str(&content)
            .map_err(|e| HostError::Replay(format!("{}: {}", path.display(), e)))?;

        log::info!(
            target: "kiln::event",
            "Replaying {} events from {}",
            events.len(),
            path.display()
        );

        let mut source = Self::from_events(events);
        source.quit_when_drained = true;
        Ok(source)
    }

    pub fn push(&self, event: NativeEvent) {
        self.queue.borrow_mut().push_back(event);
    }

    pub fn sender(&self) -> QueueHandle {
        QueueHandle {
            queue: Rc::clone(&self.queue),
        }
    }

    pub fn len(&self) -> usize {
        self.queue.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.borrow().is_empty()
    }
}

impl Default for QueuedSource {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSource for QueuedSource {
    fn poll_native(&mut self) -> io::Result<Option<NativeEvent>> {
        let next = self.queue.borrow_mut().pop_front();
        if next.is_none() && self.quit_when_drained {
            self.quit_when_drained = false;
            return Ok(Some(NativeEvent::Quit));
        }
        Ok(next)
    }

    fn wait_native(&mut self, timeout: Option<Duration>) -> io::Result<bool> {
        if !self.is_empty() || self.quit_when_drained {
            return Ok(true);
        }
        // Nothing can be queued while the only thread is blocked here, so an
        // unbounded wait would never return.
        if let Some(timeout) = timeout {
            std::thread::sleep(timeout);
        }
        Ok(false)
    }
}
