use std::time::Duration;

use log::trace;

use super::native::EventSource;
use super::script_event::ScriptEvent;
use super::translate::translate;
use crate::error::HostError;

/// Pull-based adapter from a native event queue to script events
pub struct EventBridge {
    source: Box<dyn EventSource>,
}

impl EventBridge {
    pub fn new(source: impl EventSource + 'static) -> Self {
        Self {
            source: Box::new(source),
        }
    }

    /// Next translated event, or `None` once the native queue is empty.
    ///
    /// Events outside the script vocabulary are consumed and skipped; this
    /// never blocks.
    pub fn poll(&mut self) -> Result<Option<ScriptEvent>, HostError> {
        while let Some(native) = self.source.poll_native()? {
            match translate(native.clone()) {
                Some(event) => return Ok(Some(event)),
                None => trace!(target: "kiln::event", "skipped {:?}", native),
            }
        }
        Ok(None)
    }

    /// Block until a native event is queued or the timeout elapses.
    ///
    /// Only reports availability; the caller polls to receive the event.
    pub fn wait_with_timeout(&mut self, timeout: Option<Duration>) -> Result<bool, HostError> {
        Ok(self.source.wait_native(timeout)?)
    }

    /// Iterate over the currently available events. The iterator ends at the
    /// first empty poll (or error); calling `events` again resumes.
    pub fn events(&mut self) -> Events<'_> {
        Events {
            bridge: self,
            done: false,
        }
    }
}

pub struct Events<'a> {
    bridge: &'a mut EventBridge,
    done: bool,
}

impl Iterator for Events<'_> {
    type Item = Result<ScriptEvent, HostError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.bridge.poll() {
            Ok(Some(event)) => Some(Ok(event)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
