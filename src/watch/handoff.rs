//! Listener threads -> script thread queue

use std::path::PathBuf;
use std::thread::{self, ThreadId};

use crossbeam_channel::{Receiver, Sender, TrySendError};

pub type WatcherId = u64;

/// A filesystem change waiting to be delivered on the script thread
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub watcher: WatcherId,
    pub path: PathBuf,
}

/// Multi-producer, single-consumer queue owned by the script thread.
///
/// The receiving half never leaves the thread that created it; draining from
/// any other thread is a bug.
pub struct Handoff {
    tx: Sender<Notification>,
    rx: Receiver<Notification>,
    owner: ThreadId,
}

/// Producer side, cloned into every listener thread
#[derive(Clone)]
pub struct HandoffSender {
    tx: Sender<Notification>,
}

impl HandoffSender {
    /// Queue a notification. Returns `false` once the script side is gone.
    pub fn send(&self, notification: Notification) -> bool {
        match self.tx.try_send(notification) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => unreachable!("hand-off queue is unbounded"),
            Err(TrySendError::Disconnected(_)) => false,
        }
    }
}

impl Handoff {
    /// Create the queue; the calling thread becomes its owner.
    pub fn new() -> Self {
        let (tx, rx) = crossbeam_channel::unbounded();
        Self {
            tx,
            rx,
            owner: thread::current().id(),
        }
    }

    pub fn sender(&self) -> HandoffSender {
        HandoffSender {
            tx: self.tx.clone(),
        }
    }

    /// Thread that is allowed to drain the queue
    pub fn owner(&self) -> ThreadId {
        self.owner
    }

    pub fn has_pending(&self) -> bool {
        !self.rx.is_empty()
    }

    pub fn pending(&self) -> usize {
        self.rx.len()
    }

    /// Take everything queued so far, in arrival order.
    pub fn drain(&self) -> Vec<Notification> {
        debug_assert_eq!(
            thread::current().id(),
            self.owner,
            "hand-off queue drained off the script thread"
        );
        self.rx.try_iter().collect()
    }
}

impl Default for Handoff {
    fn default() -> Self {
        Self::new()
    }
}
