use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::{Rc, Weak};

use log::{debug, trace};

use super::handoff::{Handoff, WatcherId};
use super::watcher::{DirWatcher, Retired};
use crate::error::WatchError;

/// Shared handle to a watcher; dropping the last clone stops it
pub type WatchHandle<C> = Rc<RefCell<DirWatcher<C>>>;

/// A notification paired with the callback it is destined for
pub struct Delivery<C> {
    pub callback: C,
    pub path: PathBuf,
}

/// Owns the hand-off queue and tracks every watcher created through it.
///
/// Lives on the script thread. Watchers are held weakly so that dropping the
/// script value is what ends a watcher's life.
pub struct WatchService<C> {
    handoff: Handoff,
    next_id: WatcherId,
    recursive: bool,
    watchers: HashMap<WatcherId, Weak<RefCell<DirWatcher<C>>>>,
    retired: Retired<C>,
}

impl<C: Clone> WatchService<C> {
    pub fn new() -> Self {
        Self::with_recursive(false)
    }

    /// New watchers will watch directories recursively when `recursive` is set.
    pub fn with_recursive(recursive: bool) -> Self {
        Self {
            handoff: Handoff::new(),
            next_id: 1,
            recursive,
            watchers: HashMap::new(),
            retired: Rc::new(RefCell::new(HashMap::new())),
        }
    }

    /// Allocate a watcher and start its listener thread.
    pub fn new_watcher(&mut self) -> Result<WatchHandle<C>, WatchError> {
        let id = self.next_id;
        let mut watcher = DirWatcher::spawn(id, self.handoff.sender(), self.recursive)?;
        watcher.retire_into(Rc::clone(&self.retired));
        self.next_id += 1;

        let handle = Rc::new(RefCell::new(watcher));
        self.watchers.insert(id, Rc::downgrade(&handle));
        Ok(handle)
    }

    pub fn has_pending(&self) -> bool {
        self.handoff.has_pending()
    }

    /// Number of watchers still referenced and running
    pub fn live_watchers(&self) -> usize {
        self.watchers
            .values()
            .filter_map(Weak::upgrade)
            .filter(|w| w.borrow().is_alive())
            .count()
    }

    /// Drain the hand-off queue and resolve each notification to its callback.
    ///
    /// A notification handed off before its watcher stopped (or was dropped)
    /// still goes to the callback bound at that moment. Notifications for
    /// watchers without a callback are discarded. The result keeps queue order.
    pub fn take_deliveries(&mut self) -> Vec<Delivery<C>> {
        self.prune();

        // Taken before draining: a watcher stopped after this point was
        // still alive when its notifications were drained.
        let retired = std::mem::take(&mut *self.retired.borrow_mut());

        let mut deliveries = Vec::new();
        for note in self.handoff.drain() {
            let live = self
                .watchers
                .get(&note.watcher)
                .and_then(Weak::upgrade)
                .and_then(|w| w.borrow().callback().cloned());
            let Some(callback) = live.or_else(|| retired.get(&note.watcher).cloned()) else {
                trace!(target: "kiln::watch", "watcher {} has no callback, dropped {}", note.watcher, note.path.display());
                continue;
            };
            deliveries.push(Delivery {
                callback,
                path: note.path,
            });
        }
        deliveries
    }

    /// Invoke `deliver` for every pending notification; returns how many ran.
    pub fn dispatch(&mut self, mut deliver: impl FnMut(&C, &Path)) -> usize {
        let deliveries = self.take_deliveries();
        for d in &deliveries {
            deliver(&d.callback, &d.path);
        }
        deliveries.len()
    }

    /// Stop every watcher that is still referenced somewhere.
    pub fn shutdown(&mut self) {
        for (id, watcher) in self.watchers.drain() {
            if let Some(watcher) = watcher.upgrade() {
                debug!(target: "kiln::watch", "shutting down watcher {id}");
                watcher.borrow_mut().stop();
            }
        }
        // Anything still queued has no destination now
        let _ = self.handoff.drain();
        self.retired.borrow_mut().clear();
    }

    fn prune(&mut self) {
        self.watchers.retain(|_, w| w.strong_count() > 0);
    }
}

impl<C: Clone> Default for WatchService<C> {
    fn default() -> Self {
        Self::new()
    }
}
