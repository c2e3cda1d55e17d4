use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender, select};
use log::{debug, info, trace, warn};
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};

use super::handoff::{HandoffSender, Notification, WatcherId};
use crate::error::WatchError;

/// Lifecycle of a watcher's background listener
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerState {
    Idle,
    Listening,
    Stopped,
}

impl ListenerState {
    fn from_u8(v: u8) -> Self {
        match v {
            0 => ListenerState::Idle,
            1 => ListenerState::Listening,
            _ => ListenerState::Stopped,
        }
    }
}

/// State visible to both the script thread and the listener thread
struct Shared {
    /// Cleared exactly once, when the watcher is stopped
    alive: AtomicBool,
    /// Set while a callback is bound; the listener only forwards when armed
    armed: AtomicBool,
    state: AtomicU8,
}

impl Shared {
    fn set_state(&self, state: ListenerState) {
        self.state.store(state as u8, Ordering::Release);
    }
}

/// Callbacks of stopped watchers, kept until their queued notifications are drained
pub(crate) type Retired<C> = Rc<RefCell<HashMap<WatcherId, C>>>;

/// One directory monitor: a `notify` watcher plus its listener thread.
///
/// `C` is the callback type. It stays on the thread that owns the watcher; the
/// listener only sees the `armed` flag.
pub struct DirWatcher<C> {
    id: WatcherId,
    notifier: Option<RecommendedWatcher>,
    watched: BTreeSet<PathBuf>,
    recursive: bool,
    callback: Option<C>,
    shared: Arc<Shared>,
    stop_tx: Option<Sender<()>>,
    listener: Option<JoinHandle<()>>,
    retired: Option<Retired<C>>,
}

impl<C> DirWatcher<C> {
    /// Create the notifier and start its listener.
    pub fn spawn(id: WatcherId, handoff: HandoffSender, recursive: bool) -> Result<Self, WatchError> {
        let (event_tx, event_rx) = crossbeam_channel::unbounded();
        let notifier = notify::recommended_watcher(move |res| {
            // Receiver gone means the listener already stopped
            let _ = event_tx.send(res);
        })?;

        let shared = Arc::new(Shared {
            alive: AtomicBool::new(true),
            armed: AtomicBool::new(false),
            state: AtomicU8::new(ListenerState::Idle as u8),
        });
        let (stop_tx, stop_rx) = crossbeam_channel::bounded::<()>(0);

        let listener = {
            let shared = Arc::clone(&shared);
            thread::Builder::new()
                .name(format!("kiln-watch-{id}"))
                .spawn(move || listen(id, event_rx, stop_rx, handoff, shared))
                .map_err(|e| WatchError::Notify(notify::Error::io(e)))?
        };

        debug!(target: "kiln::watch", "watcher {id} started");

        Ok(Self {
            id,
            notifier: Some(notifier),
            watched: BTreeSet::new(),
            recursive,
            callback: None,
            shared,
            stop_tx: Some(stop_tx),
            listener: Some(listener),
            retired: None,
        })
    }

    /// Where `stop` leaves the callback for notifications already handed off
    pub(crate) fn retire_into(&mut self, retired: Retired<C>) {
        self.retired = Some(retired);
    }

    pub fn id(&self) -> WatcherId {
        self.id
    }

    /// Add `path` to the watch set and return the new set size.
    pub fn watch(&mut self, path: impl AsRef<Path>) -> Result<usize, WatchError> {
        let path = path.as_ref();
        let mode = if self.recursive {
            RecursiveMode::Recursive
        } else {
            RecursiveMode::NonRecursive
        };
        let notifier = self.notifier.as_mut().ok_or(WatchError::Stopped)?;
        notifier.watch(path, mode)?;

        self.watched.insert(path.to_path_buf());
        info!(target: "kiln::watch", "watcher {} watching {}", self.id, path.display());
        Ok(self.watched.len())
    }

    /// Remove `path` from the watch set and return the new set size.
    pub fn unwatch(&mut self, path: impl AsRef<Path>) -> Result<usize, WatchError> {
        let path = path.as_ref();
        if !self.watched.contains(path) {
            return Err(WatchError::NotWatched(path.to_path_buf()));
        }
        let notifier = self.notifier.as_mut().ok_or(WatchError::Stopped)?;
        notifier.unwatch(path)?;

        self.watched.remove(path);
        info!(target: "kiln::watch", "watcher {} unwatched {}", self.id, path.display());
        Ok(self.watched.len())
    }

    /// Bind `callback`, replacing any previous one.
    pub fn set_callback(&mut self, callback: C) {
        self.callback = Some(callback);
        self.shared.armed.store(true, Ordering::Release);
    }

    pub fn clear_callback(&mut self) {
        self.shared.armed.store(false, Ordering::Release);
        self.callback = None;
    }

    pub fn callback(&self) -> Option<&C> {
        self.callback.as_ref()
    }

    /// Whether directory monitoring is supported on this platform
    pub fn mode(&self) -> bool {
        true
    }

    pub fn watched(&self) -> impl Iterator<Item = &Path> {
        self.watched.iter().map(PathBuf::as_path)
    }

    pub fn watch_count(&self) -> usize {
        self.watched.len()
    }

    pub fn is_alive(&self) -> bool {
        self.shared.alive.load(Ordering::Acquire)
    }

    pub fn listener_state(&self) -> ListenerState {
        ListenerState::from_u8(self.shared.state.load(Ordering::Acquire))
    }

    /// Stop the listener and release the OS watch.
    ///
    /// Returns once the listener thread has exited, so nothing more is handed
    /// off after this. Notifications already handed off are still delivered to
    /// the callback bound at this point. Idempotent.
    pub fn stop(&mut self) {
        if !self.shared.alive.swap(false, Ordering::AcqRel) {
            return;
        }
        self.shared.armed.store(false, Ordering::Release);

        // Closing the only sender is the stop signal
        drop(self.stop_tx.take());
        if let Some(listener) = self.listener.take() {
            if listener.join().is_err() {
                warn!(target: "kiln::watch", "watcher {} listener panicked", self.id);
            }
        }

        self.notifier = None;
        if let Some(callback) = self.callback.take() {
            // Notifications handed off before the stop still reach this callback
            if let Some(retired) = &self.retired {
                retired.borrow_mut().insert(self.id, callback);
            }
        }
        self.watched.clear();
        debug!(target: "kiln::watch", "watcher {} stopped", self.id);
    }
}

impl<C> Drop for DirWatcher<C> {
    fn drop(&mut self) {
        self.stop();
    }
}

fn listen(
    id: WatcherId,
    events: Receiver<notify::Result<notify::Event>>,
    stop: Receiver<()>,
    handoff: HandoffSender,
    shared: Arc<Shared>,
) {
    shared.set_state(ListenerState::Listening);

    loop {
        let keep_listening = select! {
            recv(stop) -> _ => false,
            recv(events) -> msg => match msg {
                Ok(Ok(event)) => forward(id, event, &handoff, &shared),
                Ok(Err(e)) => {
                    warn!(target: "kiln::watch", "watcher {id}: {e}");
                    true
                }
                // Notifier dropped: same as a stop signal
                Err(_) => false,
            },
        };
        if !keep_listening {
            break;
        }
    }

    shared.set_state(ListenerState::Stopped);
    trace!(target: "kiln::watch", "watcher {id} listener exited");
}

/// Hand one OS event to the script thread. Returns `false` when the listener
/// should exit.
fn forward(id: WatcherId, event: notify::Event, handoff: &HandoffSender, shared: &Shared) -> bool {
    if !is_change(&event.kind) {
        return true;
    }

    for path in event.paths {
        if !shared.alive.load(Ordering::Acquire) {
            return false;
        }
        if !shared.armed.load(Ordering::Acquire) {
            trace!(target: "kiln::watch", "watcher {id}: no callback, dropped {}", path.display());
            continue;
        }
        if !handoff.send(Notification { watcher: id, path }) {
            return false;
        }
    }
    true
}

/// Opening, reading and closing files are not changes
fn is_change(kind: &EventKind) -> bool {
    !matches!(kind, EventKind::Access(_))
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use notify::event::{AccessKind, CreateKind, ModifyKind, RemoveKind};

    use super::*;
    use crate::watch::handoff::Handoff;

    fn shared(armed: bool) -> Shared {
        Shared {
            alive: AtomicBool::new(true),
            armed: AtomicBool::new(armed),
            state: AtomicU8::new(ListenerState::Listening as u8),
        }
    }

    fn event(kind: EventKind, paths: &[&str]) -> notify::Event {
        let mut event = notify::Event::new(kind);
        for p in paths {
            event = event.add_path(PathBuf::from(p));
        }
        event
    }

    #[test]
    fn access_events_are_not_changes() {
        assert!(!is_change(&EventKind::Access(AccessKind::Any)));
        assert!(is_change(&EventKind::Create(CreateKind::File)));
        assert!(is_change(&EventKind::Modify(ModifyKind::Any)));
        assert!(is_change(&EventKind::Remove(RemoveKind::Any)));
    }

    #[test]
    fn forward_emits_one_notification_per_path() {
        let handoff = Handoff::new();
        let ok = forward(
            7,
            event(EventKind::Modify(ModifyKind::Any), &["/w/a", "/w/b"]),
            &handoff.sender(),
            &shared(true),
        );
        assert!(ok);
        let paths: Vec<PathBuf> = handoff.drain().into_iter().map(|n| n.path).collect();
        assert_eq!(paths, vec![PathBuf::from("/w/a"), PathBuf::from("/w/b")]);
    }

    #[test]
    fn forward_skips_when_not_armed() {
        let handoff = Handoff::new();
        forward(
            1,
            event(EventKind::Create(CreateKind::File), &["/w/a"]),
            &handoff.sender(),
            &shared(false),
        );
        assert!(!handoff.has_pending());
    }

    #[test]
    fn forward_stops_once_dead() {
        let handoff = Handoff::new();
        let state = shared(true);
        state.alive.store(false, Ordering::Release);
        let keep_going = forward(
            1,
            event(EventKind::Create(CreateKind::File), &["/w/a"]),
            &handoff.sender(),
            &state,
        );
        assert!(!keep_going);
        assert!(!handoff.has_pending());
    }

    #[test]
    fn spawn_reaches_listening_and_stop_reaches_stopped() {
        let handoff = Handoff::new();
        let mut watcher: DirWatcher<()> = DirWatcher::spawn(1, handoff.sender(), false).unwrap();

        let deadline = Instant::now() + Duration::from_secs(2);
        while watcher.listener_state() != ListenerState::Listening && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }
        assert_eq!(watcher.listener_state(), ListenerState::Listening);

        watcher.stop();
        assert!(!watcher.is_alive());
        assert_eq!(watcher.listener_state(), ListenerState::Stopped);

        // Second stop is a no-op
        watcher.stop();
        assert!(matches!(watcher.watch("/tmp"), Err(WatchError::Stopped)));
    }

    #[test]
    fn unwatch_unknown_path_is_error() {
        let handoff = Handoff::new();
        let mut watcher: DirWatcher<()> = DirWatcher::spawn(1, handoff.sender(), false).unwrap();
        assert!(matches!(
            watcher.unwatch("/definitely/not/watched"),
            Err(WatchError::NotWatched(_))
        ));
    }

    #[test]
    fn callback_replaces_previous() {
        let handoff = Handoff::new();
        let mut watcher: DirWatcher<&str> = DirWatcher::spawn(1, handoff.sender(), false).unwrap();
        watcher.set_callback("first");
        watcher.set_callback("second");
        assert_eq!(watcher.callback(), Some(&"second"));
        watcher.clear_callback();
        assert_eq!(watcher.callback(), None);
    }
}
