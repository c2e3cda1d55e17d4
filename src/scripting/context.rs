use std::cell::RefCell;
use std::io;
use std::rc::Rc;
use std::time::{Duration, Instant};

use rhai::FnPtr;

use crate::config::Settings;
use crate::error::HostError;
use crate::event::{EventBridge, ScriptEvent};
use crate::render::Canvas;
use crate::watch::WatchService;

/// Context handed to every native function
pub type SharedContext = Rc<RefCell<HostContext>>;

pub const WINDOW_MODES: [&str; 4] = ["normal", "minimized", "maximized", "fullscreen"];

/// What scripts have asked of the window
#[derive(Debug, Clone)]
pub struct WindowState {
    pub title: String,
    pub mode: String,
    pub bordered: bool,
}

/// Everything native bindings may touch, owned by the script host
pub struct HostContext {
    pub bridge: EventBridge,
    pub watches: WatchService<FnPtr>,
    pub canvas: Canvas,
    pub window: WindowState,
    pub settings: Settings,
    fatal: Option<(String, String)>,
    started: Instant,
}

impl HostContext {
    pub fn new(bridge: EventBridge, canvas: Canvas, settings: Settings) -> Self {
        Self {
            bridge,
            watches: WatchService::with_recursive(settings.recursive_watch),
            canvas,
            window: WindowState {
                title: settings.window_title.clone(),
                mode: "normal".to_string(),
                bordered: true,
            },
            settings,
            fatal: None,
            started: Instant::now(),
        }
    }

    /// Next script event, keeping the canvas size in step with resizes.
    pub fn poll_event(&mut self) -> Result<Option<ScriptEvent>, HostError> {
        let event = self.bridge.poll()?;
        if let Some(ScriptEvent::Resized { width, height }) = &event {
            let cells = |n: i32| u16::try_from(n.max(0)).unwrap_or(u16::MAX);
            self.canvas.resize(cells(*width), cells(*height));
        }
        Ok(event)
    }

    /// Block until a native event or a filesystem notification is pending,
    /// or the timeout elapses.
    pub fn wait_event(&mut self, timeout: Option<Duration>) -> Result<bool, HostError> {
        if self.watches.has_pending() {
            return Ok(true);
        }
        if self.watches.live_watchers() == 0 {
            return self.bridge.wait_with_timeout(timeout);
        }

        // Watchers can't wake the native queue, so wait in slices and check
        // the hand-off queue in between.
        let slice = Duration::from_millis(self.settings.wait_slice_ms.max(1));
        // A timeout too large to represent is the same as none
        let deadline = timeout.and_then(|t| Instant::now().checked_add(t));
        loop {
            let step = match deadline {
                Some(d) => d.saturating_duration_since(Instant::now()).min(slice),
                None => slice,
            };
            if self.bridge.wait_with_timeout(Some(step))? || self.watches.has_pending() {
                return Ok(true);
            }
            if deadline.is_some_and(|d| Instant::now() >= d) {
                return Ok(false);
            }
        }
    }

    pub fn set_title(&mut self, title: &str) -> io::Result<()> {
        self.window.title = title.to_string();
        self.canvas.set_title(title)
    }

    /// Whole seconds since the host started
    pub fn elapsed_secs(&self) -> i64 {
        self.started.elapsed().as_secs() as i64
    }

    pub fn report_fatal(&mut self, title: &str, message: &str) {
        log::error!(target: "kiln::script", "{title}: {message}");
        self.fatal = Some((title.to_string(), message.to_string()));
    }

    /// Fatal error reported by the script, to be shown once the screen is restored
    pub fn take_fatal(&mut self) -> Option<(String, String)> {
        self.fatal.take()
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::event::{NativeEvent, QueuedSource, WindowReason};

    fn context(events: Vec<NativeEvent>) -> HostContext {
        let mut settings = Settings::default();
        settings.wait_slice_ms = 10;
        HostContext::new(
            EventBridge::new(QueuedSource::from_events(events)),
            Canvas::with_writer(io::sink(), 80, 24),
            settings,
        )
    }

    #[test]
    fn resize_updates_canvas() {
        let mut ctx = context(vec![NativeEvent::Window {
            reason: WindowReason::Resized,
            data1: 100,
            data2: 40,
        }]);
        ctx.poll_event().unwrap();
        assert_eq!(ctx.canvas.size(), (100, 40));
    }

    #[test]
    fn wait_without_watchers_times_out() {
        let mut ctx = context(Vec::new());
        let start = Instant::now();
        assert!(!ctx.wait_event(Some(Duration::from_millis(30))).unwrap());
        assert!(start.elapsed() >= Duration::from_millis(30));
    }

    #[test]
    fn wait_sees_native_event() {
        let mut ctx = context(vec![NativeEvent::Quit]);
        assert!(ctx.wait_event(None).unwrap());
    }

    #[test]
    fn wait_wakes_on_filesystem_notification() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = context(Vec::new());
        let watcher = ctx.watches.new_watcher().unwrap();
        watcher.borrow_mut().watch(dir.path()).unwrap();
        watcher
            .borrow_mut()
            .set_callback(FnPtr::new("on_change").unwrap());

        fs::File::create(dir.path().join("wake.txt")).unwrap();
        assert!(ctx.wait_event(Some(Duration::from_secs(5))).unwrap());
        assert!(ctx.watches.has_pending());
    }

    #[test]
    fn huge_timeout_with_live_watcher_does_not_panic() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = context(Vec::new());
        let watcher = ctx.watches.new_watcher().unwrap();
        watcher.borrow_mut().watch(dir.path()).unwrap();
        watcher
            .borrow_mut()
            .set_callback(FnPtr::new("on_change").unwrap());

        fs::File::create(dir.path().join("wake.txt")).unwrap();
        let huge = Duration::try_from_secs_f64(1e30).unwrap_or(Duration::MAX);
        assert!(ctx.wait_event(Some(huge)).unwrap());
    }

    #[test]
    fn oversized_resize_saturates() {
        let mut ctx = context(vec![NativeEvent::Window {
            reason: WindowReason::Resized,
            data1: 70_000,
            data2: -5,
        }]);
        ctx.poll_event().unwrap();
        assert_eq!(ctx.canvas.size(), (u16::MAX, 0));
    }

    #[test]
    fn fatal_is_taken_once() {
        let mut ctx = context(Vec::new());
        ctx.report_fatal("boom", "it broke");
        assert_eq!(
            ctx.take_fatal(),
            Some(("boom".to_string(), "it broke".to_string()))
        );
        assert_eq!(ctx.take_fatal(), None);
    }
}
