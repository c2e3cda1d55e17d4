//! Integration tests for directory watchers driven from scripts.
//!
//! Each test uses its own temporary directory and a queued event source, so
//! no terminal is involved.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use tempfile::TempDir;

use kiln::config::Settings;
use kiln::event::{EventBridge, NativeEvent, QueuedSource};
use kiln::render::Canvas;
use kiln::scripting::{Globals, HostContext, ScriptHost};

fn new_host(events: Vec<NativeEvent>) -> ScriptHost {
    let mut settings = Settings::default();
    settings.wait_slice_ms = 10;
    let context = HostContext::new(
        EventBridge::new(QueuedSource::from_events(events)),
        Canvas::with_writer(io::sink(), 80, 24),
        settings,
    );
    ScriptHost::new(context, &Globals::detect(vec!["kiln".into()]))
}

/// Wait until at least one notification is queued for the script thread.
fn wait_for_pending(host: &ScriptHost, timeout: Duration) -> bool {
    let start = Instant::now();
    while start.elapsed() < timeout {
        if host.context().borrow().watches.has_pending() {
            return true;
        }
        thread::sleep(Duration::from_millis(20));
    }
    false
}

fn create_test_file(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    File::create(&path).expect("Failed to create test file");
    path
}

fn watch_script(dir: &Path) -> String {
    format!(
        r#"
        let hits = [];
        let w = dirmonitor::create();
        let count = w.watch("{}");
        w.check(|path| hits.push(path));
        "#,
        dir.display()
    )
}

// ============================================================================
// Delivery
// ============================================================================

#[test]
fn created_file_is_reported_once() {
    let temp = TempDir::new().unwrap();
    let mut host = new_host(Vec::new());
    host.eval(&watch_script(temp.path())).unwrap();
    assert_eq!(host.eval_expression::<i64>("count").unwrap(), 1);

    let file = create_test_file(temp.path(), "a.txt");
    assert!(wait_for_pending(&host, Duration::from_secs(5)));
    // Give any follow-up events a chance to arrive
    thread::sleep(Duration::from_millis(200));

    host.eval(
        r#"
        while system::poll_event() != () {}
        "#,
    )
    .unwrap();

    assert_eq!(host.eval_expression::<i64>("hits.len()").unwrap(), 1);
    let reported = host.eval_expression::<String>("hits[0]").unwrap();
    assert_eq!(Path::new(&reported).file_name(), file.file_name());
}

#[test]
fn wait_event_wakes_for_notifications() {
    let temp = TempDir::new().unwrap();
    let mut host = new_host(Vec::new());
    host.eval(&watch_script(temp.path())).unwrap();

    let dir = temp.path().to_path_buf();
    let writer = thread::spawn(move || {
        thread::sleep(Duration::from_millis(100));
        create_test_file(&dir, "later.txt");
    });

    let start = Instant::now();
    let woke = host.eval_expression::<bool>("system::wait_event(10)").unwrap();
    writer.join().unwrap();

    assert!(woke);
    assert!(start.elapsed() < Duration::from_secs(10));

    host.eval("system::poll_event();").unwrap();
    assert!(host.eval_expression::<i64>("hits.len()").unwrap() >= 1);
}

#[test]
fn huge_wait_timeout_is_accepted() {
    let temp = TempDir::new().unwrap();
    let mut host = new_host(Vec::new());
    host.eval(&watch_script(temp.path())).unwrap();

    let dir = temp.path().to_path_buf();
    let writer = thread::spawn(move || {
        thread::sleep(Duration::from_millis(100));
        create_test_file(&dir, "eventually.txt");
    });

    assert!(host.eval_expression::<bool>("system::wait_event(1e30)").unwrap());
    writer.join().unwrap();
}

#[test]
fn events_in_nested_directories_are_ignored_by_default() {
    let temp = TempDir::new().unwrap();
    let nested = temp.path().join("nested");
    fs::create_dir(&nested).unwrap();

    let mut host = new_host(Vec::new());
    host.eval(&watch_script(temp.path())).unwrap();

    create_test_file(&nested, "deep.txt");
    thread::sleep(Duration::from_millis(300));
    host.eval("system::poll_event();").unwrap();

    let hits = host.eval_expression::<rhai::Array>("hits").unwrap();
    assert!(
        hits.iter()
            .all(|p| !p.clone().into_string().unwrap().ends_with("deep.txt"))
    );
}

// ============================================================================
// Lifetime
// ============================================================================

#[test]
fn watcher_without_callback_queues_nothing() {
    let temp = TempDir::new().unwrap();
    let mut host = new_host(Vec::new());
    host.eval(&format!(
        r#"let w = dirmonitor::create(); w.watch("{}");"#,
        temp.path().display()
    ))
    .unwrap();

    create_test_file(temp.path(), "quiet.txt");
    assert!(!wait_for_pending(&host, Duration::from_millis(300)));
}

#[test]
fn shutdown_stops_every_watcher() {
    let temp = TempDir::new().unwrap();
    let mut host = new_host(Vec::new());
    host.eval(&watch_script(temp.path())).unwrap();
    host.eval(&watch_script(temp.path())).unwrap();
    assert_eq!(host.context().borrow().watches.live_watchers(), 2);

    host.shutdown();
    assert_eq!(host.context().borrow().watches.live_watchers(), 0);

    create_test_file(temp.path(), "after.txt");
    assert!(!wait_for_pending(&host, Duration::from_millis(300)));
    assert_eq!(host.pump().unwrap(), 0);
}

#[test]
fn unwatched_directory_stops_reporting() {
    let temp = TempDir::new().unwrap();
    let mut host = new_host(Vec::new());
    host.eval(&watch_script(temp.path())).unwrap();
    host.eval(&format!(r#"w.unwatch("{}");"#, temp.path().display()))
        .unwrap();

    create_test_file(temp.path(), "ignored.txt");
    assert!(!wait_for_pending(&host, Duration::from_millis(300)));
}
