//! dirmonitor - watch directories for changes
//!
//! Usage in Rhai:
//! ```rhai
//! let w = dirmonitor::create();
//! w.watch("/some/dir");
//! w.check(|path| print(`changed: ${path}`));
//! ```
//!
//! Callbacks run on the script thread, from `system::poll_event` or the host's
//! `pump`, never from the watcher's own thread.

use log::warn;
use rhai::{Dynamic, Engine, EvalAltResult, FnPtr};

use crate::scripting::context::SharedContext;
use crate::watch::{Delivery, WatchHandle};

/// Script-side watcher value; clones share the same watcher
#[derive(Clone)]
pub struct ScriptWatcher(pub WatchHandle<FnPtr>);

pub fn create_module(context: SharedContext) -> rhai::Module {
    let mut module = rhai::Module::new();

    // `new` is reserved in Rhai
    module.set_native_fn(
        "create",
        move || -> Result<ScriptWatcher, Box<EvalAltResult>> {
            let handle = context
                .borrow_mut()
                .watches
                .new_watcher()
                .map_err(|e| e.to_string())?;
            Ok(ScriptWatcher(handle))
        },
    );

    module
}

pub fn register_types(engine: &mut Engine) {
    engine
        .register_type_with_name::<ScriptWatcher>("Watcher")
        .register_fn("watch", |w: &mut ScriptWatcher, path: &str| -> i64 {
            match w.0.borrow_mut().watch(path) {
                Ok(count) => count as i64,
                Err(e) => {
                    warn!(target: "kiln::watch", "watch {path}: {e}");
                    -1
                }
            }
        })
        .register_fn(
            "unwatch",
            |w: &mut ScriptWatcher, path: &str| -> Result<(), Box<EvalAltResult>> {
                w.0.borrow_mut()
                    .unwatch(path)
                    .map(|_| ())
                    .map_err(|e| e.to_string().into())
            },
        )
        .register_fn("check", |w: &mut ScriptWatcher, callback: FnPtr| {
            w.0.borrow_mut().set_callback(callback);
        })
        .register_fn("mode", |w: &mut ScriptWatcher| -> bool { w.0.borrow().mode() });
}

/// Run every delivery through `call`, in order.
///
/// A failing callback doesn't stop the rest; the first error is returned once
/// all have run.
pub(crate) fn run_deliveries(
    deliveries: Vec<Delivery<FnPtr>>,
    mut call: impl FnMut(&FnPtr, String) -> Result<Dynamic, Box<EvalAltResult>>,
) -> Result<usize, Box<EvalAltResult>> {
    let count = deliveries.len();
    let mut first_error = None;
    for delivery in deliveries {
        let path = delivery.path.to_string_lossy().into_owned();
        if let Err(e) = call(&delivery.callback, path) {
            warn!(target: "kiln::watch", "callback {} failed: {e}", delivery.callback.fn_name());
            first_error.get_or_insert(e);
        }
    }
    match first_error {
        Some(e) => Err(e),
        None => Ok(count),
    }
}
