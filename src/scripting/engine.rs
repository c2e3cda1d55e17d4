//! The Rhai host that runs the application script
//!
//! Registers the native modules:
//! - `system::*` - events, time, window, filesystem
//! - `renderer::*` - drawing and fonts
//! - `dirmonitor::*` - directory watchers
//! - `regex::*` - compiled patterns

use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

use log::{debug, info};
use rhai::{AST, Dynamic, Engine, FnPtr, Scope};

use super::api;
use super::context::{HostContext, SharedContext};
use super::globals::Globals;
use crate::error::HostError;

/// Owns the engine, the script's scope and the host context
pub struct ScriptHost {
    engine: Engine,
    context: SharedContext,
    scope: Scope<'static>,
    ast: AST,
}

impl ScriptHost {
    pub fn new(context: HostContext, globals: &Globals) -> Self {
        let context = Rc::new(RefCell::new(context));
        let engine = Self::create_engine(Rc::clone(&context));
        let mut scope = Scope::new();
        globals.push_into(&mut scope);

        Self {
            engine,
            context,
            scope,
            ast: AST::empty(),
        }
    }

    fn create_engine(context: SharedContext) -> Engine {
        let mut engine = Engine::new();

        {
            let ctx = context.borrow();
            let settings = &ctx.settings;
            engine.set_max_expr_depths(settings.max_expr_depth, settings.max_expr_depth);
            // Zero means unlimited
            engine.set_max_operations(settings.max_operations);
        }

        api::dirmonitor::register_types(&mut engine);
        api::regex::register_types(&mut engine);
        api::renderer::register_types(&mut engine);

        engine.register_static_module(
            "system",
            api::system::create_module(Rc::clone(&context)).into(),
        );
        engine.register_static_module(
            "renderer",
            api::renderer::create_module(Rc::clone(&context)).into(),
        );
        engine.register_static_module(
            "dirmonitor",
            api::dirmonitor::create_module(Rc::clone(&context)).into(),
        );
        engine.register_static_module("regex", api::regex::create_module().into());

        engine.on_print(|msg| info!(target: "kiln::script", "{msg}"));
        engine.on_debug(|msg, source, pos| {
            debug!(target: "kiln::script", "{}{pos:?} {msg}", source.unwrap_or(""))
        });

        engine
    }

    /// Load and run a script file
    pub fn load_file(&mut self, path: &Path) -> Result<(), HostError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| HostError::Script(format!("{}: {e}", path.display())))?;
        self.eval(&content)
    }

    /// Evaluate a script. Functions it defines stay callable from later
    /// evaluations and from watcher callbacks.
    pub fn eval(&mut self, script: &str) -> Result<(), HostError> {
        let ast = self
            .engine
            .compile(script)
            .map_err(|e| HostError::Script(format!("parse error: {e}")))?;
        self.ast = self.ast.merge(&ast.clone_functions_only());

        let run = self.ast.clone_functions_only().merge(&ast);
        self.engine
            .run_ast_with_scope(&mut self.scope, &run)
            .map_err(|e| HostError::Script(e.to_string()))
    }

    /// Evaluate an expression against the script's scope and functions
    pub fn eval_expression<T: Clone + 'static>(&mut self, expr: &str) -> Result<T, HostError> {
        let ast = self
            .engine
            .compile_expression(expr)
            .map_err(|e| HostError::Script(format!("parse error: {e}")))?;
        let run = self.ast.clone_functions_only().merge(&ast);
        self.engine
            .eval_ast_with_scope::<T>(&mut self.scope, &run)
            .map_err(|e| HostError::Script(e.to_string()))
    }

    /// Run pending watcher callbacks from outside any script call.
    ///
    /// Returns how many callbacks ran.
    pub fn pump(&mut self) -> Result<usize, HostError> {
        let deliveries = self.context.borrow_mut().watches.take_deliveries();
        let (engine, ast) = (&self.engine, &self.ast);
        api::dirmonitor::run_deliveries(deliveries, |callback: &FnPtr, path| {
            callback.call::<Dynamic>(engine, ast, (path,))
        })
        .map_err(|e| HostError::Script(e.to_string()))
    }

    /// Stop every watcher
    pub fn shutdown(&mut self) {
        self.context.borrow_mut().watches.shutdown();
    }

    pub fn context(&self) -> SharedContext {
        Rc::clone(&self.context)
    }
}

impl Drop for ScriptHost {
    fn drop(&mut self) {
        self.shutdown();
    }
}
