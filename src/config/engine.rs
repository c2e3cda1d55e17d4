use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use rhai::{Engine, Scope};

use super::Settings;
use crate::error::HostError;

/// The Rhai engine that evaluates `config.rhai`
///
/// This is a separate, sandboxed engine: config scripts only see the setters
/// below, never the host modules.
pub struct ConfigEngine {
    engine: Engine,
    settings: Arc<RwLock<Settings>>,
}

impl ConfigEngine {
    pub fn new() -> Self {
        Self::with_settings(Settings::default())
    }

    /// Start from existing settings instead of the defaults
    pub fn with_settings(settings: Settings) -> Self {
        let settings = Arc::new(RwLock::new(settings));
        let engine = Self::create_engine(Arc::clone(&settings));
        Self { engine, settings }
    }

    fn create_engine(settings: Arc<RwLock<Settings>>) -> Engine {
        let mut engine = Engine::new();

        // Limit config execution for safety
        engine.set_max_expr_depths(64, 64);
        engine.set_max_operations(100_000);

        {
            let s = Arc::clone(&settings);
            engine.register_fn("set_window_title", move |title: &str| {
                if let Ok(mut settings) = s.write() {
                    settings.window_title = title.to_string();
                }
            });
        }

        {
            let s = Arc::clone(&settings);
            engine.register_fn("get_window_title", move || -> String {
                s.read().map(|s| s.window_title.clone()).unwrap_or_default()
            });
        }

        {
            let s = Arc::clone(&settings);
            engine.register_fn("set_init_script", move |path: &str| {
                if let Ok(mut settings) = s.write() {
                    settings.init_script = Some(PathBuf::from(path));
                }
            });
        }

        {
            let s = Arc::clone(&settings);
            engine.register_fn("set_max_operations", move |ops: i64| {
                if let Ok(mut settings) = s.write() {
                    settings.max_operations = ops.max(0) as u64;
                }
            });
        }

        {
            let s = Arc::clone(&settings);
            engine.register_fn("set_max_expr_depth", move |depth: i64| {
                if let Ok(mut settings) = s.write() {
                    settings.max_expr_depth = depth.clamp(8, 1024) as usize;
                }
            });
        }

        {
            let s = Arc::clone(&settings);
            engine.register_fn("set_double_click_ms", move |ms: i64| {
                if let Ok(mut settings) = s.write() {
                    settings.double_click_ms = ms.clamp(50, 5_000) as u64;
                }
            });
        }

        {
            let s = Arc::clone(&settings);
            engine.register_fn("set_wait_slice_ms", move |ms: i64| {
                if let Ok(mut settings) = s.write() {
                    settings.wait_slice_ms = ms.clamp(1, 1_000) as u64;
                }
            });
        }

        {
            let s = Arc::clone(&settings);
            engine.register_fn("set_recursive_watch", move |enabled: bool| {
                if let Ok(mut settings) = s.write() {
                    settings.recursive_watch = enabled;
                }
            });
        }

        engine.on_print(|msg| log::info!(target: "kiln::config", "{msg}"));

        engine
    }

    /// Load and execute a config file
    pub fn load_file(&mut self, path: &Path) -> Result<(), HostError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            HostError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;

        self.eval(&content)
    }

    /// Evaluate a Rhai config string
    pub fn eval(&mut self, script: &str) -> Result<(), HostError> {
        let ast = self
            .engine
            .compile(script)
            .map_err(|e| HostError::Config(format!("parse error: {}", e)))?;

        let mut scope = Scope::new();
        self.engine
            .run_ast_with_scope(&mut scope, &ast)
            .map_err(|e| HostError::Config(e.to_string()))?;

        Ok(())
    }

    /// Get the current settings (cloned)
    pub fn settings(&self) -> Settings {
        self.settings.read().map(|s| s.clone()).unwrap_or_default()
    }

    /// Get the config directory path
    pub fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("kiln"))
    }

    /// Get the default config file path
    pub fn config_file() -> Option<PathBuf> {
        Self::config_dir().map(|p| p.join("config.rhai"))
    }

    /// Load the default config file if it exists
    pub fn load_default(&mut self) -> Result<(), HostError> {
        if let Some(config_file) = Self::config_file() {
            if config_file.exists() {
                log::info!("Loading config from {}", config_file.display());
                return self.load_file(&config_file);
            }
        }
        Ok(()) // No config file is fine
    }
}

impl Default for ConfigEngine {
    fn default() -> Self {
        Self::new()
    }
}
