use std::path::PathBuf;

/// Host settings that can be customized via the Rhai config file
#[derive(Debug, Clone)]
pub struct Settings {
    // Window
    pub window_title: String,

    // Script engine
    pub init_script: Option<PathBuf>,
    pub max_operations: u64, // 0 = unlimited, the script owns the main loop
    pub max_expr_depth: usize,

    // Input
    pub double_click_ms: u64,
    pub wait_slice_ms: u64, // granularity of wait_event while watchers are live

    // Directory monitor
    pub recursive_watch: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            window_title: "kiln".to_string(),

            init_script: None,
            max_operations: 0,
            max_expr_depth: 64,

            double_click_ms: 400,
            wait_slice_ms: 50,

            recursive_watch: false,
        }
    }
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script to run when none is given on the command line
    pub fn default_init_script() -> Option<PathBuf> {
        super::ConfigEngine::config_dir().map(|p| p.join("init.rhai"))
    }
}
