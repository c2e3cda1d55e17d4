use std::env;
use std::path::MAIN_SEPARATOR_STR;

use rhai::{Array, Dynamic, Scope};

/// Constants injected into every script scope
#[derive(Debug, Clone)]
pub struct Globals {
    pub platform: String,
    pub exefile: String,
    pub home: String,
    pub args: Vec<String>,
    pub scale: f64,
    pub arch: String,
    pub pathsep: String,
}

impl Globals {
    /// Values for the running process; `args` is the full command line.
    pub fn detect(args: Vec<String>) -> Self {
        Self {
            platform: platform_name().to_string(),
            exefile: env::current_exe()
                .map(|p| p.to_string_lossy().into_owned())
                .unwrap_or_default(),
            home: dirs::home_dir()
                .map(|p| p.to_string_lossy().into_owned())
                .unwrap_or_default(),
            args,
            scale: 1.0,
            arch: format!("{}-{}", env::consts::ARCH, env::consts::OS),
            pathsep: MAIN_SEPARATOR_STR.to_string(),
        }
    }

    pub fn push_into(&self, scope: &mut Scope) {
        let args: Array = self.args.iter().cloned().map(Dynamic::from).collect();
        scope
            .push_constant("PLATFORM", self.platform.clone())
            .push_constant("EXEFILE", self.exefile.clone())
            .push_constant("HOME", self.home.clone())
            .push_constant("ARGS", args)
            .push_constant("SCALE", self.scale)
            .push_constant("ARCH", self.arch.clone())
            .push_constant("PATHSEP", self.pathsep.clone());
    }
}

fn platform_name() -> &'static str {
    match env::consts::OS {
        "linux" => "Linux",
        "macos" => "Mac OS X",
        "windows" => "Windows",
        "freebsd" => "FreeBSD",
        other => other,
    }
}
