//! Host configuration: defaults plus an optional `config.rhai` that overrides them

mod engine;
mod settings;

pub use engine::ConfigEngine;
pub use settings::Settings;
