//! Native modules registered on the script engine
//!
//! Each submodule provides functions under `<module>::*`

pub mod dirmonitor;
pub mod fs;
pub mod regex;
pub mod renderer;
pub mod system;

use rhai::{Dynamic, EvalAltResult};

/// Script numbers may be ints or floats; the host works in either.
pub(crate) fn number(value: &Dynamic) -> Result<f64, Box<EvalAltResult>> {
    if let Ok(n) = value.as_int() {
        return Ok(n as f64);
    }
    value
        .as_float()
        .map_err(|ty| format!("expected a number, got {ty}").into())
}

/// Truncating integer view of a script number
pub(crate) fn integer(value: &Dynamic) -> Result<i64, Box<EvalAltResult>> {
    if let Ok(n) = value.as_int() {
        return Ok(n);
    }
    number(value).map(|n| n as i64)
}
