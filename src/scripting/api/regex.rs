//! regex - compiled patterns with byte-offset matches
//!
//! Usage in Rhai:
//! ```rhai
//! let re = regex::compile("fo+", "i");
//! re.cmatch("a FOO b");                    // [[2, 5]]
//! re.cmatch("foo foo", 1);                 // [[4, 7]]
//! re.cmatch("foo", 0, regex::ANCHORED);    // [[0, 3]]
//! ```

use regex::{Regex, RegexBuilder};
use rhai::{Array, Dynamic, Engine, EvalAltResult};

/// Match must start at the given offset
pub const ANCHORED: i64 = 0x8000_0000;
/// Match must end at the end of the subject
pub const ENDANCHORED: i64 = 0x2000_0000;

/// Build a regex from a pattern and a flag string (`i`, `s`, `m`).
pub fn compile(pattern: &str, flags: &str) -> Result<Regex, String> {
    let mut builder = RegexBuilder::new(pattern);
    for flag in flags.chars() {
        match flag {
            'i' => builder.case_insensitive(true),
            's' => builder.dot_matches_new_line(true),
            'm' => builder.multi_line(true),
            other => return Err(format!("unknown regex flag '{other}'")),
        };
    }
    builder.build().map_err(|e| e.to_string())
}

/// Every non-overlapping match, left to right
pub fn find_all(re: &Regex, subject: &str) -> Vec<(usize, usize)> {
    re.find_iter(subject).map(|m| (m.start(), m.end())).collect()
}

/// First match at or after `offset`, subject to the anchoring `options`.
///
/// Anchoring filters that first match only: with `ENDANCHORED`, a later match
/// ending at the end of the subject is not searched for.
pub fn find_from(
    re: &Regex,
    subject: &str,
    offset: usize,
    options: i64,
) -> Result<Option<(usize, usize)>, String> {
    if offset > subject.len() || !subject.is_char_boundary(offset) {
        return Err(format!("offset {offset} is not a valid position in the subject"));
    }
    let Some(m) = re.find_at(subject, offset) else {
        return Ok(None);
    };
    if options & ANCHORED != 0 && m.start() != offset {
        return Ok(None);
    }
    if options & ENDANCHORED != 0 && m.end() != subject.len() {
        return Ok(None);
    }
    Ok(Some((m.start(), m.end())))
}

fn ranges(matches: impl IntoIterator<Item = (usize, usize)>) -> Array {
    matches
        .into_iter()
        .map(|(start, end)| {
            Dynamic::from_array(vec![Dynamic::from(start as i64), Dynamic::from(end as i64)])
        })
        .collect()
}

fn cmatch_from(
    re: &mut Regex,
    subject: &str,
    offset: i64,
    options: i64,
) -> Result<Array, Box<EvalAltResult>> {
    let offset = usize::try_from(offset).map_err(|_| format!("negative offset {offset}"))?;
    Ok(ranges(find_from(re, subject, offset, options)?))
}

pub fn create_module() -> rhai::Module {
    let mut module = rhai::Module::new();

    module.set_native_fn(
        "compile",
        |pattern: &str| -> Result<Regex, Box<EvalAltResult>> { Ok(compile(pattern, "")?) },
    );
    module.set_native_fn(
        "compile",
        |pattern: &str, flags: &str| -> Result<Regex, Box<EvalAltResult>> {
            Ok(compile(pattern, flags)?)
        },
    );

    module.set_var("ANCHORED", ANCHORED);
    module.set_var("ENDANCHORED", ENDANCHORED);

    module
}

pub fn register_types(engine: &mut Engine) {
    engine
        .register_type_with_name::<Regex>("Regex")
        .register_fn("cmatch", |re: &mut Regex, subject: &str| -> Array {
            ranges(find_all(re, subject))
        })
        .register_fn("cmatch", |re: &mut Regex, subject: &str, offset: i64| {
            cmatch_from(re, subject, offset, 0)
        })
        .register_fn(
            "cmatch",
            |re: &mut Regex, subject: &str, offset: i64, options: i64| {
                cmatch_from(re, subject, offset, options)
            },
        )
        .register_fn("to_string", |re: &mut Regex| re.as_str().to_string());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_change_matching() {
        assert!(compile("abc", "").unwrap().find("ABC").is_none());
        assert!(compile("abc", "i").unwrap().find("ABC").is_some());
        assert!(compile("a.b", "s").unwrap().is_match("a\nb"));
        assert!(compile("^b", "m").unwrap().is_match("a\nb"));
        assert!(compile("abc", "x").is_err());
        assert!(compile("(", "").is_err());
    }

    #[test]
    fn all_matches_are_byte_ranges() {
        let re = compile("o+", "").unwrap();
        assert_eq!(find_all(&re, "foo boo"), vec![(1, 3), (5, 7)]);
        assert_eq!(find_all(&re, "é o"), vec![(3, 4)]);
    }

    #[test]
    fn offset_and_anchors() {
        let re = compile("foo", "").unwrap();
        assert_eq!(find_from(&re, "foo foo", 1, 0).unwrap(), Some((4, 7)));
        assert_eq!(find_from(&re, "foo foo", 1, ANCHORED).unwrap(), None);
        assert_eq!(find_from(&re, "foo foo", 4, ANCHORED).unwrap(), Some((4, 7)));
        assert_eq!(find_from(&re, "foo foo", 0, ENDANCHORED).unwrap(), None);
        assert_eq!(find_from(&re, "foo foo", 0, ANCHORED | ENDANCHORED).unwrap(), None);
        assert_eq!(find_from(&re, "foo", 0, ANCHORED | ENDANCHORED).unwrap(), Some((0, 3)));
    }

    #[test]
    fn bad_offsets_are_errors() {
        let re = compile("x", "").unwrap();
        assert!(find_from(&re, "abc", 4, 0).is_err());
        assert!(find_from(&re, "é", 1, 0).is_err());
        assert_eq!(find_from(&re, "abc", 3, 0).unwrap(), None);
    }

    #[test]
    fn script_surface() {
        let mut engine = Engine::new();
        register_types(&mut engine);
        engine.register_static_module("regex", create_module().into());

        let result = engine
            .eval::<Array>(r#"let re = regex::compile("b+"); re.cmatch("abbcb")"#)
            .unwrap();
        assert_eq!(result.len(), 2);

        let anchored = engine
            .eval::<Array>(r#"regex::compile("b").cmatch("ab", 0, regex::ANCHORED)"#)
            .unwrap();
        assert!(anchored.is_empty());

        let end = engine
            .eval::<Array>(r#"regex::compile("b").cmatch("abab", 2, regex::ENDANCHORED)"#)
            .unwrap();
        assert_eq!(end.len(), 1);
        let range = end[0].clone().into_array().unwrap();
        assert_eq!(range[0].as_int().unwrap(), 3);
        assert_eq!(range[1].as_int().unwrap(), 4);

        // Only the first match is checked against the end anchor
        let first_only = engine
            .eval::<Array>(r#"regex::compile("b").cmatch("abab", 0, regex::ENDANCHORED)"#)
            .unwrap();
        assert!(first_only.is_empty());

        assert!(engine.eval::<Dynamic>(r#"regex::compile("(")"#).is_err());
    }
}
