//! `@forelse(...)`: a loop with a fallback for empty collections.
//!
//! The opening directive becomes a guard on the collection's size followed
//! by the loop itself. `@empty` and `@endforelse` are plain replacements
//! that close the loop and the guard (see [`super::standard_passes`]).

use std::sync::LazyLock;

use regex::Regex;

use super::{literal_regex, Pass, PassContext, Rewrite};
use crate::error::CompileError;
use crate::matcher::DirectiveMatcher;

static FIRST_VARIABLE: LazyLock<Regex> = LazyLock::new(|| literal_regex(r"\$\w+"));

pub struct ForelsePass {
    matcher: DirectiveMatcher,
}

impl ForelsePass {
    pub fn new() -> Self {
        ForelsePass {
            matcher: DirectiveMatcher::new("forelse"),
        }
    }
}

impl Default for ForelsePass {
    fn default() -> Self {
        Self::new()
    }
}

impl Pass for ForelsePass {
    fn name(&self) -> &'static str {
        "forelse"
    }

    fn run(&self, text: &str, _cx: &PassContext<'_>) -> Result<Rewrite, CompileError> {
        let (text, count) = self.matcher.replace_all(text, |m, text| {
            let iterable = guarded_iterable(m.inner_args(text));
            format!(
                "{}<% if (count({iterable}) > 0): %><% foreach{}: %>",
                m.indent(text),
                m.args(text)
            )
        })?;
        Ok(Rewrite::new(text, count))
    }
}

/// The collection a forelse loop walks: the text before a top-level ` as `,
/// else the first variable, else the whole argument.
pub(crate) fn guarded_iterable(args: &str) -> &str {
    if let Some(at) = top_level_as(args) {
        return args[..at].trim();
    }
    FIRST_VARIABLE
        .find(args)
        .map_or_else(|| args.trim(), |m| m.as_str())
}

/// Offset of ` as ` outside brackets and strings.
fn top_level_as(args: &str) -> Option<usize> {
    let bytes = args.as_bytes();
    let mut depth = 0i32;
    let mut quote: Option<u8> = None;
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        match quote {
            Some(_) if b == b'\\' => i += 1,
            Some(q) if b == q => quote = None,
            Some(_) => {}
            None => match b {
                b'\'' | b'"' => quote = Some(b),
                b'(' | b'[' => depth += 1,
                b')' | b']' => depth -= 1,
                b' ' if depth == 0 && bytes[i..].starts_with(b" as ") => return Some(i),
                _ => {}
            },
        }
        i += 1;
    }
    None
}
