//! `{{ expr }}` interpolation.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::{literal_regex, Pass, PassContext, Rewrite};
use crate::error::CompileError;

/// The expression excludes the whitespace just inside the braces and is
/// otherwise copied verbatim.
static ECHO: LazyLock<Regex> = LazyLock::new(|| literal_regex(r"\{\{\s*(.+?)\s*\}\}"));

pub struct EchoPass;

impl Pass for EchoPass {
    fn name(&self) -> &'static str {
        "echos"
    }

    fn requires(&self) -> &'static [&'static str] {
        &["comments"]
    }

    fn run(&self, text: &str, _cx: &PassContext<'_>) -> Result<Rewrite, CompileError> {
        let mut count = 0;
        let text = ECHO.replace_all(text, |caps: &Captures<'_>| {
            count += 1;
            format!("<% echo {}; %>", &caps[1])
        });
        Ok(Rewrite::new(text.into_owned(), count))
    }
}
