//! Literal `<%` in template text.
//!
//! `<%` opens a code block in compiled text, so one written in the source
//! (an EJS snippet inside a `<script type="text/template">`, a stray
//! `a <% b`) is turned into code that prints it. The trailing line break
//! keeps the text after the tag intact, since the parser drops one break
//! after every `%>`.
//!
//! Tags inside a one-line `{{ ... }}` are left alone: they belong to an
//! expression and the echo pass copies them into a string literal. Tags in
//! the first line of a comment are left for the comment pass, which
//! neutralises them.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::{literal_regex, Pass, PassContext, Rewrite};
use crate::error::CompileError;

const ESCAPED_OPEN_TAG: &str = "<% echo '<%'; %>\n";

/// A comment up to its `--}}` or the end of its line, a one-line echo, or
/// a bare tag. Only the last is rewritten.
static OPEN_TAG: LazyLock<Regex> = LazyLock::new(|| {
    literal_regex(r"(?m)\{\{--.*?(?:--\}\}|$)|\{\{.*?\}\}|<%")
});

pub struct OpenTagPass;

impl Pass for OpenTagPass {
    fn name(&self) -> &'static str {
        "open_tags"
    }

    fn requires(&self) -> &'static [&'static str] {
        &["extensions"]
    }

    fn run(&self, text: &str, _cx: &PassContext<'_>) -> Result<Rewrite, CompileError> {
        let mut count = 0;
        let text = OPEN_TAG.replace_all(text, |caps: &Captures<'_>| {
            let found = &caps[0];
            if found == "<%" {
                count += 1;
                ESCAPED_OPEN_TAG.to_string()
            } else {
                found.to_string()
            }
        });
        Ok(Rewrite::new(text.into_owned(), count))
    }
}
