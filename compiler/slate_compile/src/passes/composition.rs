//! `@include` and `@layout`.

use super::{Pass, PassContext, Rewrite};
use crate::error::CompileError;
use crate::matcher::DirectiveMatcher;

/// `@include(name[, data])` echoes the included template in place.
pub struct IncludePass {
    matcher: DirectiveMatcher,
}

impl IncludePass {
    pub fn new() -> Self {
        IncludePass {
            matcher: DirectiveMatcher::new("include"),
        }
    }
}

impl Default for IncludePass {
    fn default() -> Self {
        Self::new()
    }
}

impl Pass for IncludePass {
    fn name(&self) -> &'static str {
        "includes"
    }

    fn run(&self, text: &str, _cx: &PassContext<'_>) -> Result<Rewrite, CompileError> {
        let (text, count) = self.matcher.replace_all(text, |m, text| {
            format!("{}<% echo __include{}; %>", m.indent(text), m.args(text))
        })?;
        Ok(Rewrite::new(text, count))
    }
}

/// `@layout(name[, data])` is moved to the end of the template as an
/// include, so the child's sections are all defined before the layout
/// runs and yields them.
pub struct LayoutPass {
    matcher: DirectiveMatcher,
}

impl LayoutPass {
    pub fn new() -> Self {
        LayoutPass {
            matcher: DirectiveMatcher::new("layout"),
        }
    }
}

impl Default for LayoutPass {
    fn default() -> Self {
        Self::new()
    }
}

impl Pass for LayoutPass {
    fn name(&self) -> &'static str {
        "layouts"
    }

    fn run(&self, text: &str, _cx: &PassContext<'_>) -> Result<Rewrite, CompileError> {
        let matches = self.matcher.find_all(text)?;
        if matches.is_empty() {
            return Ok(Rewrite::new(text.to_string(), 0));
        }

        let mut out = String::with_capacity(text.len() + 64 * matches.len());
        let mut last = 0;
        for m in &matches {
            out.push_str(&text[last..m.start]);
            last = m.end;
        }
        out.push_str(&text[last..]);

        for m in &matches {
            out.push('\n');
            out.push_str(m.indent(text));
            out.push_str("<% echo __include");
            out.push_str(m.args(text));
            out.push_str("; %>\n");
        }
        Ok(Rewrite::new(out, matches.len()))
    }
}
