//! Control structures: `@if`, `@elseif`, `@foreach`, `@for`, `@while`, their
//! closers, and `@unless`.

use super::{Pass, PassContext, Rewrite};
use crate::error::CompileError;
use crate::matcher::DirectiveMatcher;

const OPENINGS: [&str; 5] = ["if", "elseif", "foreach", "for", "while"];
const CLOSINGS: [&str; 4] = ["endif", "endforeach", "endfor", "endwhile"];

/// `@name(args)` becomes `<% name(args): %>`.
pub struct OpeningPass {
    matchers: Vec<DirectiveMatcher>,
}

impl OpeningPass {
    pub fn new() -> Self {
        OpeningPass {
            matchers: OPENINGS.into_iter().map(DirectiveMatcher::new).collect(),
        }
    }
}

impl Default for OpeningPass {
    fn default() -> Self {
        Self::new()
    }
}

impl Pass for OpeningPass {
    fn name(&self) -> &'static str {
        "structure_openings"
    }

    fn requires(&self) -> &'static [&'static str] {
        &["forelse"]
    }

    fn run(&self, text: &str, _cx: &PassContext<'_>) -> Result<Rewrite, CompileError> {
        let mut text = text.to_string();
        let mut total = 0;
        for matcher in &self.matchers {
            let name = matcher.name();
            let (next, count) = matcher.replace_all(&text, |m, text| {
                format!("{}<% {name}{}: %>", m.indent(text), m.args(text))
            })?;
            text = next;
            total += count;
        }
        Ok(Rewrite::new(text, total))
    }
}

/// `@endname` becomes `<% endname; %>`.
pub struct ClosingPass {
    matchers: Vec<DirectiveMatcher>,
}

impl ClosingPass {
    pub fn new() -> Self {
        ClosingPass {
            matchers: CLOSINGS.into_iter().map(DirectiveMatcher::bare).collect(),
        }
    }
}

impl Default for ClosingPass {
    fn default() -> Self {
        Self::new()
    }
}

impl Pass for ClosingPass {
    fn name(&self) -> &'static str {
        "structure_closings"
    }

    fn requires(&self) -> &'static [&'static str] {
        &["endforelse"]
    }

    fn run(&self, text: &str, _cx: &PassContext<'_>) -> Result<Rewrite, CompileError> {
        let mut text = text.to_string();
        let mut total = 0;
        for matcher in &self.matchers {
            let name = matcher.name();
            let (next, count) = matcher
                .replace_all(&text, |m, text| format!("{}<% {name}; %>", m.indent(text)))?;
            text = next;
            total += count;
        }
        Ok(Rewrite::new(text, total))
    }
}

/// `@unless(cond)` becomes an `if` on the negated condition, copied
/// unmodified.
pub struct UnlessPass {
    matcher: DirectiveMatcher,
}

impl UnlessPass {
    pub fn new() -> Self {
        UnlessPass {
            matcher: DirectiveMatcher::new("unless"),
        }
    }
}

impl Default for UnlessPass {
    fn default() -> Self {
        Self::new()
    }
}

impl Pass for UnlessPass {
    fn name(&self) -> &'static str {
        "unless"
    }

    fn run(&self, text: &str, _cx: &PassContext<'_>) -> Result<Rewrite, CompileError> {
        let (text, count) = self.matcher.replace_all(text, |m, text| {
            format!("{}<% if ( ! ({})): %>", m.indent(text), m.args(text))
        })?;
        Ok(Rewrite::new(text, count))
    }
}
