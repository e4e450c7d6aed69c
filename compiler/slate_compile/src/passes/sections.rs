//! `@section(name)` and `@yield(name)`. The argument-less `@endsection` and
//! `@yield_section` are plain replacements.

use super::{Pass, PassContext, Rewrite};
use crate::error::CompileError;
use crate::matcher::DirectiveMatcher;

pub struct SectionStartPass {
    matcher: DirectiveMatcher,
}

impl SectionStartPass {
    pub fn new() -> Self {
        SectionStartPass {
            matcher: DirectiveMatcher::new("section"),
        }
    }
}

impl Default for SectionStartPass {
    fn default() -> Self {
        Self::new()
    }
}

impl Pass for SectionStartPass {
    fn name(&self) -> &'static str {
        "section_start"
    }

    fn run(&self, text: &str, _cx: &PassContext<'_>) -> Result<Rewrite, CompileError> {
        let (text, count) = self.matcher.replace_all(text, |m, text| {
            format!("{}<% __section_start{}; %>", m.indent(text), m.args(text))
        })?;
        Ok(Rewrite::new(text, count))
    }
}

pub struct YieldPass {
    matcher: DirectiveMatcher,
}

impl YieldPass {
    pub fn new() -> Self {
        YieldPass {
            matcher: DirectiveMatcher::new("yield"),
        }
    }
}

impl Default for YieldPass {
    fn default() -> Self {
        Self::new()
    }
}

impl Pass for YieldPass {
    fn name(&self) -> &'static str {
        "yields"
    }

    fn run(&self, text: &str, _cx: &PassContext<'_>) -> Result<Rewrite, CompileError> {
        let (text, count) = self.matcher.replace_all(text, |m, text| {
            format!("{}<% echo __yield{}; %>", m.indent(text), m.args(text))
        })?;
        Ok(Rewrite::new(text, count))
    }
}
