//! The compilation passes.
//!
//! Each pass is a text-to-text rewrite of one family of directives. They
//! run in a fixed order (see [`PassManager::standard`]) and the order is
//! load-bearing: a pass may rely on an earlier one having removed syntax
//! that would otherwise confuse it.
//!
//! Module structure:
//! - `manager.rs`: ordering, verification and execution
//! - `extensions.rs`: user-registered rewrites, run first
//! - `tags.rs`: literal `<%` in template text
//! - `comments.rs`, `echos.rs`: `{{-- --}}` and `{{ }}`
//! - `forelse.rs`: `@forelse`, `@empty`, `@endforelse`
//! - `structures.rs`: `@if`/`@foreach`/... openings and closings, `@else`,
//!   `@unless`
//! - `composition.rs`: `@include`, `@layout`
//! - `sections.rs`: `@section`, `@endsection`, `@yield`, `@yield_section`

mod comments;
mod composition;
mod echos;
mod extensions;
mod forelse;
mod manager;
mod sections;
mod structures;
mod tags;

use regex::Regex;

pub use comments::CommentPass;
pub use composition::{IncludePass, LayoutPass};
pub use echos::EchoPass;
pub use extensions::{Extension, ExtensionPass, Extensions};
pub use forelse::ForelsePass;
pub use manager::PassManager;
pub use sections::{SectionStartPass, YieldPass};
pub use structures::{ClosingPass, OpeningPass, UnlessPass};
pub use tags::OpenTagPass;

use crate::error::CompileError;
use crate::matcher::DirectiveMatcher;

/// Output of one pass.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Rewrite {
    pub text: String,
    /// Number of directives rewritten.
    pub count: usize,
}

impl Rewrite {
    pub fn new(text: String, count: usize) -> Self {
        Rewrite { text, count }
    }
}

/// Shared inputs for a compilation.
#[derive(Clone, Copy, Debug)]
pub struct PassContext<'a> {
    pub extensions: &'a Extensions,
}

/// A compilation pass.
pub trait Pass {
    /// Name of this pass, for ordering and logging.
    fn name(&self) -> &'static str;

    /// Names of passes that must run before this one.
    fn requires(&self) -> &'static [&'static str] {
        &[]
    }

    fn run(&self, text: &str, cx: &PassContext<'_>) -> Result<Rewrite, CompileError>;
}

impl<T: Pass + ?Sized> Pass for Box<T> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn requires(&self) -> &'static [&'static str] {
        (**self).requires()
    }

    fn run(&self, text: &str, cx: &PassContext<'_>) -> Result<Rewrite, CompileError> {
        (**self).run(text, cx)
    }
}

/// Rewrites an argument-less directive into fixed compiled text, keeping
/// its indentation.
pub struct ReplacePass {
    name: &'static str,
    requires: &'static [&'static str],
    matcher: DirectiveMatcher,
    replacement: &'static str,
}

impl ReplacePass {
    pub fn new(
        name: &'static str,
        directive: &'static str,
        replacement: &'static str,
        requires: &'static [&'static str],
    ) -> Self {
        ReplacePass {
            name,
            requires,
            matcher: DirectiveMatcher::bare(directive),
            replacement,
        }
    }
}

impl Pass for ReplacePass {
    fn name(&self) -> &'static str {
        self.name
    }

    fn requires(&self) -> &'static [&'static str] {
        self.requires
    }

    fn run(&self, text: &str, _cx: &PassContext<'_>) -> Result<Rewrite, CompileError> {
        let (text, count) = self
            .matcher
            .replace_all(text, |m, text| format!("{}{}", m.indent(text), self.replacement))?;
        Ok(Rewrite::new(text, count))
    }
}

/// The built-in passes in compilation order.
pub fn standard_passes() -> Vec<Box<dyn Pass>> {
    vec![
        Box::new(ExtensionPass),
        Box::new(OpenTagPass),
        Box::new(CommentPass),
        Box::new(EchoPass),
        Box::new(ForelsePass::new()),
        Box::new(ReplacePass::new(
            "empty",
            "empty",
            "<% endforeach; %><% else: %>",
            &["forelse"],
        )),
        Box::new(ReplacePass::new(
            "endforelse",
            "endforelse",
            "<% endif; %>",
            &["forelse"],
        )),
        Box::new(OpeningPass::new()),
        Box::new(ClosingPass::new()),
        Box::new(ReplacePass::new(
            "else",
            "else",
            "<% else: %>",
            &["structure_openings"],
        )),
        Box::new(UnlessPass::new()),
        Box::new(ReplacePass::new(
            "endunless",
            "endunless",
            "<% endif; %>",
            &["unless"],
        )),
        Box::new(IncludePass::new()),
        Box::new(LayoutPass::new()),
        Box::new(SectionStartPass::new()),
        Box::new(ReplacePass::new(
            "section_end",
            "endsection",
            "<% __section_end(); %>",
            &[],
        )),
        Box::new(YieldPass::new()),
        Box::new(ReplacePass::new(
            "yield_sections",
            "yield_section",
            "<% echo __yield(__section_end()); %>",
            &["section_end"],
        )),
    ]
}

/// Build a regex from a pattern literal.
#[expect(clippy::expect_used, reason = "patterns are literals exercised by tests")]
fn literal_regex(pattern: &str) -> Regex {
    Regex::new(pattern).expect("invalid regex literal")
}
