//! Slate template compiler.
//!
//! Rewrites directive syntax (`{{ }}`, `@if`, `@section`, ...) into
//! compiled text: the template's literal text interleaved with `<% %>`
//! code blocks, ready for `slate_parse`.
//!
//! # Pipeline
//!
//! Compilation is a fixed sequence of text passes, each rewriting one
//! directive family. Several depend on earlier passes having run (comments
//! are gone before echos are matched, `@forelse` is expanded before plain
//! loops are), so the order is part of the contract and [`PassManager`]
//! checks it.
//!
//! ```text
//! extensions → open_tags → comments → echos → forelse → empty → endforelse
//!   → structure_openings → structure_closings → else → unless → endunless
//!   → includes → layouts → section_start → section_end → yields
//!   → yield_sections
//! ```
//!
//! Compilation is a pure function of the source text and the registered
//! extensions.

mod error;
pub mod matcher;
pub mod passes;

pub use error::CompileError;
pub use matcher::{DirectiveMatch, DirectiveMatcher};
pub use passes::{Extension, Extensions, Pass, PassContext, PassManager, Rewrite};

/// Pass pipeline plus the registered extensions.
#[derive(Default)]
pub struct Compiler {
    manager: PassManager,
    extensions: Extensions,
}

impl Compiler {
    pub fn new() -> Self {
        Self::default()
    }

    /// A compiler running a custom pipeline.
    pub fn with_passes(manager: PassManager) -> Self {
        Compiler {
            manager,
            extensions: Extensions::new(),
        }
    }

    /// Register a rewrite applied to raw template text before any
    /// built-in pass.
    pub fn extend(&mut self, extension: impl Fn(&str) -> String + 'static) {
        self.extensions.push(extension);
    }

    pub fn extensions(&self) -> &Extensions {
        &self.extensions
    }

    pub fn pass_names(&self) -> Vec<&'static str> {
        self.manager.pass_names()
    }

    /// Compile template source into compiled text.
    #[tracing::instrument(level = "debug", skip_all, fields(len = source.len()))]
    pub fn compile(&self, source: &str) -> Result<String, CompileError> {
        let cx = PassContext {
            extensions: &self.extensions,
        };
        self.manager.run(source, &cx)
    }
}

/// Compile with the standard passes and no extensions.
pub fn compile(source: &str) -> Result<String, CompileError> {
    Compiler::new().compile(source)
}
