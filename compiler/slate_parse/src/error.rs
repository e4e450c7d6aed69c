//! Parse error types.

use slate_ir::Span;
use thiserror::Error;

/// What went wrong while parsing compiled text.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    #[error("code block opened with `<%` is never closed with `%>`")]
    UnterminatedBlock,

    #[error("invalid input in code block")]
    InvalidToken,

    #[error("expected {expected}, found {found}")]
    UnexpectedToken { expected: String, found: String },

    #[error("`{construct}` is never closed")]
    UnclosedBlock { construct: &'static str },

    #[error("`{found}` has no matching `{opener}`")]
    UnmatchedClose {
        found: &'static str,
        opener: &'static str,
    },

    #[error("`{found}` cannot follow `else`")]
    AfterElse { found: &'static str },

    #[error("cannot assign to this expression")]
    InvalidAssignTarget,

    #[error("`{name}` takes {min} to {max} argument(s), found {found}")]
    IntrinsicArity {
        name: &'static str,
        min: usize,
        max: usize,
        found: usize,
    },
}

/// A parse error with its location in the compiled text.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("line {line}: {kind}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub span: Span,
    /// One-based line of `span.start`.
    pub line: usize,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, span: Span, source: &str) -> Self {
        ParseError {
            kind,
            span,
            line: slate_ir::line_number(source, span.start as usize),
        }
    }
}
