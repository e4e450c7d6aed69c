//! Error types for template execution.
//!
//! `EvalErrorKind` carries the structured category; factory functions are
//! the constructors used throughout the interpreter so messages stay in one
//! place.

use std::fmt;

use slate_ir::{BinaryOp, Span};
use thiserror::Error;

/// Result of evaluation.
pub type EvalResult<T = crate::Value> = Result<T, EvalError>;

/// Typed error category.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum EvalErrorKind {
    // Arithmetic
    #[error("division by zero")]
    DivisionByZero,
    #[error("modulo by zero")]
    ModuloByZero,
    #[error("integer overflow in {operation}")]
    IntegerOverflow { operation: &'static str },

    // Types
    #[error("unsupported operand types: {left} {op} {right}")]
    BinaryTypeMismatch {
        left: &'static str,
        op: BinaryOp,
        right: &'static str,
    },
    #[error("type mismatch: expected {expected}, got {got}")]
    TypeMismatch { expected: String, got: &'static str },
    #[error("{type_name} cannot be converted to text")]
    NotPrintable { type_name: &'static str },
    #[error("{type_name} is not iterable")]
    NotIterable { type_name: &'static str },
    #[error("cannot index into {type_name}")]
    NotIndexable { type_name: &'static str },

    // Access
    #[error("undefined variable: ${name}")]
    UndefinedVariable { name: String },
    #[error("undefined function: {name}()")]
    UndefinedFunction { name: String },
    #[error("undefined index: {key}")]
    UndefinedIndex { key: String },
    #[error("undefined property: {name}")]
    UndefinedProperty { name: String },
    #[error("`[]` can only be used when assigning")]
    AppendRead,

    // Calls
    #[error("{name}() expects {expected} argument(s), got {got}")]
    ArityMismatch {
        name: String,
        expected: String,
        got: usize,
    },
    #[error("{name}(): {message}")]
    InvalidArgument { name: String, message: String },

    // Composition
    #[error("`@endsection` without an open section in `{template}`")]
    UnmatchedSectionEnd { template: String },
    #[error("unclosed section(s) in `{template}`: {}", names.join(", "))]
    UnclosedSections { template: String, names: Vec<String> },
    #[error("include depth limit of {limit} exceeded: {}", chain.join(" -> "))]
    IncludeDepthExceeded { limit: usize, chain: Vec<String> },
    #[error("cannot load template `{name}`: {reason}")]
    TemplateLoad { name: String, reason: String },
    #[error("host service failed: {message}")]
    Host { message: String },
}

/// Execution error with optional location context.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EvalError {
    pub kind: EvalErrorKind,
    /// Span in the compiled text of the template that failed.
    pub span: Option<Span>,
    /// Name of the template being executed when the error occurred.
    pub template: Option<String>,
}

impl EvalError {
    pub fn new(kind: EvalErrorKind) -> Self {
        EvalError {
            kind,
            span: None,
            template: None,
        }
    }

    /// Attach a span unless a more precise one is already present.
    #[must_use]
    pub fn with_span(mut self, span: Span) -> Self {
        self.span.get_or_insert(span);
        self
    }

    /// Attach the template name unless an inner template already claimed it.
    #[must_use]
    pub fn in_template(mut self, name: &str) -> Self {
        if self.template.is_none() {
            self.template = Some(name.to_string());
        }
        self
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.template, self.span) {
            (Some(template), Some(span)) => write!(f, "{template} at {span}: {}", self.kind),
            (Some(template), None) => write!(f, "{template}: {}", self.kind),
            (None, Some(span)) => write!(f, "at {span}: {}", self.kind),
            (None, None) => write!(f, "{}", self.kind),
        }
    }
}

impl std::error::Error for EvalError {}

impl From<EvalErrorKind> for EvalError {
    fn from(kind: EvalErrorKind) -> Self {
        EvalError::new(kind)
    }
}

// Arithmetic

#[cold]
pub fn division_by_zero() -> EvalError {
    EvalErrorKind::DivisionByZero.into()
}

#[cold]
pub fn modulo_by_zero() -> EvalError {
    EvalErrorKind::ModuloByZero.into()
}

#[cold]
pub fn integer_overflow(operation: &'static str) -> EvalError {
    EvalErrorKind::IntegerOverflow { operation }.into()
}

// Types

#[cold]
pub fn binary_type_mismatch(left: &'static str, op: BinaryOp, right: &'static str) -> EvalError {
    EvalErrorKind::BinaryTypeMismatch { left, op, right }.into()
}

#[cold]
pub fn type_mismatch(expected: impl Into<String>, got: &'static str) -> EvalError {
    EvalErrorKind::TypeMismatch {
        expected: expected.into(),
        got,
    }
    .into()
}

#[cold]
pub fn not_printable(type_name: &'static str) -> EvalError {
    EvalErrorKind::NotPrintable { type_name }.into()
}

#[cold]
pub fn not_iterable(type_name: &'static str) -> EvalError {
    EvalErrorKind::NotIterable { type_name }.into()
}

#[cold]
pub fn not_indexable(type_name: &'static str) -> EvalError {
    EvalErrorKind::NotIndexable { type_name }.into()
}

// Access

#[cold]
pub fn undefined_variable(name: &str) -> EvalError {
    EvalErrorKind::UndefinedVariable {
        name: name.to_string(),
    }
    .into()
}

#[cold]
pub fn undefined_function(name: &str) -> EvalError {
    EvalErrorKind::UndefinedFunction {
        name: name.to_string(),
    }
    .into()
}

#[cold]
pub fn undefined_index(key: impl fmt::Display) -> EvalError {
    EvalErrorKind::UndefinedIndex {
        key: key.to_string(),
    }
    .into()
}

#[cold]
pub fn undefined_property(name: &str) -> EvalError {
    EvalErrorKind::UndefinedProperty {
        name: name.to_string(),
    }
    .into()
}

// Calls

#[cold]
pub fn arity_mismatch(name: &str, expected: &str, got: usize) -> EvalError {
    EvalErrorKind::ArityMismatch {
        name: name.to_string(),
        expected: expected.to_string(),
        got,
    }
    .into()
}

#[cold]
pub fn invalid_argument(name: &str, message: impl Into<String>) -> EvalError {
    EvalErrorKind::InvalidArgument {
        name: name.to_string(),
        message: message.into(),
    }
    .into()
}

// Composition

#[cold]
pub fn unmatched_section_end(template: &str) -> EvalError {
    EvalErrorKind::UnmatchedSectionEnd {
        template: template.to_string(),
    }
    .into()
}

#[cold]
pub fn unclosed_sections(template: &str, names: Vec<String>) -> EvalError {
    EvalErrorKind::UnclosedSections {
        template: template.to_string(),
        names,
    }
    .into()
}

#[cold]
pub fn include_depth_exceeded(limit: usize, chain: Vec<String>) -> EvalError {
    EvalErrorKind::IncludeDepthExceeded { limit, chain }.into()
}

#[cold]
pub fn template_load(name: &str, reason: impl fmt::Display) -> EvalError {
    EvalErrorKind::TemplateLoad {
        name: name.to_string(),
        reason: reason.to_string(),
    }
    .into()
}

#[cold]
pub fn host_error(message: impl Into<String>) -> EvalError {
    EvalErrorKind::Host {
        message: message.into(),
    }
    .into()
}
