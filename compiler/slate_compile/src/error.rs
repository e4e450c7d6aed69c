//! Compilation errors.

use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum CompileError {
    /// A directive's `(` has no matching `)` before the end of the template.
    #[error("line {line}: argument list of `@{directive}` is never closed")]
    UnclosedDirective { directive: String, line: usize },

    /// A pass is scheduled before a pass it depends on.
    #[error("pass `{pass}` must run after `{requires}`")]
    PassOrder {
        pass: &'static str,
        requires: &'static str,
    },

    /// A pass depends on a pass the pipeline does not contain.
    #[error("pass `{pass}` requires `{requires}`, which is not in the pipeline")]
    MissingPass {
        pass: &'static str,
        requires: &'static str,
    },
}
