//! Slate IR - shared types for the host-script stage of the template compiler.
//!
//! Compiled templates are plain text (literal output interleaved with
//! `<% ... %>` code blocks). The parser lowers that text into a [`Program`]:
//! a tree of [`Node`]s over a flat [`ExprArena`].
//!
//! # Architecture
//!
//! ```text
//! template source
//!     │  slate_compile (ordered text passes)
//!     ▼
//! compiled text ──► slate_parse ──► Program ──► slate_eval
//! ```

/// Fail the build if `$ty` is not exactly `$size` bytes.
#[macro_export]
macro_rules! static_assert_size {
    ($ty:ty, $size:expr) => {
        const _: [(); $size] = [(); ::std::mem::size_of::<$ty>()];
    };
}

mod ast;
mod span;

pub use ast::{
    AssignOp, BinaryOp, Branch, Expr, ExprArena, ExprId, ExprKind, Intrinsic, Node, Program,
    UnaryOp,
};
pub use span::{line_number, Span};
