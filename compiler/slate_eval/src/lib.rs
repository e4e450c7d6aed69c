//! Slate runtime: values, the interpreter and the composition runtime.
//!
//! A parsed [`slate_ir::Program`] runs inside a [`Runtime`], which owns the
//! state of one render: the output capture stack, the section store and
//! the chain of templates currently executing. Templates reach that state
//! only through four intrinsics (`__include`, `__yield`,
//! `__section_start`, `__section_end`).
//!
//! Name resolution is two-tier. Variables come from the template's data
//! and then from [`HostServices::lookup`]; functions come from the
//! builtins and then from [`HostServices::call`].

mod builtins;
mod environment;
mod errors;
mod interpreter;
mod operators;
mod output;
mod runtime;
mod sections;
mod services;
mod value;

pub use builtins::{call_builtin, is_builtin};
pub use environment::Environment;
pub use errors::{
    host_error, template_load, EvalError, EvalErrorKind, EvalResult,
};
pub use interpreter::Interpreter;
pub use operators::{evaluate_binary, evaluate_unary};
pub use output::OutputStack;
pub use runtime::{Composer, Runtime, DEFAULT_MAX_INCLUDE_DEPTH};
pub use sections::{Sections, PARENT_MARKER};
pub use services::{HostServices, NoServices};
pub use value::{format_float, next_index, parse_numeric, Map, Number, Value};
