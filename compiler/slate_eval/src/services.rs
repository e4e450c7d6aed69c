//! Host services: the explicit fallback for names a template's data does
//! not define.
//!
//! Variable lookup tries the template environment first, then
//! [`HostServices::lookup`]. Function calls try the builtins first, then
//! [`HostServices::call`]. Both default to "not provided".

use crate::errors::EvalResult;
use crate::value::Value;

pub trait HostServices {
    /// Value for an undefined variable, if the host provides one.
    fn lookup(&self, name: &str) -> Option<Value> {
        let _ = name;
        None
    }

    /// Result of calling a function that is not a builtin, or `None` if the
    /// host does not provide it.
    fn call(&self, name: &str, args: &[Value]) -> Option<EvalResult> {
        let _ = (name, args);
        None
    }
}

/// Provides nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoServices;

impl HostServices for NoServices {}
