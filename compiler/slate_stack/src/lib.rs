//! Stack growth guard for recursion whose depth follows user input.
//!
//! Three places recurse as deep as a template lets them: the expression
//! parser (nested parentheses), the interpreter (nested blocks and
//! expressions) and the composition runtime (include chains). Each wraps
//! its recursive step in [`ensure_sufficient_stack`].
//!
//! Native targets grow the stack through `stacker` whenever less than
//! [`RED_ZONE`] bytes remain; wasm32 calls straight through.

/// Remaining stack below which a new segment is allocated.
pub const RED_ZONE: usize = 128 * 1024;

/// Size of each newly allocated stack segment.
pub const SEGMENT_SIZE: usize = 2 * 1024 * 1024;

/// Run `f`, first growing the stack if it is close to exhausted.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, SEGMENT_SIZE, f)
}

#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}

#[cfg(test)]
mod tests;
