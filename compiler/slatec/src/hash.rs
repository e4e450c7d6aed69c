//! Cache keys and content hashes.
//!
//! A [`Fingerprint`] names a compiled template in the cache. It is derived
//! from the resolved source path, not the name used to ask for it, so two
//! names resolving to the same file share one entry.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::Path;

use rustc_hash::FxHasher;

/// Prefix of every fingerprint.
const PREFIX: &str = "slate-";

/// Cache key of a resolved template path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Fingerprint(u64);

impl Fingerprint {
    /// Fingerprint of a resolved template path.
    pub fn of_path(path: &Path) -> Self {
        let mut hasher = FxHasher::default();
        path.hash(&mut hasher);
        Fingerprint(hasher.finish())
    }

    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }

    /// Parse the `slate-<hex>` form produced by `Display`.
    pub fn parse(s: &str) -> Option<Self> {
        let hex = s.strip_prefix(PREFIX)?;
        if hex.len() != 16 {
            return None;
        }
        u64::from_str_radix(hex, 16).ok().map(Fingerprint)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{PREFIX}{:016x}", self.0)
    }
}

/// Hash of a text, used to share parsed programs between templates whose
/// compiled text is identical.
pub fn hash_text(text: &str) -> u64 {
    let mut hasher = FxHasher::default();
    text.hash(&mut hasher);
    hasher.finish()
}
