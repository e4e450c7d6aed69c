//! Compiled template cache.
//!
//! Stores compiled text keyed by [`Fingerprint`]. Each entry records when
//! it was saved, which the engine compares against the source file's
//! modification time, and an optional expiry after which the entry reads
//! as absent.

mod file;
mod memory;

use std::path::PathBuf;
use std::time::{Duration, SystemTime};

use thiserror::Error;

use crate::hash::Fingerprint;

pub use file::FileCache;
pub use memory::MemoryCache;

/// Cache operation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheError {
    #[error("cache I/O error at {}: {message}", path.display())]
    Io { path: PathBuf, message: String },

    #[error("corrupt cache metadata at {}: {message}", path.display())]
    Metadata { path: PathBuf, message: String },
}

/// Timestamps of a cached entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CacheMetadata {
    /// When the entry was saved.
    pub modified: SystemTime,
    /// When the entry stops being served. `None` never expires.
    pub expires: Option<SystemTime>,
}

impl CacheMetadata {
    /// Metadata for an entry saved at `modified` that lives for `ttl`.
    /// A zero `ttl` never expires.
    pub fn new(modified: SystemTime, ttl: Duration) -> Self {
        let expires = if ttl.is_zero() {
            None
        } else {
            modified.checked_add(ttl)
        };
        CacheMetadata { modified, expires }
    }

    pub fn is_expired_at(&self, now: SystemTime) -> bool {
        self.expires.is_some_and(|expires| now >= expires)
    }

    /// Whether the entry was saved after `source_modified`.
    pub fn is_newer_than(&self, source_modified: SystemTime) -> bool {
        self.modified > source_modified
    }
}

pub trait CompiledCache {
    /// Compiled text for `key`, unless absent or expired.
    fn get(&self, key: Fingerprint) -> Option<String>;

    /// Metadata for `key`, unless absent or expired.
    fn metadata(&self, key: Fingerprint) -> Option<CacheMetadata>;

    fn save(&self, key: Fingerprint, text: &str, ttl: Duration) -> Result<(), CacheError>;
}

/// Stores nothing; every lookup misses.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullCache;

impl CompiledCache for NullCache {
    fn get(&self, _key: Fingerprint) -> Option<String> {
        None
    }

    fn metadata(&self, _key: Fingerprint) -> Option<CacheMetadata> {
        None
    }

    fn save(&self, _key: Fingerprint, _text: &str, _ttl: Duration) -> Result<(), CacheError> {
        Ok(())
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
