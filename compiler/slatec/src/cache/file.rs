use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use serde::{Deserialize, Serialize};

use super::{CacheError, CacheMetadata, CompiledCache};
use crate::hash::Fingerprint;

/// On-disk form of [`CacheMetadata`].
#[derive(Debug, Serialize, Deserialize)]
struct MetaFile {
    saved_at: SystemTime,
    ttl: Duration,
}

impl MetaFile {
    fn metadata(&self) -> CacheMetadata {
        CacheMetadata::new(self.saved_at, self.ttl)
    }
}

/// Cache directory holding `<key>.compiled` and `<key>.meta.json` pairs.
#[derive(Debug, Clone)]
pub struct FileCache {
    dir: PathBuf,
}

impl FileCache {
    /// Open a cache directory, creating it if needed.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, CacheError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| io_error(&dir, &e))?;
        Ok(FileCache { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    #[must_use]
    pub fn compiled_path(&self, key: Fingerprint) -> PathBuf {
        self.dir.join(format!("{key}.compiled"))
    }

    #[must_use]
    pub fn meta_path(&self, key: Fingerprint) -> PathBuf {
        self.dir.join(format!("{key}.meta.json"))
    }

    /// Remove an entry. Missing files are not an error.
    pub fn remove(&self, key: Fingerprint) -> Result<(), CacheError> {
        for path in [self.meta_path(key), self.compiled_path(key)] {
            match fs::remove_file(&path) {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(io_error(&path, &e)),
            }
        }
        Ok(())
    }

    pub(super) fn read_meta(&self, key: Fingerprint) -> Result<Option<CacheMetadata>, CacheError> {
        let path = self.meta_path(key);
        let json = match fs::read_to_string(&path) {
            Ok(json) => json,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(io_error(&path, &e)),
        };
        let meta: MetaFile = serde_json::from_str(&json).map_err(|e| CacheError::Metadata {
            path,
            message: e.to_string(),
        })?;
        Ok(Some(meta.metadata()))
    }

    /// Metadata of an entry that is present and unexpired. Expired entries
    /// are deleted.
    fn live_meta(&self, key: Fingerprint) -> Option<CacheMetadata> {
        let meta = match self.read_meta(key) {
            Ok(meta) => meta?,
            Err(e) => {
                tracing::debug!(%key, error = %e, "ignoring unreadable cache entry");
                return None;
            }
        };
        if meta.is_expired_at(SystemTime::now()) {
            tracing::debug!(%key, "cache entry expired");
            if let Err(e) = self.remove(key) {
                tracing::debug!(%key, error = %e, "failed to remove expired cache entry");
            }
            return None;
        }
        Some(meta)
    }
}

impl CompiledCache for FileCache {
    fn get(&self, key: Fingerprint) -> Option<String> {
        self.live_meta(key)?;
        let path = self.compiled_path(key);
        match fs::read_to_string(&path) {
            Ok(text) => Some(text),
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "cached compilation unreadable");
                None
            }
        }
    }

    fn metadata(&self, key: Fingerprint) -> Option<CacheMetadata> {
        self.live_meta(key)
    }

    fn save(&self, key: Fingerprint, text: &str, ttl: Duration) -> Result<(), CacheError> {
        let compiled = self.compiled_path(key);
        fs::write(&compiled, text).map_err(|e| io_error(&compiled, &e))?;

        // Metadata goes last so a reader never sees it without the text.
        let meta = MetaFile {
            saved_at: SystemTime::now(),
            ttl,
        };
        let meta_path = self.meta_path(key);
        let json = serde_json::to_string(&meta).map_err(|e| CacheError::Metadata {
            path: meta_path.clone(),
            message: e.to_string(),
        })?;
        fs::write(&meta_path, json).map_err(|e| io_error(&meta_path, &e))
    }
}

fn io_error(path: &Path, e: &std::io::Error) -> CacheError {
    CacheError::Io {
        path: path.to_path_buf(),
        message: e.to_string(),
    }
}
