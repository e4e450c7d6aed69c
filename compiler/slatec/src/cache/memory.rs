use std::time::{Duration, SystemTime};

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use super::{CacheError, CacheMetadata, CompiledCache};
use crate::hash::Fingerprint;

#[derive(Debug)]
struct Entry {
    text: String,
    meta: CacheMetadata,
}

/// In-process cache. Entries live as long as the cache does.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: Mutex<FxHashMap<Fingerprint, Entry>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    fn live<T>(&self, key: Fingerprint, f: impl FnOnce(&Entry) -> T) -> Option<T> {
        let mut entries = self.entries.lock();
        let expired = entries.get(&key)?.meta.is_expired_at(SystemTime::now());
        if expired {
            entries.remove(&key);
            return None;
        }
        entries.get(&key).map(f)
    }
}

impl CompiledCache for MemoryCache {
    fn get(&self, key: Fingerprint) -> Option<String> {
        self.live(key, |entry| entry.text.clone())
    }

    fn metadata(&self, key: Fingerprint) -> Option<CacheMetadata> {
        self.live(key, |entry| entry.meta)
    }

    fn save(&self, key: Fingerprint, text: &str, ttl: Duration) -> Result<(), CacheError> {
        let entry = Entry {
            text: text.to_string(),
            meta: CacheMetadata::new(SystemTime::now(), ttl),
        };
        self.entries.lock().insert(key, entry);
        Ok(())
    }
}
