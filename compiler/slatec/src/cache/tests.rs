use std::fs;
use std::path::Path;
use std::time::{Duration, SystemTime};

use pretty_assertions::assert_eq;
use tempfile::TempDir;

use super::*;

const HOUR: Duration = Duration::from_secs(3600);

fn key(name: &str) -> Fingerprint {
    Fingerprint::of_path(Path::new(name))
}

#[test]
fn metadata_expiry() {
    let saved = SystemTime::UNIX_EPOCH + HOUR;
    let meta = CacheMetadata::new(saved, Duration::from_secs(10));
    assert_eq!(meta.expires, Some(saved + Duration::from_secs(10)));
    assert!(!meta.is_expired_at(saved + Duration::from_secs(9)));
    assert!(meta.is_expired_at(saved + Duration::from_secs(10)));

    let forever = CacheMetadata::new(saved, Duration::ZERO);
    assert_eq!(forever.expires, None);
    assert!(!forever.is_expired_at(saved + HOUR * 10_000));
}

#[test]
fn newer_than_is_strict() {
    let saved = SystemTime::UNIX_EPOCH + HOUR;
    let meta = CacheMetadata::new(saved, HOUR);
    assert!(meta.is_newer_than(saved - Duration::from_secs(1)));
    assert!(!meta.is_newer_than(saved));
    assert!(!meta.is_newer_than(saved + Duration::from_secs(1)));
}

#[test]
fn memory_cache_round_trip() {
    let cache = MemoryCache::new();
    let k = key("/views/a");
    assert_eq!(cache.get(k), None);
    assert_eq!(cache.metadata(k), None);

    let before = SystemTime::now();
    cache.save(k, "<% echo 1; %>", HOUR).unwrap();
    assert_eq!(cache.get(k).as_deref(), Some("<% echo 1; %>"));
    let meta = cache.metadata(k).unwrap();
    assert!(meta.modified >= before);
    assert_eq!(cache.len(), 1);

    cache.clear();
    assert!(cache.is_empty());
}

#[test]
fn memory_cache_overwrites() {
    let cache = MemoryCache::new();
    let k = key("/views/a");
    cache.save(k, "old", HOUR).unwrap();
    cache.save(k, "new", HOUR).unwrap();
    assert_eq!(cache.get(k).as_deref(), Some("new"));
}

#[test]
fn null_cache_never_hits() {
    let cache = NullCache;
    let k = key("/views/a");
    cache.save(k, "text", HOUR).unwrap();
    assert_eq!(cache.get(k), None);
    assert_eq!(cache.metadata(k), None);
}

#[test]
fn file_cache_writes_text_and_metadata() {
    let dir = TempDir::new().unwrap();
    let cache = FileCache::new(dir.path().join("compiled")).unwrap();
    let k = key("/views/a");

    cache.save(k, "<% echo $x; %>", HOUR).unwrap();

    assert_eq!(
        fs::read_to_string(cache.compiled_path(k)).unwrap(),
        "<% echo $x; %>"
    );
    let meta_json = fs::read_to_string(cache.meta_path(k)).unwrap();
    let meta: serde_json::Value = serde_json::from_str(&meta_json).unwrap();
    assert_eq!(meta["ttl"]["secs"], 3600);

    assert_eq!(cache.get(k).as_deref(), Some("<% echo $x; %>"));
    let read = cache.metadata(k).unwrap();
    assert_eq!(read.expires, read.modified.checked_add(HOUR));
}

#[test]
fn file_cache_file_names_use_fingerprint() {
    let dir = TempDir::new().unwrap();
    let cache = FileCache::new(dir.path()).unwrap();
    let k = key("/views/a");
    assert_eq!(
        cache.compiled_path(k),
        dir.path().join(format!("{k}.compiled"))
    );
    assert_eq!(
        cache.meta_path(k),
        dir.path().join(format!("{k}.meta.json"))
    );
}

#[test]
fn file_cache_entries_survive_reopening() {
    let dir = TempDir::new().unwrap();
    let k = key("/views/a");
    FileCache::new(dir.path()).unwrap().save(k, "kept", HOUR).unwrap();
    assert_eq!(FileCache::new(dir.path()).unwrap().get(k).as_deref(), Some("kept"));
}

#[test]
fn file_cache_expired_entries_read_as_absent() {
    let dir = TempDir::new().unwrap();
    let cache = FileCache::new(dir.path()).unwrap();
    let k = key("/views/a");
    cache.save(k, "stale", HOUR).unwrap();

    // Rewrite the metadata as if saved two hours ago.
    let old = SystemTime::now() - HOUR * 2;
    let meta = serde_json::json!({
        "saved_at": serde_json::to_value(old).unwrap(),
        "ttl": serde_json::to_value(HOUR).unwrap(),
    });
    fs::write(cache.meta_path(k), meta.to_string()).unwrap();

    assert_eq!(cache.metadata(k), None);
    assert_eq!(cache.get(k), None);
    assert!(!cache.compiled_path(k).exists());
}

#[test]
fn file_cache_ignores_corrupt_metadata() {
    let dir = TempDir::new().unwrap();
    let cache = FileCache::new(dir.path()).unwrap();
    let k = key("/views/a");
    cache.save(k, "text", HOUR).unwrap();
    fs::write(cache.meta_path(k), "{not json").unwrap();

    assert_eq!(cache.get(k), None);
    assert!(matches!(
        cache.read_meta(k),
        Err(CacheError::Metadata { .. })
    ));
}

#[test]
fn file_cache_remove_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let cache = FileCache::new(dir.path()).unwrap();
    let k = key("/views/a");
    cache.save(k, "text", HOUR).unwrap();
    cache.remove(k).unwrap();
    cache.remove(k).unwrap();
    assert_eq!(cache.get(k), None);
}
