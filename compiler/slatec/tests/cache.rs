// Test code uses unwrap/expect for clarity - panics provide good test failure messages
#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Compiled template caching: hits, staleness, production mode and
//! degraded cache writes.

mod common;

use std::fs;
use std::time::{Duration, SystemTime};

use common::{count_compilations, render, Views, HOUR};
use pretty_assertions::assert_eq;
use slatec::{
    CacheError, CacheMetadata, CompiledCache, Engine, Fingerprint, MemoryCache, Mode,
};
use tempfile::TempDir;

#[test]
fn second_render_is_served_from_cache() {
    let views = Views::new();
    views.write("page", "Hello {{ 'there' }}");
    let mut engine = views.engine();
    let compilations = count_compilations(&mut engine);

    let first = engine.compile("page").unwrap();
    let second = engine.compile("page").unwrap();
    assert_eq!(first, second);
    assert_eq!(compilations.get(), 1);

    assert_eq!(render(&engine, "page"), "Hello there");
    assert_eq!(compilations.get(), 1);
}

#[test]
fn includes_are_cached_too() {
    let views = Views::new();
    views
        .write("partial", "p")
        .write("page", "@include('partial')@include('partial')");
    let mut engine = views.engine();
    let compilations = count_compilations(&mut engine);

    assert_eq!(render(&engine, "page"), "pp");
    assert_eq!(render(&engine, "page"), "pp");
    assert_eq!(compilations.get(), 2);
}

#[test]
fn modified_source_is_recompiled() {
    let views = Views::new();
    views.write("page", "old");
    let mut engine = views.engine();
    let compilations = count_compilations(&mut engine);
    assert_eq!(render(&engine, "page"), "old");

    views.write_at("page", "new", SystemTime::now() + HOUR);
    assert_eq!(render(&engine, "page"), "new");
    assert_eq!(compilations.get(), 2);
}

#[test]
fn production_mode_trusts_the_cache() {
    let views = Views::new();
    views.write("page", "old");
    let mut engine = Engine::new(views.config().with_mode(Mode::Production)).unwrap();
    let compilations = count_compilations(&mut engine);
    assert_eq!(render(&engine, "page"), "old");

    views.write_at("page", "new", SystemTime::now() + HOUR);
    assert_eq!(render(&engine, "page"), "old");
    assert_eq!(compilations.get(), 1);
}

#[test]
fn names_resolving_to_one_path_share_an_entry() {
    let views = Views::new();
    views.write("page", "same");
    let mut engine = views.engine();
    let compilations = count_compilations(&mut engine);

    engine.compile("page").unwrap();
    engine.compile("./page").unwrap();
    assert_eq!(compilations.get(), 1);
}

#[test]
fn file_cache_persists_across_engines() {
    let views = Views::new();
    views.write("page", "{{ 6 * 7 }}");
    let cache_dir = TempDir::new().unwrap();
    let config = || views.config().with_cache_dir(cache_dir.path());

    let first = Engine::new(config()).unwrap();
    assert_eq!(render(&first, "page"), "42");

    let key = Fingerprint::of_path(&views.file("page"));
    let compiled = cache_dir.path().join(format!("{key}.compiled"));
    assert_eq!(fs::read_to_string(&compiled).unwrap(), "<% echo 6 * 7; %>");
    assert!(cache_dir.path().join(format!("{key}.meta.json")).is_file());

    let mut second = Engine::new(config()).unwrap();
    let compilations = count_compilations(&mut second);
    assert_eq!(render(&second, "page"), "42");
    assert_eq!(compilations.get(), 0);
}

#[test]
fn expired_entries_are_recompiled() {
    let views = Views::new();
    views.write("page", "text");
    let mut engine = Engine::new(views.config().with_cache_ttl(Duration::from_nanos(1)))
        .unwrap()
        .with_cache(MemoryCache::new());
    let compilations = count_compilations(&mut engine);

    render(&engine, "page");
    std::thread::sleep(Duration::from_millis(5));
    render(&engine, "page");
    assert_eq!(compilations.get(), 2);
}

/// Accepts nothing.
struct ReadOnlyCache;

impl CompiledCache for ReadOnlyCache {
    fn get(&self, _key: Fingerprint) -> Option<String> {
        None
    }

    fn metadata(&self, _key: Fingerprint) -> Option<CacheMetadata> {
        None
    }

    fn save(&self, _key: Fingerprint, _text: &str, _ttl: Duration) -> Result<(), CacheError> {
        Err(CacheError::Io {
            path: "read-only".into(),
            message: "permission denied".to_string(),
        })
    }
}

#[test]
fn cache_write_failure_does_not_fail_the_render() {
    let views = Views::new();
    views.write("page", "still {{ 'rendered' }}");
    let engine = views.engine().with_cache(ReadOnlyCache);
    assert_eq!(render(&engine, "page"), "still rendered");
    assert_eq!(render(&engine, "page"), "still rendered");
}
