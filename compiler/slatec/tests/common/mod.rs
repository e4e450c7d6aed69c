//! Shared setup for engine integration tests.

#![allow(dead_code)]

use std::cell::Cell;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::{Duration, SystemTime};

use slatec::{Engine, EngineConfig, Map, Value};
use tempfile::TempDir;

pub const HOUR: Duration = Duration::from_secs(3600);

/// A temporary views directory.
pub struct Views {
    pub dir: TempDir,
}

impl Views {
    pub fn new() -> Self {
        Views {
            dir: TempDir::new().expect("temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn file(&self, name: &str) -> PathBuf {
        self.dir.path().join(format!("{name}.slate.html"))
    }

    /// Write a template whose modification time is an hour in the past, so
    /// anything cached from now on is newer than it.
    pub fn write(&self, name: &str, source: &str) -> &Self {
        self.write_at(name, source, SystemTime::now() - HOUR)
    }

    pub fn write_at(&self, name: &str, source: &str, modified: SystemTime) -> &Self {
        let path = self.file(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create template dir");
        }
        fs::write(&path, source).expect("write template");
        File::options()
            .write(true)
            .open(&path)
            .and_then(|f| f.set_modified(modified))
            .expect("set template mtime");
        self
    }

    pub fn config(&self) -> EngineConfig {
        EngineConfig::new(self.path())
    }

    pub fn engine(&self) -> Engine {
        Engine::new(self.config()).expect("engine")
    }
}

/// Register an extension that counts how often templates are compiled.
pub fn count_compilations(engine: &mut Engine) -> Rc<Cell<usize>> {
    let count = Rc::new(Cell::new(0));
    let counter = Rc::clone(&count);
    engine.extend(move |text| {
        counter.set(counter.get() + 1);
        text.to_string()
    });
    count
}

pub fn render(engine: &Engine, name: &str) -> String {
    engine
        .render(name, None, true)
        .unwrap_or_else(|e| panic!("render {name}: {e}"))
}

pub fn render_with(engine: &Engine, name: &str, data: &[(&str, Value)]) -> String {
    let data: Map = data
        .iter()
        .map(|(k, v)| ((*k).to_string(), v.clone()))
        .collect();
    engine
        .render(name, Some(&data), true)
        .unwrap_or_else(|e| panic!("render {name}: {e}"))
}

pub fn list<T: Into<Value> + Clone>(items: &[T]) -> Value {
    Value::list(items.iter().cloned().map(Into::into).collect())
}
