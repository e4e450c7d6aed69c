//! Variable environment for one template execution.
//!
//! Templates have a single flat scope, as their compiled form expects: loop
//! variables and assignments stay visible after the block that made them.
//! Every include gets a fresh environment built from the global data merged
//! with its call-local data.

use rustc_hash::FxHashMap;

use crate::value::{Map, Value};

#[derive(Clone, Debug, Default)]
pub struct Environment {
    vars: FxHashMap<String, Value>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an environment from global data overlaid with local data.
    pub fn from_data(globals: &Map, local: Option<&Map>) -> Self {
        let extra = local.map_or(0, Map::len);
        let mut vars = FxHashMap::with_capacity_and_hasher(globals.len() + extra, Default::default());
        for (name, value) in globals {
            vars.insert(name.clone(), value.clone());
        }
        if let Some(local) = local {
            for (name, value) in local {
                vars.insert(name.clone(), value.clone());
            }
        }
        Environment { vars }
    }

    #[inline]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.vars.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        self.vars.insert(name.into(), value);
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.vars.remove(name)
    }

    /// Storage slot for `name`, defined as null if absent.
    pub fn slot(&mut self, name: &str) -> &mut Value {
        self.vars.entry(name.to_string()).or_default()
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}
