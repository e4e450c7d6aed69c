//! The template engine: global data, compilation with caching, and
//! rendering.
//!
//! # Compilation
//!
//! `compile(name)` resolves the name to a source path and looks the path's
//! [`Fingerprint`] up in the compiled cache. A cached entry is used as is
//! in production mode, or in development mode when it was saved after the
//! source was last modified. Otherwise the source is compiled and saved.
//! Failing to save is logged and otherwise ignored.
//!
//! # Rendering
//!
//! Each `render` call builds a fresh [`Runtime`], so sections and output
//! buffers never outlive the render that created them. Data passed to
//! `render` overlays the globals for every template of that render,
//! includes and layouts too, and is dropped when it returns. Included
//! templates are loaded through the engine's [`Composer`] implementation
//! and share the same compile path and cache.

use std::borrow::Cow;
use std::cell::RefCell;
use std::fmt;
use std::fs;
use std::path::Path;
use std::rc::Rc;

use rustc_hash::FxHashMap;
use slate_compile::Compiler;
use slate_eval::{
    next_index, template_load, Composer, EvalResult, HostServices, Map, NoServices, Runtime, Value,
};
use slate_ir::Program;

use crate::cache::{CompiledCache, FileCache, MemoryCache};
use crate::config::EngineConfig;
use crate::errors::RenderError;
use crate::hash::{hash_text, Fingerprint};
use crate::resolver::{FileSystemResolver, TemplateResolver};
use crate::sink::OutputSink;

/// Parsed program for a template path, tagged with the hash of the
/// compiled text it came from.
struct ParsedTemplate {
    text_hash: u64,
    program: Rc<Program>,
}

pub struct Engine {
    config: EngineConfig,
    resolver: Box<dyn TemplateResolver>,
    cache: Box<dyn CompiledCache>,
    compiler: Compiler,
    services: Box<dyn HostServices>,
    globals: Map,
    sink: OutputSink,
    programs: RefCell<FxHashMap<Fingerprint, ParsedTemplate>>,
}

impl Engine {
    /// Engine with a filesystem resolver and a file cache when
    /// `cache_dir` is set, an in-memory cache otherwise.
    pub fn new(config: EngineConfig) -> Result<Self, RenderError> {
        let mut resolver = FileSystemResolver::new(&config.views_dir, config.extension.clone());
        if let Some(modules) = &config.modules_dir {
            resolver = resolver.with_modules_dir(modules);
        }
        let cache: Box<dyn CompiledCache> = match &config.cache_dir {
            Some(dir) => Box::new(FileCache::new(dir)?),
            None => Box::new(MemoryCache::new()),
        };
        Ok(Engine {
            config,
            resolver: Box::new(resolver),
            cache,
            compiler: Compiler::new(),
            services: Box::new(NoServices),
            globals: Map::default(),
            sink: OutputSink::default(),
            programs: RefCell::new(FxHashMap::default()),
        })
    }

    #[must_use]
    pub fn with_resolver(mut self, resolver: impl TemplateResolver + 'static) -> Self {
        self.resolver = Box::new(resolver);
        self
    }

    #[must_use]
    pub fn with_cache(mut self, cache: impl CompiledCache + 'static) -> Self {
        self.cache = Box::new(cache);
        self
    }

    #[must_use]
    pub fn with_services(mut self, services: impl HostServices + 'static) -> Self {
        self.services = Box::new(services);
        self
    }

    #[must_use]
    pub fn with_sink(mut self, sink: OutputSink) -> Self {
        self.sink = sink;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn sink(&self) -> &OutputSink {
        &self.sink
    }

    pub fn pass_names(&self) -> Vec<&'static str> {
        self.compiler.pass_names()
    }

    // Global data

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.globals.insert(name.into(), value.into());
        self
    }

    /// Merge `data` into the globals, replacing existing names.
    pub fn set_data(&mut self, data: Map) -> &mut Self {
        self.globals.extend(data);
        self
    }

    /// Push onto a list (or map), concatenate onto anything else, or set
    /// when `name` is absent.
    pub fn append(&mut self, name: &str, value: impl Into<Value>) -> Result<&mut Self, RenderError> {
        let value = value.into();
        match self.globals.get_mut(name) {
            None => {
                self.globals.insert(name.to_string(), value);
            }
            Some(Value::List(items)) => Rc::make_mut(items).push(value),
            Some(Value::Map(map)) => {
                let key = next_index(map).to_string();
                Rc::make_mut(map).insert(key, value);
            }
            Some(existing) => {
                let joined = format!("{}{}", existing.to_text()?, value.to_text()?);
                *existing = Value::Str(joined);
            }
        }
        Ok(self)
    }

    pub fn unset(&mut self, name: &str) -> Option<Value> {
        self.globals.shift_remove(name)
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.globals.get(name)
    }

    pub fn globals(&self) -> &Map {
        &self.globals
    }

    /// Register a rewrite run over raw template source before the built-in
    /// passes.
    pub fn extend(&mut self, extension: impl Fn(&str) -> String + 'static) -> &mut Self {
        self.compiler.extend(extension);
        self
    }

    // Compilation

    /// Compiled text of a template, from the cache when it is fresh.
    pub fn compile(&self, name: &str) -> Result<String, RenderError> {
        self.compile_keyed(name).map(|(_, text)| text)
    }

    #[tracing::instrument(level = "debug", skip(self))]
    fn compile_keyed(&self, name: &str) -> Result<(Fingerprint, String), RenderError> {
        let path = self.resolver.resolve(name, self.config.module.as_deref())?;
        let key = Fingerprint::of_path(&path);

        if let Some(text) = self.cached(key, &path) {
            tracing::debug!(%key, "cache hit");
            return Ok((key, text));
        }
        tracing::debug!(%key, path = %path.display(), "cache miss");

        let source = fs::read_to_string(&path).map_err(|source| RenderError::Read {
            path: path.clone(),
            source,
        })?;
        let compiled = self
            .compiler
            .compile(&source)
            .map_err(|source| RenderError::Compile {
                template: name.to_string(),
                source,
            })?;

        match self.cache.save(key, &compiled, self.config.cache_ttl) {
            Ok(()) => tracing::debug!(%key, "saved compiled template"),
            Err(e) => tracing::warn!(%key, error = %e, "failed to cache compiled template"),
        }
        Ok((key, compiled))
    }

    fn cached(&self, key: Fingerprint, path: &Path) -> Option<String> {
        let meta = self.cache.metadata(key)?;
        if !self.config.mode.is_production() {
            let source_modified = match fs::metadata(path).and_then(|m| m.modified()) {
                Ok(modified) => modified,
                Err(e) => {
                    tracing::debug!(error = %e, "source modification time unavailable");
                    return None;
                }
            };
            if !meta.is_newer_than(source_modified) {
                tracing::debug!(%key, "cached compilation is stale");
                return None;
            }
        }
        self.cache.get(key)
    }

    /// Parsed program of a template. Reparses only when the compiled text
    /// changed since the last parse.
    fn program(&self, name: &str) -> Result<Rc<Program>, RenderError> {
        let (key, compiled) = self.compile_keyed(name)?;
        let text_hash = hash_text(&compiled);

        if let Some(parsed) = self.programs.borrow().get(&key) {
            if parsed.text_hash == text_hash {
                return Ok(Rc::clone(&parsed.program));
            }
        }

        let program = slate_parse::parse(&compiled).map_err(|source| RenderError::Parse {
            template: name.to_string(),
            source,
        })?;
        let program = Rc::new(program);
        self.programs.borrow_mut().insert(
            key,
            ParsedTemplate {
                text_hash,
                program: Rc::clone(&program),
            },
        );
        Ok(program)
    }

    // Rendering

    /// Render a template with `data` overlaying the globals. Unless
    /// `return_only`, the output also goes to the engine's sink.
    #[tracing::instrument(level = "debug", skip(self, data))]
    pub fn render(&self, name: &str, data: Option<&Map>, return_only: bool) -> Result<String, RenderError> {
        let program = self.program(name)?;
        let scope = self.render_scope(data);
        let mut runtime = Runtime::new(self, self.services.as_ref(), &scope)
            .with_max_depth(self.config.max_include_depth);
        let output = runtime.execute(name, &program, None)?;
        if !return_only {
            self.sink.write(&output);
        }
        Ok(output)
    }

    /// Data every template of one render sees: the globals overlaid with
    /// the render's own data.
    fn render_scope(&self, data: Option<&Map>) -> Cow<'_, Map> {
        match data {
            Some(data) if !data.is_empty() => {
                let mut scope = self.globals.clone();
                scope.extend(data.iter().map(|(k, v)| (k.clone(), v.clone())));
                Cow::Owned(scope)
            }
            _ => Cow::Borrowed(&self.globals),
        }
    }
}

impl Composer for Engine {
    fn load(&self, name: &str) -> EvalResult<Rc<Program>> {
        self.program(name).map_err(|e| match e {
            RenderError::Eval(e) => e,
            other => template_load(name, other),
        })
    }
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("config", &self.config)
            .field("globals", &self.globals.len())
            .field("extensions", &self.compiler.extensions().len())
            .field("sink", &self.sink)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
