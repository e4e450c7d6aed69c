//! Engine configuration.

use std::path::PathBuf;
use std::time::Duration;

use slate_eval::DEFAULT_MAX_INCLUDE_DEPTH;
use thiserror::Error;

/// File extension of template sources when none is configured.
pub const DEFAULT_EXTENSION: &str = ".slate.html";

/// Lifetime of a cached compilation when none is configured.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(3600);

/// How aggressively compiled templates are reused.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Mode {
    /// Recompile whenever the source is newer than its cached compilation.
    #[default]
    Development,
    /// Trust any unexpired cached compilation without looking at the source.
    Production,
}

impl Mode {
    pub fn is_production(self) -> bool {
        self == Mode::Production
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid SLATE_CACHE_TTL `{value}`: expected whole seconds")]
    InvalidTtl { value: String },

    #[error("invalid SLATE_ENV `{value}`: expected `development` or `production`")]
    InvalidMode { value: String },
}

#[derive(Clone, Debug)]
pub struct EngineConfig {
    /// Root directory of template sources.
    pub views_dir: PathBuf,
    /// Root directory of modules, each with its own `views/` directory.
    pub modules_dir: Option<PathBuf>,
    /// Module whose views are searched before `views_dir`.
    pub module: Option<String>,
    /// Appended to template names to form file names.
    pub extension: String,
    /// Directory for compiled templates. `None` keeps them in memory.
    pub cache_dir: Option<PathBuf>,
    pub cache_ttl: Duration,
    pub mode: Mode,
    pub max_include_depth: usize,
}

impl EngineConfig {
    #[must_use]
    pub fn new(views_dir: impl Into<PathBuf>) -> Self {
        EngineConfig {
            views_dir: views_dir.into(),
            modules_dir: None,
            module: None,
            extension: DEFAULT_EXTENSION.to_string(),
            cache_dir: None,
            cache_ttl: DEFAULT_CACHE_TTL,
            mode: Mode::Development,
            max_include_depth: DEFAULT_MAX_INCLUDE_DEPTH,
        }
    }

    /// Configuration from `SLATE_VIEWS`, `SLATE_CACHE_DIR`, `SLATE_ENV` and
    /// `SLATE_CACHE_TTL`, with defaults for anything unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// Like [`from_env`](Self::from_env), reading variables through `var`.
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = EngineConfig::new(var("SLATE_VIEWS").unwrap_or_else(|| "views".to_string()));
        config.cache_dir = var("SLATE_CACHE_DIR").map(PathBuf::from);

        if let Some(value) = var("SLATE_ENV") {
            config.mode = match value.trim().to_ascii_lowercase().as_str() {
                "production" | "prod" => Mode::Production,
                "development" | "dev" | "" => Mode::Development,
                _ => return Err(ConfigError::InvalidMode { value }),
            };
        }

        if let Some(value) = var("SLATE_CACHE_TTL") {
            let secs = value
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidTtl { value: value.clone() })?;
            config.cache_ttl = Duration::from_secs(secs);
        }

        Ok(config)
    }

    #[must_use]
    pub fn with_modules_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.modules_dir = Some(dir.into());
        self
    }

    #[must_use]
    pub fn with_module(mut self, module: impl Into<String>) -> Self {
        self.module = Some(module.into());
        self
    }

    #[must_use]
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    #[must_use]
    pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = Some(dir.into());
        self
    }

    #[must_use]
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    #[must_use]
    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    #[must_use]
    pub fn with_max_include_depth(mut self, depth: usize) -> Self {
        self.max_include_depth = depth;
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig::new("views")
    }
}
