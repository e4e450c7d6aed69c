//! Top-level render errors.

use std::path::PathBuf;

use slate_compile::CompileError;
use slate_eval::EvalError;
use slate_parse::ParseError;
use thiserror::Error;

use crate::cache::CacheError;
use crate::config::ConfigError;
use crate::resolver::ResolveError;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error("failed to read template {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to compile `{template}`: {source}")]
    Compile {
        template: String,
        #[source]
        source: CompileError,
    },

    #[error("failed to parse compiled `{template}`: {source}")]
    Parse {
        template: String,
        #[source]
        source: ParseError,
    },

    #[error(transparent)]
    Eval(#[from] EvalError),

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
