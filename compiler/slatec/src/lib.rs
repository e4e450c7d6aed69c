//! Slate template engine.
//!
//! Ties the pipeline together:
//!
//! ```text
//! name ──resolve──► source path ──fingerprint──► cache
//!                        │                         │ fresh?
//!                        ▼                         ▼
//!                 slate_compile ──compiled text──► slate_parse ──► Program
//!                                                                    │
//!                                     globals + data ──► slate_eval::Runtime ──► output
//! ```
//!
//! [`Engine`] is the entry point. It is single-threaded: share templates
//! between threads by giving each its own engine over the same cache
//! directory.

pub mod cache;
pub mod config;
mod engine;
mod errors;
pub mod hash;
pub mod resolver;
pub mod sink;

use std::sync::Once;

pub use cache::{CacheError, CacheMetadata, CompiledCache, FileCache, MemoryCache, NullCache};
pub use config::{ConfigError, EngineConfig, Mode};
pub use engine::Engine;
pub use errors::RenderError;
pub use hash::Fingerprint;
pub use resolver::{FileSystemResolver, ResolveError, TemplateResolver};
pub use sink::OutputSink;

pub use slate_eval::{HostServices, Map, Value};

static TRACING_INIT: Once = Once::new();

/// Initialize tracing output.
///
/// Safe to call more than once. Does nothing unless `RUST_LOG` is set, e.g.
/// `RUST_LOG=slatec=debug` for cache decisions or `RUST_LOG=slate_compile=trace`
/// for per-pass timings.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true).with_writer(std::io::stderr))
                .with(filter)
                .init();
        }
    });
}
