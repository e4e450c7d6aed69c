//! Destination for rendered output that is not returned to the caller.
//!
//! `Engine::render(.., return_only = false)` forwards the rendered text
//! here as well as returning it.
//!
//! # Performance
//! Enum dispatch; the buffer variant is the only one holding state.

use std::io::Write;

use parking_lot::Mutex;

#[derive(Default)]
pub enum OutputSink {
    /// Writes to stdout.
    #[default]
    Stdout,
    /// Captures into a buffer (tests, embedding).
    Buffer(Mutex<String>),
    /// Discards everything.
    Silent,
}

impl OutputSink {
    pub fn buffer() -> Self {
        OutputSink::Buffer(Mutex::new(String::new()))
    }

    pub fn write(&self, text: &str) {
        match self {
            Self::Stdout => {
                let mut out = std::io::stdout().lock();
                if let Err(e) = out.write_all(text.as_bytes()).and_then(|()| out.flush()) {
                    tracing::warn!(error = %e, "failed to write rendered output");
                }
            }
            Self::Buffer(buffer) => buffer.lock().push_str(text),
            Self::Silent => {}
        }
    }

    /// Everything captured so far. Empty for sinks that don't capture.
    pub fn output(&self) -> String {
        match self {
            Self::Buffer(buffer) => buffer.lock().clone(),
            Self::Stdout | Self::Silent => String::new(),
        }
    }

    pub fn clear(&self) {
        if let Self::Buffer(buffer) = self {
            buffer.lock().clear();
        }
    }
}

impl std::fmt::Debug for OutputSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stdout => f.write_str("Stdout"),
            Self::Buffer(_) => f.write_str("Buffer"),
            Self::Silent => f.write_str("Silent"),
        }
    }
}
