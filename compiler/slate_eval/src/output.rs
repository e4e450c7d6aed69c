//! Output capture stack.
//!
//! Every template execution and every open section writes into the
//! innermost buffer. Captures nest strictly: a buffer pushed after another
//! is always popped before it.

#[derive(Debug, Default)]
pub struct OutputStack {
    buffers: Vec<String>,
}

impl OutputStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin a new capture.
    pub fn push(&mut self) {
        self.buffers.push(String::new());
    }

    /// End the innermost capture, returning its text.
    pub fn pop(&mut self) -> Option<String> {
        self.buffers.pop()
    }

    /// Write to the innermost capture. Output with no capture open is
    /// dropped.
    pub fn write(&mut self, text: &str) {
        if let Some(buffer) = self.buffers.last_mut() {
            buffer.push_str(text);
        }
    }

    pub fn depth(&self) -> usize {
        self.buffers.len()
    }

    /// Discard every capture above `depth`.
    pub fn truncate(&mut self, depth: usize) {
        self.buffers.truncate(depth);
    }
}
