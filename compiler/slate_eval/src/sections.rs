//! Section stack and content map.
//!
//! `start` pushes a name, `end` pops it; the runtime captures the output in
//! between and hands it to [`Sections::store`]. Stored content is spliced
//! through the `@parent` marker so a chain of layouts can each contribute
//! to the same section:
//!
//! - if the stored content contains `@parent`, the new capture replaces it
//!   (the first template to close a section keeps control of its layout);
//! - otherwise, if the new capture contains `@parent`, the stored content
//!   replaces the marker in it;
//! - otherwise the stored content wins and the new capture is dropped.

use rustc_hash::FxHashMap;

/// Placeholder for the enclosing template's content of the same section.
pub const PARENT_MARKER: &str = "@parent";

#[derive(Debug, Default)]
pub struct Sections {
    open: Vec<String>,
    content: FxHashMap<String, String>,
}

impl Sections {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self, name: impl Into<String>) {
        self.open.push(name.into());
    }

    /// Pop the innermost open section.
    pub fn end(&mut self) -> Option<String> {
        self.open.pop()
    }

    /// Number of open sections.
    pub fn depth(&self) -> usize {
        self.open.len()
    }

    /// Names of sections opened above `floor`, innermost last.
    pub fn open_above(&self, floor: usize) -> Vec<String> {
        self.open.get(floor..).map(<[String]>::to_vec).unwrap_or_default()
    }

    /// Forget sections opened above `floor`.
    pub fn truncate(&mut self, floor: usize) {
        self.open.truncate(floor);
    }

    /// Record captured content for `name`.
    pub fn store(&mut self, name: &str, captured: String) {
        match self.content.get_mut(name) {
            None => {
                self.content.insert(name.to_string(), captured);
            }
            Some(existing) if existing.contains(PARENT_MARKER) => {
                *existing = existing.replace(PARENT_MARKER, &captured);
            }
            Some(existing) if captured.contains(PARENT_MARKER) => {
                *existing = captured.replace(PARENT_MARKER, existing.as_str());
            }
            Some(_) => {}
        }
    }

    /// Stored content for `name`, empty if the section was never rendered.
    pub fn get(&self, name: &str) -> &str {
        self.content.get(name).map_or("", String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.content.contains_key(name)
    }
}

#[cfg(test)]
mod tests;
