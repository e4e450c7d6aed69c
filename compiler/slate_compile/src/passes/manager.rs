//! Pass manager: holds the pass order and runs it.

use std::time::Instant;

use super::{standard_passes, Pass, PassContext, Rewrite};
use crate::error::CompileError;

/// An ordered pipeline of passes.
pub struct PassManager {
    passes: Vec<Box<dyn Pass>>,
}

impl Default for PassManager {
    fn default() -> Self {
        Self::standard()
    }
}

impl PassManager {
    /// A pipeline of `passes`, in the given order. Fails if a pass is
    /// scheduled before one it requires.
    pub fn new(passes: Vec<Box<dyn Pass>>) -> Result<Self, CompileError> {
        let manager = PassManager { passes };
        manager.verify()?;
        Ok(manager)
    }

    /// The fixed pass order templates are compiled with.
    pub fn standard() -> Self {
        PassManager {
            passes: standard_passes(),
        }
    }

    /// Check that every pass's requirements are present and run earlier.
    pub fn verify(&self) -> Result<(), CompileError> {
        for (position, pass) in self.passes.iter().enumerate() {
            for &requires in pass.requires() {
                let Some(index) = self.passes.iter().position(|p| p.name() == requires) else {
                    return Err(CompileError::MissingPass {
                        pass: pass.name(),
                        requires,
                    });
                };
                if index >= position {
                    return Err(CompileError::PassOrder {
                        pass: pass.name(),
                        requires,
                    });
                }
            }
        }
        Ok(())
    }

    /// Run every pass over `source` in order.
    pub fn run(&self, source: &str, cx: &PassContext<'_>) -> Result<String, CompileError> {
        let mut text = source.to_string();
        for pass in &self.passes {
            let start = Instant::now();
            let Rewrite { text: next, count } = pass.run(&text, cx)?;
            tracing::trace!(
                pass = pass.name(),
                rewrites = count,
                elapsed = ?start.elapsed(),
                "pass finished"
            );
            text = next;
        }
        Ok(text)
    }

    pub fn len(&self) -> usize {
        self.passes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }

    pub fn pass_names(&self) -> Vec<&'static str> {
        self.passes.iter().map(|p| p.name()).collect()
    }
}

#[cfg(test)]
mod tests;
