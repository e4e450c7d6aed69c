//! User-registered rewrites.

use std::fmt;

use super::{Pass, PassContext, Rewrite};
use crate::error::CompileError;

/// A text-to-text rewrite applied to the whole template.
pub type Extension = Box<dyn Fn(&str) -> String>;

/// Extensions in registration order.
#[derive(Default)]
pub struct Extensions {
    list: Vec<Extension>,
}

impl Extensions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, extension: impl Fn(&str) -> String + 'static) {
        self.list.push(Box::new(extension));
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// Feed `text` through every extension in order. The count is the
    /// number of extensions that changed the text.
    pub fn apply(&self, text: &str) -> (String, usize) {
        let mut text = text.to_string();
        let mut changed = 0;
        for extension in &self.list {
            let next = extension(&text);
            if next != text {
                changed += 1;
                text = next;
            }
        }
        (text, changed)
    }
}

impl fmt::Debug for Extensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Extensions")
            .field("len", &self.list.len())
            .finish()
    }
}

pub struct ExtensionPass;

impl Pass for ExtensionPass {
    fn name(&self) -> &'static str {
        "extensions"
    }

    fn run(&self, text: &str, cx: &PassContext<'_>) -> Result<Rewrite, CompileError> {
        let (text, count) = cx.extensions.apply(text);
        Ok(Rewrite::new(text, count))
    }
}
