//! Composition runtime: executes templates, including other templates, and
//! owns the state one render shares across all of them.
//!
//! A [`Runtime`] lives for exactly one top-level render. Its output capture
//! stack, section store and include chain are created empty and dropped
//! with it, so nothing leaks from one render into the next.
//!
//! # Frames
//!
//! Every template execution runs inside a frame. Entering a frame pushes an
//! output buffer and records how many sections were already open; leaving
//! it, normally or through an error, truncates all three stacks back to
//! where they were. A template may only close sections it opened itself,
//! and must close all of them before it finishes.

use std::ops::{Deref, DerefMut};
use std::rc::Rc;

use slate_ir::Program;
use slate_stack::ensure_sufficient_stack;

use crate::environment::Environment;
use crate::errors::{include_depth_exceeded, unclosed_sections, unmatched_section_end, EvalResult};
use crate::interpreter::Interpreter;
use crate::output::OutputStack;
use crate::sections::Sections;
use crate::services::HostServices;
use crate::value::Map;

/// Include depth allowed when none is configured.
pub const DEFAULT_MAX_INCLUDE_DEPTH: usize = 64;

/// Source of parsed templates, by name.
pub trait Composer {
    fn load(&self, name: &str) -> EvalResult<Rc<Program>>;
}

#[derive(Debug)]
struct Frame {
    template: String,
    section_floor: usize,
}

/// Mutable state of one render.
#[derive(Debug, Default)]
struct RenderState {
    output: OutputStack,
    sections: Sections,
    frames: Vec<Frame>,
}

pub struct Runtime<'r> {
    composer: &'r dyn Composer,
    services: &'r dyn HostServices,
    globals: &'r Map,
    state: RenderState,
    max_depth: usize,
}

impl<'r> Runtime<'r> {
    pub fn new(
        composer: &'r dyn Composer,
        services: &'r dyn HostServices,
        globals: &'r Map,
    ) -> Self {
        Runtime {
            composer,
            services,
            globals,
            state: RenderState::default(),
            max_depth: DEFAULT_MAX_INCLUDE_DEPTH,
        }
    }

    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn services(&self) -> &'r dyn HostServices {
        self.services
    }

    pub fn sections(&self) -> &Sections {
        &self.state.sections
    }

    /// Render a template by name with call-local data merged over the
    /// globals.
    #[tracing::instrument(level = "debug", skip(self, data))]
    pub fn render(&mut self, name: &str, data: Option<&Map>) -> EvalResult<String> {
        self.include(name, data)
    }

    /// Render a template from inside another one.
    pub fn include(&mut self, name: &str, data: Option<&Map>) -> EvalResult<String> {
        if self.state.frames.len() >= self.max_depth {
            let mut chain: Vec<String> = self
                .state
                .frames
                .iter()
                .map(|frame| frame.template.clone())
                .collect();
            chain.push(name.to_string());
            return Err(include_depth_exceeded(self.max_depth, chain));
        }
        let program = self.composer.load(name)?;
        ensure_sufficient_stack(|| self.execute(name, &program, data))
    }

    /// Execute an already parsed template in a fresh frame, returning what
    /// it wrote.
    pub fn execute(&mut self, name: &str, program: &Program, data: Option<&Map>) -> EvalResult<String> {
        tracing::trace!(template = name, depth = self.state.frames.len(), "execute");
        let env = Environment::from_data(self.globals, data);
        let mut frame = self.enter(name);

        Interpreter::new(program, env, &mut frame)
            .run()
            .map_err(|e| e.in_template(name))?;

        let open = frame.state.sections.open_above(frame.section_floor);
        if !open.is_empty() {
            return Err(unclosed_sections(name, open).in_template(name));
        }
        Ok(frame.finish())
    }

    fn enter(&mut self, name: &str) -> FrameGuard<'_, 'r> {
        let output_mark = self.state.output.depth();
        let section_floor = self.state.sections.depth();
        let frame_mark = self.state.frames.len();
        self.state.frames.push(Frame {
            template: name.to_string(),
            section_floor,
        });
        self.state.output.push();
        FrameGuard {
            runtime: self,
            output_mark,
            section_floor,
            frame_mark,
        }
    }

    // Intrinsics

    pub fn write(&mut self, text: &str) {
        self.state.output.write(text);
    }

    pub fn section_start(&mut self, name: String) {
        self.state.sections.start(name);
        self.state.output.push();
    }

    /// Close the innermost open section, store its capture and return its
    /// name.
    pub fn section_end(&mut self) -> EvalResult<String> {
        let (template, floor) = self
            .state
            .frames
            .last()
            .map_or(("", 0), |frame| (frame.template.as_str(), frame.section_floor));
        if self.state.sections.depth() <= floor {
            return Err(unmatched_section_end(template));
        }
        let Some(name) = self.state.sections.end() else {
            return Err(unmatched_section_end(template));
        };
        let captured = self.state.output.pop().unwrap_or_default();
        self.state.sections.store(&name, captured);
        Ok(name)
    }

    pub fn yield_section(&self, name: &str) -> &str {
        self.state.sections.get(name)
    }
}

/// Restores the runtime's stacks when a template finishes or fails.
struct FrameGuard<'g, 'r> {
    runtime: &'g mut Runtime<'r>,
    output_mark: usize,
    section_floor: usize,
    frame_mark: usize,
}

impl FrameGuard<'_, '_> {
    /// Take the frame's output buffer.
    fn finish(&mut self) -> String {
        self.runtime.state.output.pop().unwrap_or_default()
    }
}

impl Drop for FrameGuard<'_, '_> {
    fn drop(&mut self) {
        let state = &mut self.runtime.state;
        state.output.truncate(self.output_mark);
        state.sections.truncate(self.section_floor);
        state.frames.truncate(self.frame_mark);
    }
}

impl<'r> Deref for FrameGuard<'_, 'r> {
    type Target = Runtime<'r>;

    fn deref(&self) -> &Self::Target {
        self.runtime
    }
}

impl DerefMut for FrameGuard<'_, '_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.runtime
    }
}
