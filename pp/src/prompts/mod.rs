//! Prompt Template System
//!
//! Turns a catalog selection into prompt text.
//!
//! - [`TaskTypeTemplate`] frames the selected files; its body holds the
//!   `{content}` placeholder that [`assemble`] fills with file blocks.
//! - [`Preset`] is trailing guidance appended after everything else.
//! - [`PromptComposer`] arranges task type, instruction, files and preset
//!   through a Handlebars layout and attaches a token estimate.
//!
//! Template loading chain:
//! 1. `task-types` / `presets` maps in the configuration file
//! 2. Embedded defaults compiled from `prompts/*.pmt`

mod assembler;
mod composer;
pub mod embedded;
mod error;
mod template;

pub use assembler::{Assembly, assemble, file_block};
pub use composer::{ComposeRequest, ComposedPrompt, PromptComposer};
pub use error::TemplateError;
pub use template::{PLACEHOLDER, Preset, TaskTypeTemplate, TemplateSet};
