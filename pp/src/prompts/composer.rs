//! Prompt composition
//!
//! Arranges the full prompt: the task type framing the files, the free-text
//! task instruction, bare files when no task type is chosen, and finally a
//! preset. Sections go through a Handlebars layout so the framing can be
//! replaced from configuration.

use handlebars::Handlebars;
use serde::Serialize;
use tracing::{debug, info};

use super::assembler::read_blocks;
use super::{TemplateError, TemplateSet, embedded};
use crate::catalog::Catalog;
use crate::estimate::{Estimate, EstimateConfig};
use crate::selection::SelectionState;

const LAYOUT_NAME: &str = "layout";

/// Separator between sections, and between a section title and its body
const SECTION_SEPARATOR: &str = "\n\n";

/// What the user asked to have composed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComposeRequest {
    /// Task type framing the files
    pub task_type: Option<String>,
    /// Free-text instruction, always emitted even when empty
    pub instruction: String,
    /// Preset appended at the end
    pub preset: Option<String>,
}

/// A composed prompt with its bookkeeping
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComposedPrompt {
    pub text: String,
    pub included: Vec<String>,
    pub skipped: Vec<String>,
    pub estimate: Estimate,
}

#[derive(Debug, Serialize)]
struct Section {
    title: String,
    body: String,
}

#[derive(Debug, Serialize)]
struct LayoutContext<'a> {
    sections: Vec<Section>,
    separator: &'a str,
    task_type: Option<&'a str>,
    instruction: &'a str,
    preset: Option<&'a str>,
    file_count: usize,
}

/// Renders compose requests against a template set
pub struct PromptComposer {
    /// Handlebars template engine
    hbs: Handlebars<'static>,
    templates: TemplateSet,
    estimate: EstimateConfig,
}

impl PromptComposer {
    /// Create a composer using the embedded layout
    pub fn new(templates: TemplateSet, estimate: EstimateConfig) -> Result<Self, TemplateError> {
        Self::with_layout(templates, estimate, embedded::LAYOUT)
    }

    /// Create a composer with a custom Handlebars layout
    ///
    /// The layout receives `sections` (each with `title` and `body`),
    /// `separator`, `task_type`, `instruction`, `preset` and `file_count`.
    pub fn with_layout(templates: TemplateSet, estimate: EstimateConfig, layout: &str) -> Result<Self, TemplateError> {
        debug!(layout_len = layout.len(), "PromptComposer::with_layout: called");
        let mut hbs = Handlebars::new();
        hbs.register_escape_fn(handlebars::no_escape);
        hbs.register_template_string(LAYOUT_NAME, layout)
            .map_err(|e| TemplateError::Layout(e.to_string()))?;
        Ok(Self {
            hbs,
            templates,
            estimate,
        })
    }

    pub fn templates(&self) -> &TemplateSet {
        &self.templates
    }

    /// Compose the selection into a full prompt
    ///
    /// Fails only when the request names a task type or preset that does not
    /// exist; unreadable files are reported in `skipped`.
    pub fn compose(
        &self,
        catalog: &Catalog,
        selection: &SelectionState,
        request: &ComposeRequest,
    ) -> Result<ComposedPrompt, TemplateError> {
        debug!(task_type = ?request.task_type, preset = ?request.preset, selected = selection.len(), "PromptComposer::compose: called");

        let task_type = request
            .task_type
            .as_deref()
            .map(|name| self.templates.task_type(name))
            .transpose()?;
        let preset = request
            .preset
            .as_deref()
            .map(|name| self.templates.preset(name))
            .transpose()?;

        let blocks = read_blocks(catalog, selection);
        let mut sections = Vec::new();

        if let Some(template) = task_type {
            sections.push(Section {
                title: format!("Tasktype: {}", template.name),
                body: template.render(&blocks.text),
            });
        }

        sections.push(Section {
            title: "Task Instruction".to_string(),
            body: request.instruction.clone(),
        });

        if task_type.is_none() && !blocks.included.is_empty() {
            sections.push(Section {
                title: "Selected Files".to_string(),
                body: blocks.text.clone(),
            });
        }

        if let Some(preset) = preset {
            sections.push(Section {
                title: format!("Preset: {}", preset.name),
                body: preset.body.clone(),
            });
        }

        let context = LayoutContext {
            sections,
            separator: SECTION_SEPARATOR,
            task_type: task_type.map(|t| t.name.as_str()),
            instruction: &request.instruction,
            preset: preset.map(|p| p.name.as_str()),
            file_count: blocks.included.len(),
        };
        let text = self
            .hbs
            .render(LAYOUT_NAME, &context)
            .map_err(|e| TemplateError::Render(e.to_string()))?;

        let estimate = self.estimate.estimate(&text, blocks.included.len());
        info!(
            tokens = estimate.tokens,
            difficulty = %estimate.difficulty,
            files = blocks.included.len(),
            skipped = blocks.skipped.len(),
            "Composed prompt"
        );

        Ok(ComposedPrompt {
            text,
            included: blocks.included,
            skipped: blocks.skipped,
            estimate,
        })
    }
}
