//! Task types, presets and the set they are chosen from

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use super::TemplateError;
use super::embedded;

/// Placeholder a task-type body uses to mark where file blocks go
pub const PLACEHOLDER: &str = "{content}";

/// A named frame around the assembled files
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskTypeTemplate {
    pub name: String,
    pub body: String,
}

impl TaskTypeTemplate {
    pub fn new(name: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            body: body.into(),
        }
    }

    /// A task type that is nothing but the files
    pub fn bare() -> Self {
        Self::new("files", PLACEHOLDER)
    }

    /// Substitute `content` for every placeholder in the body
    ///
    /// A body without a placeholder gets the content appended after a blank
    /// line, so the files are never silently dropped.
    pub fn render(&self, content: &str) -> String {
        if self.body.contains(PLACEHOLDER) {
            return self.body.replace(PLACEHOLDER, content);
        }
        debug!(name = %self.name, "TaskTypeTemplate::render: no placeholder, appending content");
        match (self.body.is_empty(), content.is_empty()) {
            (_, true) => self.body.clone(),
            (true, false) => content.to_string(),
            (false, false) => format!("{}\n\n{}", self.body, content),
        }
    }
}

/// Trailing guidance appended after the files
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Preset {
    pub name: String,
    pub body: String,
}

impl Preset {
    pub fn new(name: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            body: body.into(),
        }
    }
}

/// All task types and presets available to a session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateSet {
    task_types: BTreeMap<String, TaskTypeTemplate>,
    presets: BTreeMap<String, Preset>,
}

impl TemplateSet {
    /// An empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// The embedded task types and presets
    pub fn builtin() -> Self {
        debug!("TemplateSet::builtin: called");
        let mut set = Self::new();
        for (name, body) in embedded::TASK_TYPES {
            set.insert_task_type(TaskTypeTemplate::new(*name, body.trim_end()));
        }
        for (name, body) in embedded::PRESETS {
            set.insert_preset(Preset::new(*name, body.trim_end()));
        }
        set
    }

    /// Built-ins overlaid with configured entries; configured bodies win on a name clash
    pub fn with_overrides(task_types: &BTreeMap<String, String>, presets: &BTreeMap<String, String>) -> Self {
        debug!(
            task_types = task_types.len(),
            presets = presets.len(),
            "TemplateSet::with_overrides: called"
        );
        let mut set = Self::builtin();
        for (name, body) in task_types {
            set.insert_task_type(TaskTypeTemplate::new(name.clone(), body.clone()));
        }
        for (name, body) in presets {
            set.insert_preset(Preset::new(name.clone(), body.clone()));
        }
        set
    }

    pub fn insert_task_type(&mut self, template: TaskTypeTemplate) {
        self.task_types.insert(template.name.clone(), template);
    }

    pub fn insert_preset(&mut self, preset: Preset) {
        self.presets.insert(preset.name.clone(), preset);
    }

    pub fn task_type(&self, name: &str) -> Result<&TaskTypeTemplate, TemplateError> {
        self.task_types.get(name).ok_or_else(|| TemplateError::UnknownTemplate {
            kind: "task type",
            name: name.to_string(),
        })
    }

    pub fn preset(&self, name: &str) -> Result<&Preset, TemplateError> {
        self.presets.get(name).ok_or_else(|| TemplateError::UnknownTemplate {
            kind: "preset",
            name: name.to_string(),
        })
    }

    /// Task types sorted by name
    pub fn task_types(&self) -> impl Iterator<Item = &TaskTypeTemplate> {
        self.task_types.values()
    }

    /// Presets sorted by name
    pub fn presets(&self) -> impl Iterator<Item = &Preset> {
        self.presets.values()
    }
}
