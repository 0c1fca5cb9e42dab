//! Embedded prompts
//!
//! These are compiled into the binary from .pmt files at build time.

pub const TASKTYPE_BUGFIX: &str = include_str!("../../prompts/tasktype-bugfix.pmt");
pub const TASKTYPE_FEATURE: &str = include_str!("../../prompts/tasktype-feature.pmt");
pub const TASKTYPE_REFACTOR: &str = include_str!("../../prompts/tasktype-refactor.pmt");
pub const TASKTYPE_REVIEW: &str = include_str!("../../prompts/tasktype-review.pmt");

pub const PRESET_CONCISE: &str = include_str!("../../prompts/preset-concise.pmt");
pub const PRESET_FULL_FILES: &str = include_str!("../../prompts/preset-full-files.pmt");

/// Default layout: each section as `<!-- title -->`, a blank line, then its body
pub const LAYOUT: &str =
    "{{#each sections}}{{#unless @first}}{{@root.separator}}{{/unless}}<!-- {{title}} -->{{@root.separator}}{{body}}{{/each}}";

/// Built-in task types as (name, body)
pub const TASK_TYPES: &[(&str, &str)] = &[
    ("bugfix", TASKTYPE_BUGFIX),
    ("feature", TASKTYPE_FEATURE),
    ("refactor", TASKTYPE_REFACTOR),
    ("review", TASKTYPE_REVIEW),
];

/// Built-in presets as (name, body)
pub const PRESETS: &[(&str, &str)] = &[("concise", PRESET_CONCISE), ("full-files", PRESET_FULL_FILES)];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompts::PLACEHOLDER;

    #[test]
    fn test_every_task_type_has_placeholder() {
        for (name, body) in TASK_TYPES {
            assert!(body.contains(PLACEHOLDER), "task type {name} lacks placeholder");
        }
    }

    #[test]
    fn test_presets_have_no_placeholder() {
        for (name, body) in PRESETS {
            assert!(!body.contains(PLACEHOLDER), "preset {name} has a placeholder");
        }
    }

    #[test]
    fn test_builtin_names() {
        let names: Vec<&str> = TASK_TYPES.iter().map(|(n, _)| *n).collect();
        assert_eq!(names, vec!["bugfix", "feature", "refactor", "review"]);
        assert!(TASKTYPE_BUGFIX.contains("root cause"));
    }
}
