//! Prompt error types

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while choosing or rendering templates
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Unknown {kind}: {name}")]
    UnknownTemplate { kind: &'static str, name: String },

    #[error("Invalid layout template: {0}")]
    Layout(String),

    #[error("Failed to render layout: {0}")]
    Render(String),
}

/// A selected file that could not be read at assembly time
///
/// Not fatal: the assembler logs it and lists the path as skipped.
#[derive(Debug, Error)]
#[error("File unreadable: {path}")]
pub struct FileUnreadable {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_template_message() {
        let err = TemplateError::UnknownTemplate {
            kind: "preset",
            name: "verbose".to_string(),
        };
        assert_eq!(err.to_string(), "Unknown preset: verbose");
    }

    #[test]
    fn test_file_unreadable_keeps_source() {
        let err = FileUnreadable {
            path: PathBuf::from("/tmp/gone.py"),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        assert!(err.to_string().contains("/tmp/gone.py"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
