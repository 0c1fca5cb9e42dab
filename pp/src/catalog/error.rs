//! Catalog error types

use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a scan
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    #[error("Access denied: {path}")]
    AccessDenied {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error scanning {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl CatalogError {
    /// Classify an IO error raised while reading `path`
    pub(crate) fn from_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::NotFound => Self::DirectoryNotFound { path },
            std::io::ErrorKind::PermissionDenied => Self::AccessDenied { path, source },
            _ => Self::Io { path, source },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_from_io_classifies_kinds() {
        let err = CatalogError::from_io("/x", io::Error::from(io::ErrorKind::NotFound));
        assert!(matches!(err, CatalogError::DirectoryNotFound { .. }));

        let err = CatalogError::from_io("/x", io::Error::from(io::ErrorKind::PermissionDenied));
        assert!(matches!(err, CatalogError::AccessDenied { .. }));

        let err = CatalogError::from_io("/x", io::Error::other("boom"));
        assert!(matches!(err, CatalogError::Io { .. }));
    }

    #[test]
    fn test_directory_not_found_message() {
        let err = CatalogError::DirectoryNotFound {
            path: PathBuf::from("/does/not/exist"),
        };
        assert!(err.to_string().contains("/does/not/exist"));
    }
}
