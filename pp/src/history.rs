//! Last-used base directory
//!
//! Remembers the most recently opened base directory so the directory
//! argument can be omitted on the next run.

use std::fs;
use std::path::{Path, PathBuf};

use eyre::{Context, Result};
use tracing::{debug, warn};

/// File that stores the last directory, one path, no trailing newline required
#[derive(Debug, Clone)]
pub struct LastDirectory {
    path: PathBuf,
}

impl LastDirectory {
    /// Store under the platform data directory
    pub fn default_location() -> Self {
        let path = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("promptpack")
            .join("last-directory");
        Self::at(path)
    }

    /// Store at an explicit file path
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The remembered directory, if it is recorded and still a directory
    pub fn load(&self) -> Option<PathBuf> {
        debug!(path = ?self.path, "LastDirectory::load: called");
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) => {
                debug!(error = %e, "LastDirectory::load: nothing recorded");
                return None;
            }
        };
        let dir = PathBuf::from(content.trim());
        if dir.as_os_str().is_empty() || !dir.is_dir() {
            warn!(dir = %dir.display(), "Remembered directory no longer exists");
            return None;
        }
        Some(dir)
    }

    /// Record `dir` as the last directory
    pub fn save(&self, dir: &Path) -> Result<()> {
        debug!(path = ?self.path, ?dir, "LastDirectory::save: called");
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).context("Failed to create state directory")?;
        }
        fs::write(&self.path, dir.to_string_lossy().as_bytes())
            .context(format!("Failed to write {}", self.path.display()))?;
        Ok(())
    }

    /// Resolve the directory to open: explicit argument first, then the remembered one
    pub fn resolve(&self, explicit: Option<&Path>) -> Option<PathBuf> {
        explicit.map(Path::to_path_buf).or_else(|| self.load())
    }
}
