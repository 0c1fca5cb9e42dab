//! Selection state
//!
//! Tracks which catalog files are checked. Only files are ever members;
//! directory operations expand to the files beneath the directory. Every
//! member must exist in the latest catalog, which [`SelectionState::reconcile`]
//! restores after a re-scan.

use std::collections::BTreeSet;

use thiserror::Error;
use tracing::{debug, info};

use crate::catalog::{Catalog, CatalogEntry};

/// Errors from selection operations (never fatal to a session)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("Unknown catalog entry: {path}")]
    UnknownEntry { path: String },
}

/// The set of checked file paths
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    selected: BTreeSet<String>,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.selected.contains(path)
    }

    /// Selected paths in lexicographic order
    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.selected.iter()
    }

    /// Flip membership of a file, or of every file under a directory
    ///
    /// For a file, returns its membership after the flip. For a directory,
    /// each descendant file is flipped individually, so toggling twice always
    /// restores the previous state; the return value reports whether every
    /// file under the directory is now selected.
    pub fn toggle(&mut self, path: &str, catalog: &Catalog) -> Result<bool, SelectionError> {
        debug!(%path, "SelectionState::toggle: called");
        let entry = Self::lookup(path, catalog)?;

        if !entry.is_dir {
            let now_selected = if self.selected.remove(path) {
                false
            } else {
                self.selected.insert(path.to_string());
                true
            };
            debug!(%path, now_selected, "SelectionState::toggle: flipped file");
            return Ok(now_selected);
        }

        let files: Vec<&str> = catalog.files_under(path).map(|e| e.path.as_str()).collect();
        for file in &files {
            if !self.selected.remove(*file) {
                self.selected.insert(file.to_string());
            }
        }
        let all_selected = !files.is_empty() && files.iter().all(|f| self.selected.contains(*f));
        debug!(%path, files = files.len(), all_selected, "SelectionState::toggle: flipped directory");
        Ok(all_selected)
    }

    /// Select a file, or every file under a directory; returns how many were added
    pub fn select(&mut self, path: &str, catalog: &Catalog) -> Result<usize, SelectionError> {
        debug!(%path, "SelectionState::select: called");
        let entry = Self::lookup(path, catalog)?;
        if !entry.is_dir {
            return Ok(usize::from(self.selected.insert(path.to_string())));
        }
        let added = catalog
            .files_under(path)
            .filter(|e| self.selected.insert(e.path.clone()))
            .count();
        Ok(added)
    }

    /// Deselect a file, or every file under a directory; returns how many were removed
    pub fn deselect(&mut self, path: &str, catalog: &Catalog) -> Result<usize, SelectionError> {
        debug!(%path, "SelectionState::deselect: called");
        let entry = Self::lookup(path, catalog)?;
        if !entry.is_dir {
            return Ok(usize::from(self.selected.remove(path)));
        }
        let removed = catalog
            .files_under(path)
            .filter(|e| self.selected.remove(&e.path))
            .count();
        Ok(removed)
    }

    /// Select every file in the catalog; returns how many were added
    pub fn select_all(&mut self, catalog: &Catalog) -> usize {
        let added = catalog.files().filter(|e| self.selected.insert(e.path.clone())).count();
        debug!(added, total = self.selected.len(), "SelectionState::select_all: called");
        added
    }

    /// Clear the selection; returns how many were removed
    pub fn deselect_all(&mut self) -> usize {
        let removed = self.selected.len();
        self.selected.clear();
        debug!(removed, "SelectionState::deselect_all: called");
        removed
    }

    /// Drop selected paths that are no longer files in `catalog`
    ///
    /// Never adds paths. Returns the pruned paths in order.
    pub fn reconcile(&mut self, catalog: &Catalog) -> Vec<String> {
        let pruned: Vec<String> = self
            .selected
            .iter()
            .filter(|p| catalog.get(p).is_none_or(|e| e.is_dir))
            .cloned()
            .collect();
        for path in &pruned {
            self.selected.remove(path);
        }
        if pruned.is_empty() {
            debug!("SelectionState::reconcile: nothing pruned");
        } else {
            info!(count = pruned.len(), ?pruned, "Pruned selection after re-scan");
        }
        pruned
    }

    fn lookup<'a>(path: &str, catalog: &'a Catalog) -> Result<&'a CatalogEntry, SelectionError> {
        catalog.get(path).ok_or_else(|| {
            debug!(%path, "SelectionState::lookup: unknown entry");
            SelectionError::UnknownEntry { path: path.to_string() }
        })
    }
}
