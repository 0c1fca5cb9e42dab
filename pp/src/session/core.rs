//! Session core

use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::{debug, info, warn};

use super::SessionError;
use crate::catalog::{Catalog, CatalogError, ScanConfig, scan};
use crate::config::Config;
use crate::prompts::{ComposeRequest, ComposedPrompt, PromptComposer, TemplateError, TemplateSet};
use crate::selection::{SelectionError, SelectionState};

/// The single active session over a base directory
pub struct Session {
    base: PathBuf,
    scan_config: ScanConfig,
    catalog: Catalog,
    selection: SelectionState,
    composer: PromptComposer,
    request: ComposeRequest,
    /// When the most recent successful scan started
    last_scan: Instant,
}

impl Session {
    /// Open a session and scan the base directory
    pub fn open(base: impl AsRef<Path>, config: &Config) -> Result<Self, SessionError> {
        let composer = config.composer()?;
        Ok(Self::with_composer(base, config.scan.clone(), composer)?)
    }

    /// Open a session with an explicit composer
    pub fn with_composer(
        base: impl AsRef<Path>,
        scan_config: ScanConfig,
        composer: PromptComposer,
    ) -> Result<Self, CatalogError> {
        let base = base.as_ref();
        debug!(?base, "Session::with_composer: called");
        // Canonical so watcher paths strip cleanly against it
        let base = base.canonicalize().unwrap_or_else(|_| base.to_path_buf());

        let started = Instant::now();
        let catalog = scan(&base, &scan_config)?;
        info!(base = %base.display(), entries = catalog.len(), "Session opened");

        Ok(Self {
            base,
            scan_config,
            catalog,
            selection: SelectionState::new(),
            composer,
            request: ComposeRequest::default(),
            last_scan: started,
        })
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn request(&self) -> &ComposeRequest {
        &self.request
    }

    pub fn templates(&self) -> &TemplateSet {
        self.composer.templates()
    }

    /// When the most recent successful scan started
    pub fn last_scan(&self) -> Instant {
        self.last_scan
    }

    /// Re-scan the base directory and prune the selection
    ///
    /// On failure the previous catalog and selection stay in place.
    pub fn rescan(&mut self) -> Result<Vec<String>, CatalogError> {
        debug!(base = ?self.base, "Session::rescan: called");
        let started = Instant::now();
        let catalog = scan(&self.base, &self.scan_config)?;
        let pruned = self.selection.reconcile(&catalog);
        self.catalog = catalog;
        self.last_scan = started;
        Ok(pruned)
    }

    /// Flip a file or directory; unknown paths are logged and reported
    pub fn toggle(&mut self, path: &str) -> Result<bool, SelectionError> {
        self.selection.toggle(path, &self.catalog).inspect_err(|e| {
            warn!(error = %e, "Ignoring toggle");
        })
    }

    pub fn select(&mut self, path: &str) -> Result<usize, SelectionError> {
        self.selection.select(path, &self.catalog).inspect_err(|e| {
            warn!(error = %e, "Ignoring select");
        })
    }

    pub fn deselect(&mut self, path: &str) -> Result<usize, SelectionError> {
        self.selection.deselect(path, &self.catalog).inspect_err(|e| {
            warn!(error = %e, "Ignoring deselect");
        })
    }

    pub fn select_all(&mut self) -> usize {
        self.selection.select_all(&self.catalog)
    }

    pub fn deselect_all(&mut self) -> usize {
        self.selection.deselect_all()
    }

    /// Choose the task type; `None` clears it
    pub fn set_task_type(&mut self, name: Option<&str>) -> Result<(), TemplateError> {
        if let Some(name) = name {
            self.composer.templates().task_type(name)?;
        }
        debug!(?name, "Session::set_task_type: called");
        self.request.task_type = name.map(str::to_string);
        Ok(())
    }

    /// Choose the preset; `None` clears it
    pub fn set_preset(&mut self, name: Option<&str>) -> Result<(), TemplateError> {
        if let Some(name) = name {
            self.composer.templates().preset(name)?;
        }
        debug!(?name, "Session::set_preset: called");
        self.request.preset = name.map(str::to_string);
        Ok(())
    }

    pub fn set_instruction(&mut self, instruction: impl Into<String>) {
        self.request.instruction = instruction.into();
    }

    /// Compose the current selection with the current request
    pub fn compose(&self) -> Result<ComposedPrompt, TemplateError> {
        self.composer.compose(&self.catalog, &self.selection, &self.request)
    }

    /// Replace the whole request; nothing changes if a name is unknown
    pub fn set_request(&mut self, request: ComposeRequest) -> Result<(), TemplateError> {
        debug!(task_type = ?request.task_type, preset = ?request.preset, "Session::set_request: called");
        let templates = self.composer.templates();
        if let Some(name) = request.task_type.as_deref() {
            templates.task_type(name)?;
        }
        if let Some(name) = request.preset.as_deref() {
            templates.preset(name)?;
        }
        self.request = request;
        Ok(())
    }
}
