//! PromptPack - assemble selected source files into LLM-ready prompts
//!
//! PromptPack scans a base directory for source files, lets the user check a
//! subset of them, and renders the selection into a single prompt framed by a
//! task-type template. The result carries a token estimate and a rough
//! difficulty level so the user knows how much they are about to paste.
//!
//! # Modules
//!
//! - [`catalog`] - Directory scanning and the ordered file catalog
//! - [`selection`] - Checked-path bookkeeping (toggle, select-all, reconcile)
//! - [`watcher`] - Debounced filesystem change signals
//! - [`prompts`] - Task types, presets, assembly and prompt layout
//! - [`estimate`] - Token estimation and difficulty levels
//! - [`session`] - The active session and its serialized reconcile loop
//! - [`config`] - Configuration types and loading
//! - [`history`] - Remembered last directory
//! - [`cli`] - Command-line interface
//! - [`repl`] - Interactive selection shell

pub mod catalog;
pub mod cli;
pub mod config;
pub mod estimate;
pub mod history;
pub mod prompts;
pub mod repl;
pub mod selection;
pub mod session;
pub mod watcher;

// Re-export commonly used types
pub use catalog::{Catalog, CatalogEntry, CatalogError, ScanConfig, scan};
pub use config::Config;
pub use estimate::{CharHeuristic, Difficulty, Estimate, EstimateConfig, TokenEstimator, WordHeuristic};
pub use prompts::{
    Assembly, ComposeRequest, ComposedPrompt, PLACEHOLDER, Preset, PromptComposer, TaskTypeTemplate, TemplateError,
    TemplateSet, assemble,
};
pub use selection::{SelectionError, SelectionState};
pub use session::{Session, SessionEvent, SessionHandle};
pub use watcher::{ChangeStream, ChangeWatcher, DirectoryChanged, WatchError, WatcherConfig};
