//! Session error types

use thiserror::Error;

use crate::catalog::CatalogError;
use crate::prompts::TemplateError;
use crate::selection::SelectionError;

/// Errors surfaced by session operations
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Selection(#[from] SelectionError),

    #[error(transparent)]
    Template(#[from] TemplateError),
}
