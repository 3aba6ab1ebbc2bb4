//! Error types for treegrid-core.

use thiserror::Error;

/// Errors raised while reconciling or persisting row state.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The same id appeared twice in one row tree (or collided with a reserved row).
    #[error("Duplicate row id: {0}")]
    DuplicateRowId(String),

    /// A persisted blob could not be encoded.
    #[error("Persist error: {0}")]
    Persist(#[from] serde_json::Error),
}

/// Result alias for core operations.
pub type CoreResult<T> = Result<T, CoreError>;
