//! Error types for treegrid-table.

use thiserror::Error;
use treegrid_core::CoreError;
use treegrid_layout::LayoutError;

/// Errors surfaced by the table facade.
#[derive(Debug, Error)]
pub enum TableError {
    /// Row reconciliation failed.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Column widths could not be resolved.
    #[error(transparent)]
    Layout(#[from] LayoutError),

    /// A nested card was opened for a kind with no configured style.
    #[error("No style for kind: {0}")]
    NoStyleForKind(String),

    /// A column id that is not part of the column model.
    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    /// Table configuration could not be parsed.
    #[error("Config error: {0}")]
    Config(#[from] serde_yaml_ng::Error),

    /// Persisted state could not be encoded.
    #[error("Persist error: {0}")]
    Persist(#[from] serde_json::Error),
}

/// Result alias for table operations.
pub type TableResult<T> = Result<T, TableError>;
