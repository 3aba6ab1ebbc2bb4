//! Error types for treegrid-layout.

use thiserror::Error;

/// Column configuration errors found while resolving widths.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    /// A width that is not a number, `px`, `%` or `fr`.
    #[error("Unsupported width for column {column}: {value}")]
    UnsupportedWidth { column: String, value: String },

    /// A minimum width that is not expressed in `px`.
    #[error("Minimum width for column {column} must be in px, got {value}")]
    NonPixelMinWidth { column: String, value: String },
}

/// Result alias for layout operations.
pub type LayoutResult<T> = Result<T, LayoutError>;
