//! LUT error types.

use thiserror::Error;

/// Result type for LUT operations.
pub type LutResult<T> = Result<T, LutError>;

/// Errors that can occur during LUT operations.
#[derive(Debug, Error)]
pub enum LutError {
    /// Invalid LUT size or channel layout.
    #[error("invalid LUT size: {0}")]
    InvalidSize(String),

    /// Malformed LUT file.
    #[error("parse error: {0}")]
    ParseError(String),

    /// Valid LUT content this crate cannot represent or evaluate.
    #[error("unsupported: {0}")]
    Unsupported(String),

    /// XML writer failure.
    #[error("XML write error: {0}")]
    Xml(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
