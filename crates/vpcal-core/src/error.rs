//! Error types for wall settings and project registry operations.
//!
//! Every mutation of a wall runs its checks before touching any record, so
//! an error always leaves the registry exactly as it was.
//!
//! # Usage
//!
//! ```rust
//! use vpcal_core::{Project, SettingsError, WallField};
//!
//! let mut project = Project::new();
//! project.add_wall("Wall1").unwrap();
//!
//! let err = project
//!     .set("Wall1", WallField::ReferenceWall, "Wall1")
//!     .unwrap_err();
//! assert!(matches!(err, SettingsError::InvalidLink { .. }));
//! ```

use thiserror::Error;

/// Result type for settings operations.
pub type SettingsResult<T> = Result<T, SettingsError>;

/// Errors raised while mutating or loading wall settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// A wall link that would break the pairing rules (self-reference,
    /// chained verification walls).
    #[error("invalid link on wall '{wall}': {reason}")]
    InvalidLink {
        /// Wall being modified.
        wall: String,
        /// What is wrong with the link.
        reason: String,
    },

    /// Named wall does not exist in the project.
    #[error("wall not found: {name}")]
    WallNotFound {
        /// Name that was looked up.
        name: String,
    },

    /// A wall with this name already exists.
    #[error("wall already exists: {name}")]
    DuplicateWall {
        /// Conflicting name.
        name: String,
    },

    /// More than one white point source enabled on the same wall.
    #[error("wall '{wall}': cannot enable {field} while {other} is enabled")]
    ConflictingWhitePointSource {
        /// Wall being modified.
        wall: String,
        /// Field being enabled.
        field: String,
        /// Field that is already enabled.
        other: String,
    },

    /// Value has the wrong type or is not a member of the field's vocabulary.
    #[error("invalid value for '{field}': {reason}")]
    InvalidValue {
        /// Field name.
        field: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// Field name is not a wall setting.
    #[error("unknown setting: {name}")]
    UnknownField {
        /// Name that was looked up.
        name: String,
    },

    /// Operation requires a primary wall but got a verification wall.
    #[error("wall '{name}' is a verification wall")]
    VerificationWall {
        /// Offending wall.
        name: String,
    },

    /// JSON (de)serialization failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error reading or writing a project file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SettingsError {
    pub(crate) fn invalid_value(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn not_found(name: impl Into<String>) -> Self {
        Self::WallNotFound { name: name.into() }
    }
}
