//! Error types for config parsing, transform compilation and baking.

use std::path::PathBuf;
use thiserror::Error;

use crate::config::ConfigVersion;

/// Result type for colour-management operations.
pub type OcioResult<T> = Result<T, OcioError>;

/// Errors that can occur during colour-management operations.
#[derive(Debug, Error)]
pub enum OcioError {
    /// I/O error reading configs or writing bakes.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing or serialization error.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Config file not found.
    #[error("config file not found: {path}")]
    ConfigNotFound {
        /// Path that was searched.
        path: PathBuf,
    },

    /// Config older than the minimum supported version.
    #[error("unsupported config version: {version} (requires {minimum} or newer)")]
    UnsupportedVersion {
        /// Version string from the config.
        version: String,
        /// Minimum accepted version.
        minimum: ConfigVersion,
    },

    /// Colour space not found in config.
    #[error("colour space '{name}' does not exist in the config")]
    ColorSpaceNotFound {
        /// Name of the missing colour space.
        name: String,
    },

    /// Display not found in config.
    #[error("display '{name}' does not exist in the config")]
    DisplayNotFound {
        /// Name of the missing display.
        name: String,
    },

    /// View not found for display.
    #[error("view '{view}' does not exist for display '{display}'")]
    ViewNotFound {
        /// Display name.
        display: String,
        /// View name.
        view: String,
    },

    /// Builtin transform style this crate doesn't know.
    #[error("unknown builtin transform: {style}")]
    UnknownBuiltin {
        /// Style string as written.
        style: String,
    },

    /// Invalid transform definition.
    #[error("invalid transform: {reason}")]
    InvalidTransform {
        /// Description of what's wrong.
        reason: String,
    },

    /// File referenced by a transform not found.
    #[error("transform file not found: {path}")]
    TransformFileNotFound {
        /// Path as referenced.
        path: PathBuf,
    },

    /// LUT loading or writing error.
    #[error("LUT error: {0}")]
    Lut(#[from] vpcal_lut::LutError),

    /// General validation error.
    #[error("validation error: {0}")]
    Validation(String),
}

pub(crate) fn invalid_transform(reason: impl Into<String>) -> OcioError {
    OcioError::InvalidTransform {
        reason: reason.into(),
    }
}
