//! Error types for the calibration engine.
//!
//! Only precondition faults are errors. Data-quality problems in the
//! measurements surface as [`CurveIssue`](crate::CurveIssue) diagnostics or
//! as validation outcomes.

use thiserror::Error;
use vpcal_core::SettingsError;
use vpcal_lut::LutError;
use vpcal_ocio::OcioError;

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors that can occur while assembling or applying a calibration.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Calibration results unusable for the requested operation.
    #[error("invalid calibration results: {0}")]
    InvalidResults(String),

    /// Sidecar LUT could not be built or written.
    #[error("LUT error: {0}")]
    Lut(#[from] LutError),

    /// Colour backend refused or failed the request.
    #[error("colour backend error: {0}")]
    Backend(#[from] OcioError),

    /// Applying a recommendation violated a settings rule.
    #[error("settings error: {0}")]
    Settings(#[from] SettingsError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
