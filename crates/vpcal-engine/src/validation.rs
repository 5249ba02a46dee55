//! Post-calibration sanity checks.
//!
//! Each check looks at one aspect of the measurements and always produces
//! a [`ValidationResult`]. Checks are independent: a failure never stops
//! the others. A failing check is an outcome to report, not an error.
//!
//! # Example
//!
//! ```
//! use vpcal_core::CalibrationResults;
//! use vpcal_engine::{run_validations, ValidationStatus};
//!
//! let mut results = CalibrationResults::default();
//! results.measured_18_percent_sample = 0.18;
//! let report = run_validations(&results);
//! assert_eq!(report.len(), 4);
//! assert_eq!(report[0].status, ValidationStatus::Pass);
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;
use vpcal_core::CalibrationResults;

/// Exposure below this fails.
pub const EXPOSURE_FAIL_LOW: f64 = 0.144;
/// Exposure above this fails.
pub const EXPOSURE_FAIL_HIGH: f64 = 0.225;
/// Exposure above this (and below [`EXPOSURE_PASS_HIGH`]) passes.
pub const EXPOSURE_PASS_LOW: f64 = 0.163;
/// Exposure below this (and above [`EXPOSURE_PASS_LOW`]) passes.
pub const EXPOSURE_PASS_HIGH: f64 = 0.198;
/// Allowed deviation of the max white ratio from 1.
pub const MAX_WHITE_TOLERANCE: f64 = 0.1;
/// Largest acceptable mean delta-E over the upper EOTF ramp.
pub const EOTF_MAX_MEAN_DELTA_E: f64 = 5.0;
/// Delta-E at or below which a primary is considered already matching.
pub const GAMUT_DELTA_E_THRESHOLD: f64 = 3.0;

const EXPOSURE_HINT: &str = "It seems that you have not exposed the calibration patches correctly. \
Please ensure to expose the first 18% patch correctly using the camera false colour or light meter.";

/// Outcome of a check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ValidationStatus {
    /// Nothing to report.
    #[default]
    Pass,
    /// Usable, but worth a look.
    Warning,
    /// The capture or the wall setup needs fixing.
    Fail,
}

impl ValidationStatus {
    /// Report token (`PASS`, `WARNING`, `FAIL`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pass => "PASS",
            Self::Warning => "WARNING",
            Self::Fail => "FAIL",
        }
    }
}

impl fmt::Display for ValidationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One check's outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// Check name.
    pub name: String,
    /// Outcome.
    pub status: ValidationStatus,
    /// Advice for the user; empty on pass.
    pub message: String,
}

impl ValidationResult {
    fn pass(name: &str) -> Self {
        Self {
            name: name.to_string(),
            status: ValidationStatus::Pass,
            message: String::new(),
        }
    }

    fn with(mut self, status: ValidationStatus, message: impl Into<String>) -> Self {
        self.status = status;
        self.message = message.into();
        self
    }
}

/// A validation check.
pub type Check = fn(&CalibrationResults) -> ValidationResult;

/// The checks run on every calibration, in report order.
pub const CHECKS: [Check; 4] = [
    exposure_validation,
    max_white_vs_eotf_validation,
    eotf_validation,
    gamut_delta_validation,
];

/// Runs every check in [`CHECKS`].
pub fn run_validations(results: &CalibrationResults) -> Vec<ValidationResult> {
    CHECKS
        .iter()
        .map(|check| {
            let r = check(results);
            debug!(name = %r.name, status = %r.status, "validation");
            r
        })
        .collect()
}

/// Upper two thirds of a grey ramp: the darkest third and the last patch
/// are too noisy to judge.
pub(crate) fn upper_ramp<T>(samples: &[T]) -> &[T] {
    let start = samples.len() / 3;
    let end = samples.len().saturating_sub(1);
    if start >= end {
        return &[];
    }
    &samples[start..end]
}

/// Checks that the 18% grey patch was exposed correctly.
pub fn exposure_validation(results: &CalibrationResults) -> ValidationResult {
    let r = ValidationResult::pass("Measured Exposure Validation");
    let m = results.measured_18_percent_sample;

    if !m.is_finite() || m < EXPOSURE_FAIL_LOW || m > EXPOSURE_FAIL_HIGH {
        return r.with(
            ValidationStatus::Fail,
            format!("The Measured Exposure: {m}\n{EXPOSURE_HINT}"),
        );
    }
    if m > EXPOSURE_PASS_LOW && m < EXPOSURE_PASS_HIGH {
        return r;
    }
    r.with(
        ValidationStatus::Warning,
        format!("The Measured Exposure: {m} is not ideal\n{EXPOSURE_HINT}"),
    )
}

/// Checks that the measured peak white matches the configured peak.
pub fn max_white_vs_eotf_validation(results: &CalibrationResults) -> ValidationResult {
    let r = ValidationResult::pass("Max White vs EOTF Validation");
    let deviation = (results.max_white_delta.abs() - 1.0).abs();

    if deviation.is_nan() || deviation > MAX_WHITE_TOLERANCE {
        return r.with(
            ValidationStatus::Fail,
            "It appears that the EOTF ramp does not match the max peak luminance of your LED wall. \
Please check that the wall settings match the actual peak luminance of your wall also check your \
imaging chain from content engine to LED processor and re shoot the plates",
        );
    }
    r
}

/// Checks the mean delta-E of the upper EOTF ramp.
pub fn eotf_validation(results: &CalibrationResults) -> ValidationResult {
    let r = ValidationResult::pass("EOTF Validation");
    let ramp = upper_ramp(&results.delta_e_eotf_ramp);
    if ramp.is_empty() {
        return r.with(
            ValidationStatus::Fail,
            format!(
                "Insufficient samples in the EOTF ramp ({} patches), please re shoot the plates",
                results.delta_e_eotf_ramp.len()
            ),
        );
    }

    let mean = ramp.iter().sum::<f64>() / ramp.len() as f64;
    if mean.is_nan() || mean > EOTF_MAX_MEAN_DELTA_E {
        return r.with(
            ValidationStatus::Fail,
            "The EOTF detected is not within a tolerable range, please check your imaging chain \
from content engine to LED processor, and re shoot the plates",
        );
    }
    r
}

/// Warns when the wall already matches the target closely enough that
/// calibrating may be unnecessary.
pub fn gamut_delta_validation(results: &CalibrationResults) -> ValidationResult {
    let r = ValidationResult::pass("Gamut Delta Validation");
    let rgbw = &results.delta_e_rgbw;

    // only a value clearly above the threshold means calibration is needed
    if !rgbw.iter().any(|&v| v > GAMUT_DELTA_E_THRESHOLD) {
        return r.with(
            ValidationStatus::Warning,
            "The LED wall a viewed by the camera view is within a tolerable perceivable range, \
you may not need to calibrate this wall",
        );
    }
    r
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exposure(m: f64) -> ValidationStatus {
        let results = CalibrationResults {
            measured_18_percent_sample: m,
            ..Default::default()
        };
        exposure_validation(&results).status
    }

    #[test]
    fn exposure_bands() {
        assert_eq!(exposure(0.10), ValidationStatus::Fail);
        assert_eq!(exposure(0.18), ValidationStatus::Pass);
        assert_eq!(exposure(0.15), ValidationStatus::Warning);
        assert_eq!(exposure(0.20), ValidationStatus::Warning);
        assert_eq!(exposure(0.23), ValidationStatus::Fail);
        assert_eq!(exposure(f64::NAN), ValidationStatus::Fail);
    }

    #[test]
    fn exposure_band_edges() {
        // fail bounds are inclusive of warning, pass bounds are exclusive
        assert_eq!(exposure(EXPOSURE_FAIL_LOW), ValidationStatus::Warning);
        assert_eq!(exposure(EXPOSURE_FAIL_HIGH), ValidationStatus::Warning);
        assert_eq!(exposure(EXPOSURE_PASS_LOW), ValidationStatus::Warning);
        assert_eq!(exposure(EXPOSURE_PASS_HIGH), ValidationStatus::Warning);
    }

    #[test]
    fn exposure_messages() {
        let results = CalibrationResults {
            measured_18_percent_sample: 0.15,
            ..Default::default()
        };
        let r = exposure_validation(&results);
        assert!(r.message.starts_with("The Measured Exposure: 0.15 is not ideal\n"));
        assert!(r.message.contains("18% patch"));
    }

    #[test]
    fn upper_ramp_drops_first_third_and_last() {
        let v: Vec<u32> = (0..30).collect();
        let u = upper_ramp(&v);
        assert_eq!(u.first(), Some(&10));
        assert_eq!(u.last(), Some(&28));
        assert!(upper_ramp(&[1]).is_empty());
        assert_eq!(upper_ramp(&[1, 2]), &[1]);
    }

    #[test]
    fn status_tokens() {
        assert_eq!(serde_json::to_string(&ValidationStatus::Warning).unwrap(), "\"WARNING\"");
        assert_eq!(ValidationStatus::default(), ValidationStatus::Pass);
    }
}
