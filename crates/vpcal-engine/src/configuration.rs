//! Settings recommendations derived from measurements.
//!
//! After a first analysis pass the advisor suggests whether a wall needs
//! EOTF correction and gamut compression at all. Recommendations are plain
//! values; [`apply`] writes them through [`Project::set`] so verification
//! walls follow their primary.

use serde::Serialize;
use tracing::{debug, info};
use vpcal_core::{CalibrationResults, Project, SettingValue, WallField};

use crate::error::EngineResult;
use crate::validation::upper_ramp;

/// Allowed deviation of a channel's mean linearity ratio from 1.
pub const EOTF_LINEARITY_TOLERANCE: f64 = 0.15;
/// Max distance beyond which gamut compression is recommended.
pub const GAMUT_COMPRESSION_TRIGGER: f64 = 1.05;

/// A recommended value for a wall setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ConfigurationResult {
    /// Setting to change.
    pub field: WallField,
    /// Recommended value.
    pub value: bool,
}

/// Recommends EOTF correction when any channel of the upper grey ramp
/// deviates from linear by more than [`EOTF_LINEARITY_TOLERANCE`].
///
/// Missing or unusable linearity data recommends correction.
pub fn decide_if_eotf_correction_needed(results: &CalibrationResults) -> ConfigurationResult {
    let ramp = upper_ramp(&results.eotf_linearity);
    let value = if ramp.is_empty() {
        debug!("no EOTF linearity data, recommending correction");
        true
    } else {
        let n = ramp.len() as f64;
        (0..3).any(|c| {
            let mean = ramp.iter().map(|s| s[c]).sum::<f64>() / n;
            !mean.is_finite() || (mean - 1.0).abs() > EOTF_LINEARITY_TOLERANCE
        })
    };
    ConfigurationResult {
        field: WallField::EnableEotfCorrection,
        value,
    }
}

/// Recommends gamut compression when any max distance exceeds
/// [`GAMUT_COMPRESSION_TRIGGER`].
pub fn decide_if_we_do_gamut_compression(results: &CalibrationResults) -> ConfigurationResult {
    ConfigurationResult {
        field: WallField::EnableGamutCompression,
        value: results
            .max_distances
            .iter()
            .any(|&d| d > GAMUT_COMPRESSION_TRIGGER),
    }
}

/// Every recommendation for the measured wall.
pub fn recommend(results: &CalibrationResults) -> Vec<ConfigurationResult> {
    vec![
        decide_if_eotf_correction_needed(results),
        decide_if_we_do_gamut_compression(results),
    ]
}

/// Writes `recommendations` to `wall`.
pub fn apply(
    project: &mut Project,
    wall: &str,
    recommendations: &[ConfigurationResult],
) -> EngineResult<()> {
    for rec in recommendations {
        project.set(wall, rec.field, SettingValue::Bool(rec.value))?;
        info!(wall, field = %rec.field, value = rec.value, "applied recommendation");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_linearity(sample: [f64; 3]) -> CalibrationResults {
        CalibrationResults {
            eotf_linearity: vec![sample; 30],
            ..Default::default()
        }
    }

    #[test]
    fn non_linear_ramp_needs_correction() {
        let r = decide_if_eotf_correction_needed(&with_linearity([1.9, 0.8, 0.9]));
        assert_eq!(r.field, WallField::EnableEotfCorrection);
        assert!(r.value);
    }

    #[test]
    fn linear_ramp_needs_none() {
        assert!(!decide_if_eotf_correction_needed(&with_linearity([0.9, 1.1, 1.0])).value);
    }

    #[test]
    fn missing_linearity_recommends_correction() {
        assert!(decide_if_eotf_correction_needed(&CalibrationResults::default()).value);
        assert!(decide_if_eotf_correction_needed(&with_linearity([f64::NAN, 1.0, 1.0])).value);
    }

    #[test]
    fn gamut_trigger_is_strict() {
        let mut results = CalibrationResults {
            max_distances: [1.05, 1.05, 1.05],
            ..Default::default()
        };
        assert!(!decide_if_we_do_gamut_compression(&results).value);
        results.max_distances[1] = 1.2;
        assert!(decide_if_we_do_gamut_compression(&results).value);
    }
}
