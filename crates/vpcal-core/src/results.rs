//! Measurement results produced by the analysis stage.
//!
//! The analysis stage (outside this workspace) writes one JSON record per
//! wall with `SCREAMING_SNAKE_CASE` keys. The record is read-only here:
//! the assembler, the validation engine and the configuration advisor all
//! consume it by reference.
//!
//! Missing keys take neutral defaults (identity matrix, empty curves) so a
//! partial record still loads; the consumers report what is missing.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::SettingsResult;

/// Per-run calibration measurements of one wall.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", default)]
pub struct CalibrationResults {
    /// Camera-measured value of the 18% grey patch.
    pub measured_18_percent_sample: f64,
    /// Delta-E of every grey ramp patch.
    pub delta_e_eotf_ramp: Vec<f64>,
    /// Delta-E of the red, green, blue and white patches.
    pub delta_e_rgbw: [f64; 4],
    /// Ratio of measured to expected peak white.
    pub max_white_delta: f64,
    /// Largest out-of-gamut distances for cyan, magenta and yellow.
    pub max_distances: [f64; 3],
    /// Row-major target-to-screen colour matrix.
    pub target_to_screen_matrix: [[f64; 3]; 3],
    /// Measured red response curve.
    pub eotf_lut_r: Vec<f64>,
    /// Measured green response curve.
    pub eotf_lut_g: Vec<f64>,
    /// Measured blue response curve.
    pub eotf_lut_b: Vec<f64>,
    /// The analysis decided the EOTF correction should be applied.
    pub enable_eotf_correction: bool,
    /// The analysis decided about gamut compression; `None` defers to the wall setting.
    pub enable_gamut_compression: Option<bool>,
    /// Measured to expected ratio of each grey ramp patch, per channel.
    pub eotf_linearity: Vec<[f64; 3]>,
}

impl Default for CalibrationResults {
    fn default() -> Self {
        Self {
            measured_18_percent_sample: 0.0,
            delta_e_eotf_ramp: Vec::new(),
            delta_e_rgbw: [0.0; 4],
            max_white_delta: 0.0,
            max_distances: [0.0; 3],
            target_to_screen_matrix: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
            eotf_lut_r: Vec::new(),
            eotf_lut_g: Vec::new(),
            eotf_lut_b: Vec::new(),
            enable_eotf_correction: true,
            enable_gamut_compression: None,
            eotf_linearity: Vec::new(),
        }
    }
}

impl CalibrationResults {
    /// Parses a results record.
    pub fn from_json(json: &str) -> SettingsResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serializes the record.
    pub fn to_json(&self) -> SettingsResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Loads a results file.
    pub fn load(path: impl AsRef<Path>) -> SettingsResult<Self> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }

    /// The three measured curves in R, G, B order.
    pub fn eotf_curves(&self) -> [&[f64]; 3] {
        [&self.eotf_lut_r, &self.eotf_lut_g, &self.eotf_lut_b]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_screaming_snake_case() {
        let json = CalibrationResults::default().to_json().unwrap();
        for key in [
            "MEASURED_18_PERCENT_SAMPLE",
            "DELTA_E_EOTF_RAMP",
            "DELTA_E_RGBW",
            "MAX_WHITE_DELTA",
            "MAX_DISTANCES",
            "TARGET_TO_SCREEN_MATRIX",
            "EOTF_LUT_R",
            "EOTF_LUT_G",
            "EOTF_LUT_B",
            "ENABLE_EOTF_CORRECTION",
            "ENABLE_GAMUT_COMPRESSION",
            "EOTF_LINEARITY",
        ] {
            assert!(json.contains(&format!("\"{key}\"")), "missing {key}");
        }
    }

    #[test]
    fn partial_record_loads() {
        let results = CalibrationResults::from_json(
            r#"{"MEASURED_18_PERCENT_SAMPLE": 0.18, "DELTA_E_RGBW": [4, 1, 1, 1]}"#,
        )
        .unwrap();
        assert_eq!(results.measured_18_percent_sample, 0.18);
        assert_eq!(results.delta_e_rgbw, [4.0, 1.0, 1.0, 1.0]);
        assert_eq!(results.target_to_screen_matrix[1][1], 1.0);
        assert!(results.enable_eotf_correction);
        assert_eq!(results.enable_gamut_compression, None);
    }

    #[test]
    fn wrong_arity_is_an_error() {
        assert!(CalibrationResults::from_json(r#"{"MAX_DISTANCES": [1.0, 1.1]}"#).is_err());
    }
}
