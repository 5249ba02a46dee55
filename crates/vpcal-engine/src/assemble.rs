//! Calibration pipeline assembly.
//!
//! Turns a wall's settings and its measurement results into the ordered
//! stage group that gets deployed on the wall:
//!
//! ```text
//! [gamut compression]  (when enabled, always first)
//! CS_EOTF:  [EOTF correction] -> matrix
//! EOTF_CS:  matrix -> [EOTF correction]
//! ```
//!
//! The EOTF correction is a PQ-domain LUT written next to the pipeline as
//! `<wall>_<order>.clf` and referenced by file name.

use std::path::{Path, PathBuf};

use tracing::{debug, info};
use vpcal_core::{CalculationOrder, CalibrationResults, WallSettings};
use vpcal_math::matrix::{embed_3x3, is_finite_3x3};
use vpcal_ocio::builtin::names;
use vpcal_ocio::{ColourBackend, GroupTransform, Transform, TransformDirection};

use crate::eotf::{build_eotf_lut, CurveIssue};
use crate::error::{EngineError, EngineResult};
use crate::gamut::gamut_compression_group;

/// File name of the EOTF sidecar for a wall and stage order.
pub fn sidecar_name(wall: &str, order: CalculationOrder) -> String {
    format!("{wall}_{order}.clf")
}

/// Assembled pipeline plus its artifacts.
#[derive(Debug, Clone, PartialEq)]
pub struct AssembledCalibration {
    /// Ordered stages.
    pub group: GroupTransform,
    /// Sidecar LUT, when the EOTF correction is enabled.
    pub lut_path: Option<PathBuf>,
    /// Faults found while building the sidecar.
    pub curve_issues: Vec<CurveIssue>,
}

impl AssembledCalibration {
    /// The group with the sidecar reference replaced by its full path, for
    /// execution outside the output folder.
    pub fn resolved_group(&self) -> GroupTransform {
        let Some(path) = &self.lut_path else {
            return self.group.clone();
        };
        let Some(file_name) = path.file_name().map(|n| n.to_string_lossy().into_owned()) else {
            return self.group.clone();
        };
        let full = path.to_string_lossy().into_owned();

        let mut root = Transform::Group(self.group.clone());
        root.for_each_stage_mut(&mut |stage| {
            if let Transform::File(f) = stage {
                if f.src == file_name {
                    f.src = full.clone();
                }
            }
        });
        match root {
            Transform::Group(g) => g,
            other => GroupTransform::new(vec![other]),
        }
    }

    /// Tagged YAML description of the pipeline.
    pub fn to_yaml(&self) -> EngineResult<String> {
        Ok(self.group.to_yaml()?)
    }
}

/// Builds the calibration pipeline of one wall.
#[derive(Debug, Clone, Copy)]
pub struct Assembler<'a> {
    wall: &'a WallSettings,
    results: &'a CalibrationResults,
}

impl<'a> Assembler<'a> {
    /// Creates an assembler for `wall` measured as `results`.
    pub fn new(wall: &'a WallSettings, results: &'a CalibrationResults) -> Self {
        Self { wall, results }
    }

    /// Whether the EOTF stage is emitted.
    pub fn eotf_correction_enabled(&self) -> bool {
        self.results.enable_eotf_correction
    }

    /// Whether the gamut compression stage is emitted. The results decide;
    /// the wall setting is the fallback.
    pub fn gamut_compression_enabled(&self) -> bool {
        self.results
            .enable_gamut_compression
            .unwrap_or_else(|| self.wall.enable_gamut_compression())
    }

    /// Builds the group and writes the sidecar LUT into `output_folder`.
    pub fn assemble(&self, output_folder: impl AsRef<Path>) -> EngineResult<AssembledCalibration> {
        let output_folder = output_folder.as_ref();
        let matrix = &self.results.target_to_screen_matrix;
        if !is_finite_3x3(matrix) {
            return Err(EngineError::InvalidResults(
                "target-to-screen matrix contains non-finite values".into(),
            ));
        }

        let order = self.wall.calculation_order();
        let mut group = GroupTransform::default();
        let mut lut_path = None;
        let mut curve_issues = Vec::new();

        if self.gamut_compression_enabled() {
            debug!(wall = self.wall.name(), "adding gamut compression");
            group.push(gamut_compression_group(self.results.max_distances).into());
        }

        let eotf_stage = if self.eotf_correction_enabled() {
            let lut = build_eotf_lut(
                self.results.eotf_curves(),
                self.wall.target_max_lum_nits() as f64,
            )?;
            std::fs::create_dir_all(output_folder)?;
            let name = sidecar_name(self.wall.name(), order);
            let path = output_folder.join(&name);
            lut.write_clf(&path, &format!("{}_{}", self.wall.name(), order))?;

            curve_issues = lut.issues;
            lut_path = Some(path);
            Some(eotf_correction_group(&name))
        } else {
            None
        };

        let matrix_stage = Transform::matrix(embed_3x3(matrix));
        match order {
            CalculationOrder::ColourSpaceThenEotf => {
                group.children.extend(eotf_stage.map(Transform::from));
                group.push(matrix_stage);
            }
            CalculationOrder::EotfThenColourSpace => {
                group.push(matrix_stage);
                group.children.extend(eotf_stage.map(Transform::from));
            }
        }

        info!(
            wall = self.wall.name(),
            %order,
            stages = group.len(),
            "assembled calibration"
        );
        Ok(AssembledCalibration {
            group,
            lut_path,
            curve_issues,
        })
    }

    /// Assembles, then runs the pipeline over `pixels` on `backend`.
    pub fn run(
        &self,
        output_folder: impl AsRef<Path>,
        backend: &dyn ColourBackend,
        pixels: &mut [[f32; 3]],
    ) -> EngineResult<AssembledCalibration> {
        let assembled = self.assemble(output_folder)?;
        backend.execute(&assembled.resolved_group(), pixels)?;
        Ok(assembled)
    }
}

/// Linear to PQ, inverse sidecar LUT, PQ to linear.
fn eotf_correction_group(sidecar: &str) -> GroupTransform {
    GroupTransform::new(vec![
        Transform::builtin(names::LINEAR_TO_ST2084, TransformDirection::Forward),
        Transform::file(sidecar, TransformDirection::Inverse),
        Transform::builtin(names::ST2084_TO_LINEAR, TransformDirection::Forward),
    ])
}
