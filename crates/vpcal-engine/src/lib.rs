//! # vpcal-engine
//!
//! Turns LED wall measurements into a deployable calibration pipeline and
//! checks that the measurements are trustworthy.
//!
//! - [`build_eotf_lut`] - PQ-domain EOTF correction tables
//! - [`gamut_compression_group`] - ACES 1.3 gamut compression stage
//! - [`Assembler`] - orders the stages and writes the sidecar LUT
//! - [`run_validations`] - exposure, peak white, EOTF and gamut checks
//! - [`recommend`] / [`apply`] - settings advice from the measurements
//!
//! # Quick Start
//!
//! ```no_run
//! use vpcal_core::{CalibrationResults, Project};
//! use vpcal_engine::{run_validations, Assembler};
//!
//! let project = Project::load("project.json")?;
//! let results = CalibrationResults::load("Wall1_results.json")?;
//! let wall = project.wall("Wall1")?;
//!
//! for check in run_validations(&results) {
//!     println!("{}: {}", check.name, check.status);
//! }
//! let assembled = Assembler::new(wall, &results).assemble("out")?;
//! println!("{}", assembled.to_yaml()?);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod assemble;
mod configuration;
mod eotf;
mod error;
mod gamut;
mod validation;

pub use assemble::{sidecar_name, AssembledCalibration, Assembler};
pub use configuration::{
    apply, decide_if_eotf_correction_needed, decide_if_we_do_gamut_compression, recommend,
    ConfigurationResult, EOTF_LINEARITY_TOLERANCE, GAMUT_COMPRESSION_TRIGGER,
};
pub use eotf::{build_eotf_lut, CurveIssue, EotfLut, LUT_LEN};
pub use error::{EngineError, EngineResult};
pub use gamut::{
    gamut_compression_group, gamut_compression_params, GAMUT_COMPRESSION_LIMIT_MAX,
    GAMUT_COMPRESSION_LIMIT_MIN, GAMUT_COMPRESSION_POWER, GAMUT_COMPRESSION_THRESHOLD,
};
pub use validation::{
    eotf_validation, exposure_validation, gamut_delta_validation, max_white_vs_eotf_validation,
    run_validations, Check, ValidationResult, ValidationStatus, CHECKS,
};
