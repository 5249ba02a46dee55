//! # vpcal-core
//!
//! Data model for LED wall calibration.
//!
//! - [`WallSettings`] - per-wall calibration settings, keyed by [`WallField`]
//! - [`Project`] - registry of walls, owner of the primary/verification wall rules
//! - [`CalibrationResults`] - measurements produced by the analysis stage
//! - closed vocabularies: [`CalculationOrder`], [`Cat`], [`Eotf`],
//!   [`ColourSpace`], [`CameraColourSpace`]
//!
//! ## Crate Structure
//!
//! ```text
//! vpcal-core (this crate)
//!    ^
//!    +-- vpcal-engine (assembly, validation, advice)
//!    +-- vpcal-cli
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use vpcal_core::{CalculationOrder, Project, WallField};
//!
//! let mut project = Project::new();
//! project.add_wall("Wall1").unwrap();
//! project
//!     .set("Wall1", WallField::CalculationOrder, CalculationOrder::EotfThenColourSpace)
//!     .unwrap();
//!
//! let json = project.to_json().unwrap();
//! let back = Project::from_json(&json).unwrap();
//! assert_eq!(back, project);
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod error;
pub mod project;
pub mod results;
pub mod settings;
pub mod vocab;

pub use error::{SettingsError, SettingsResult};
pub use project::Project;
pub use results::CalibrationResults;
pub use settings::{SettingValue, ValueKind, WallField, WallSettings};
pub use vocab::{CalculationOrder, CameraColourSpace, Cat, ColourSpace, Eotf, UnknownToken};
