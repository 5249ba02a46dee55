//! # vpcal-ocio
//!
//! OCIO-style colour management for LED wall calibration.
//!
//! This crate evaluates the transform stages a calibration pipeline emits
//! and bakes display pipelines to 3D LUTs:
//! - [`Transform`] / [`GroupTransform`] - serializable stage trees
//! - [`Config`] - `.ocio` YAML subset (colour spaces, displays, views)
//! - [`Processor`] - compiled pipeline applied to RGB pixels
//! - [`Baker`] - parallel `N^3` sampling to `.cube` or CLF
//! - [`ColourBackend`] - the capability the engine talks to, with
//!   [`NativeBackend`] as the in-process implementation
//!
//! # Quick Start
//!
//! ```
//! use vpcal_ocio::{Transform, TransformDirection, Processor};
//! use vpcal_ocio::builtin::names;
//!
//! let group = Transform::group(vec![
//!     Transform::builtin(names::ACESCG_TO_ACES2065_1, TransformDirection::Forward),
//!     Transform::builtin(names::ACESCG_TO_ACES2065_1, TransformDirection::Inverse),
//! ]);
//! let proc = Processor::from_transform(&group, TransformDirection::Forward).unwrap();
//!
//! let mut pixels = [[0.18_f32, 0.18, 0.18]];
//! proc.apply_rgb(&mut pixels);
//! assert!((pixels[0][0] - 0.18).abs() < 1e-5);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod backend;
mod baker;
mod config;
mod error;
mod processor;
mod transform;
pub mod builtin;
pub mod fixed_function;

pub use backend::{BackendDescription, BakeRequest, ColourBackend, DisplayDescription, NativeBackend};
pub use baker::{BakeFormat, Baker, MAX_CUBE_SIZE};
pub use config::{ColorSpace, Config, ConfigVersion, Display, View, MIN_CONFIG_VERSION};
pub use error::{OcioError, OcioResult};
pub use processor::{Processor, ProcessorOp};
pub use transform::{
    BuiltinTransform, FileTransform, FixedFunctionStyle, FixedFunctionTransform, GroupTransform,
    MatrixTransform, Transform, TransformDirection,
};
