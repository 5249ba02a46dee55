//! # vpcal-lut
//!
//! Lookup tables for LED wall calibration.
//!
//! - [`Lut1D`] - per-channel curves with numeric inversion
//! - [`Lut3D`] - RGB cubes with trilinear lookup
//!
//! # Supported Formats
//!
//! - `.clf` - Academy Common LUT Format, `LUT1D`/`LUT3D` nodes ([`clf`])
//! - `.cube` - Resolve 3D LUT ([`cube`])
//!
//! # Usage
//!
//! ```rust
//! use vpcal_lut::{Lut1D, Lut3D};
//!
//! let curve = Lut1D::identity(1024).unwrap();
//! let rgb = curve.apply_rgb([0.5, 0.3, 0.2]);
//!
//! let cube = Lut3D::identity(33).unwrap();
//! let rgb = cube.apply(rgb);
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod error;
mod lut1d;
mod lut3d;
pub mod clf;
pub mod cube;

pub use clf::{read_clf, write_clf, ProcessList, ProcessNode};
pub use cube::{read_3d as read_cube_3d, write_3d as write_cube_3d};
pub use error::{LutError, LutResult};
pub use lut1d::Lut1D;
pub use lut3d::Lut3D;
