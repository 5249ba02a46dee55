//! # vpcal-math
//!
//! Numeric building blocks for LED wall calibration:
//!
//! - [`pq`] - SMPTE ST 2084 in absolute nits and in working units (1.0 = 100 nits)
//! - [`interp`] - clamped piecewise-linear resampling
//! - [`matrix`] - row-major 3x3/4x4 helpers over [`glam`]
//!
//! All computation is `f64`; pixel paths convert at their boundary.

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod interp;
pub mod matrix;
pub mod pq;

pub use interp::{clamp, interp, is_non_decreasing, lerp, linspace, resample};
pub use matrix::{embed_3x3, IDENTITY_3X3, IDENTITY_4X4};
