//! Transform processor.
//!
//! Compiles a transform tree into a flat list of [`ProcessorOp`]s and
//! applies them to RGB pixels. Groups are flattened, directions resolved
//! and LUT files loaded at compile time, so applying never fails.
//!
//! # Example
//!
//! ```rust
//! use vpcal_ocio::{Processor, Transform, TransformDirection};
//! use vpcal_ocio::builtin::names;
//!
//! let t = Transform::group(vec![
//!     Transform::builtin(names::LINEAR_TO_ST2084, TransformDirection::Forward),
//!     Transform::builtin(names::ST2084_TO_LINEAR, TransformDirection::Forward),
//! ]);
//! let proc = Processor::from_transform(&t, TransformDirection::Forward).unwrap();
//!
//! let mut pixels = [[0.18_f32, 1.0, 10.0]];
//! proc.apply_rgb(&mut pixels);
//! assert!((pixels[0][2] - 10.0).abs() < 1e-3);
//! ```

use std::path::{Path, PathBuf};

use tracing::debug;
use vpcal_lut::{clf, cube, Lut1D, Lut3D, ProcessNode};
use vpcal_math::{matrix, pq};

use crate::builtin::{get_builtin, BuiltinDef};
use crate::config::Config;
use crate::error::{invalid_transform, OcioError, OcioResult};
use crate::fixed_function::{gamut_comp_13_fwd, gamut_comp_13_inv, GamutComp13Params};
use crate::transform::{FileTransform, FixedFunctionStyle, Transform, TransformDirection};

/// A compiled processing step.
#[derive(Debug, Clone)]
pub enum ProcessorOp {
    /// Row-major 4x4 matrix + offset.
    Matrix {
        /// Matrix.
        matrix: [f64; 16],
        /// Offset added after the multiply.
        offset: [f64; 4],
    },
    /// Linear (1.0 = 100 nits) to PQ.
    LinearToPq,
    /// PQ to linear (1.0 = 100 nits).
    PqToLinear,
    /// ACES gamut compression 1.3.
    GamutComp13 {
        /// Curve parameters.
        params: GamutComp13Params,
        /// Compress (true) or uncompress (false).
        forward: bool,
    },
    /// Per-channel 1D LUT.
    Lut1D {
        /// Table.
        lut: Lut1D,
        /// Apply the numeric inverse.
        inverse: bool,
    },
    /// 3D LUT (forward only).
    Lut3D {
        /// Cube.
        lut: Lut3D,
    },
}

impl ProcessorOp {
    #[inline]
    fn apply(&self, rgb: [f32; 3]) -> [f32; 3] {
        match self {
            Self::Matrix { matrix, offset } => {
                to_f32(matrix::apply_4x4(matrix, offset, to_f64(rgb)))
            }
            Self::LinearToPq => rgb.map(|v| pq::encode(f64::from(v)) as f32),
            Self::PqToLinear => rgb.map(|v| pq::decode(f64::from(v)) as f32),
            Self::GamutComp13 { params, forward } => {
                let v = to_f64(rgb);
                to_f32(if *forward {
                    gamut_comp_13_fwd(v, params)
                } else {
                    gamut_comp_13_inv(v, params)
                })
            }
            Self::Lut1D { lut, inverse } => {
                if *inverse {
                    lut.apply_inverse_rgb(rgb)
                } else {
                    lut.apply_rgb(rgb)
                }
            }
            Self::Lut3D { lut } => lut.apply(rgb),
        }
    }
}

#[inline]
fn to_f64(v: [f32; 3]) -> [f64; 3] {
    v.map(f64::from)
}

#[inline]
fn to_f32(v: [f64; 3]) -> [f32; 3] {
    v.map(|x| x as f32)
}

/// Compiled transform pipeline.
#[derive(Debug, Clone, Default)]
pub struct Processor {
    ops: Vec<ProcessorOp>,
}

impl Processor {
    /// Compiles a transform. File references resolve as plain paths.
    pub fn from_transform(transform: &Transform, direction: TransformDirection) -> OcioResult<Self> {
        let mut processor = Self::default();
        processor.compile(transform, direction, &|src| {
            let p = PathBuf::from(src);
            p.exists().then_some(p)
        })?;
        Ok(processor)
    }

    /// Compiles a transform, resolving file references through the
    /// config's working directory and search paths.
    pub fn from_transform_in(
        config: &Config,
        transform: &Transform,
        direction: TransformDirection,
    ) -> OcioResult<Self> {
        let mut processor = Self::default();
        processor.compile(transform, direction, &|src| config.resolve_file(src))?;
        Ok(processor)
    }

    /// Compiled operations.
    pub fn ops(&self) -> &[ProcessorOp] {
        &self.ops
    }

    /// Number of compiled operations.
    pub fn num_ops(&self) -> usize {
        self.ops.len()
    }

    /// True if the processor does nothing.
    pub fn is_identity(&self) -> bool {
        self.ops.is_empty()
    }

    fn compile(
        &mut self,
        transform: &Transform,
        direction: TransformDirection,
        resolve: &dyn Fn(&str) -> Option<PathBuf>,
    ) -> OcioResult<()> {
        let dir = transform.direction().combine(direction);
        let forward = dir.is_forward();

        match transform {
            Transform::Group(group) => {
                if forward {
                    for child in &group.children {
                        self.compile(child, TransformDirection::Forward, resolve)?;
                    }
                } else {
                    for child in group.children.iter().rev() {
                        self.compile(child, TransformDirection::Inverse, resolve)?;
                    }
                }
            }

            Transform::Matrix(m) => {
                if forward {
                    self.ops.push(ProcessorOp::Matrix {
                        matrix: m.matrix,
                        offset: m.offset,
                    });
                } else {
                    let inv = matrix::invert_4x4(&m.matrix).ok_or_else(|| {
                        invalid_transform("cannot invert singular matrix (determinant near zero)")
                    })?;
                    // inverse offset: -inv(M) * offset
                    let o = matrix::apply_4x4(&inv, &[0.0; 4], [m.offset[0], m.offset[1], m.offset[2]]);
                    self.ops.push(ProcessorOp::Matrix {
                        matrix: inv,
                        offset: [-o[0], -o[1], -o[2], 0.0],
                    });
                }
            }

            Transform::Builtin(b) => {
                let def = get_builtin(&b.style).ok_or_else(|| OcioError::UnknownBuiltin {
                    style: b.style.clone(),
                })?;
                let def = if forward {
                    def
                } else {
                    def.inverse().ok_or_else(|| {
                        invalid_transform(format!("builtin '{}' is not invertible", b.style))
                    })?
                };
                match def {
                    BuiltinDef::Identity => {}
                    BuiltinDef::Matrix(matrix) => self.ops.push(ProcessorOp::Matrix {
                        matrix,
                        offset: [0.0; 4],
                    }),
                    BuiltinDef::LinearToPq => self.ops.push(ProcessorOp::LinearToPq),
                    BuiltinDef::PqToLinear => self.ops.push(ProcessorOp::PqToLinear),
                }
            }

            Transform::FixedFunction(ff) => match ff.style {
                FixedFunctionStyle::AcesGamutComp13 => {
                    let params = GamutComp13Params::from_slice(&ff.params)?;
                    self.ops.push(ProcessorOp::GamutComp13 { params, forward });
                }
            },

            Transform::File(file) => self.compile_file(file, forward, resolve)?,
        }
        Ok(())
    }

    fn compile_file(
        &mut self,
        file: &FileTransform,
        forward: bool,
        resolve: &dyn Fn(&str) -> Option<PathBuf>,
    ) -> OcioResult<()> {
        let path = resolve(&file.src).ok_or_else(|| OcioError::TransformFileNotFound {
            path: PathBuf::from(&file.src),
        })?;
        debug!(path = %path.display(), forward, "loading LUT file");

        match extension(&path).as_deref() {
            Some("clf") => {
                let pl = clf::read_clf(&path)?;
                let mut ops: Vec<ProcessorOp> = Vec::with_capacity(pl.nodes.len());
                for node in pl.nodes {
                    ops.push(match node {
                        ProcessNode::Lut1D(lut) => ProcessorOp::Lut1D {
                            lut,
                            inverse: !forward,
                        },
                        ProcessNode::Lut3D(lut) if forward => ProcessorOp::Lut3D { lut },
                        ProcessNode::Lut3D(_) => {
                            return Err(invalid_transform(format!(
                                "inverse of LUT3D in '{}' is not supported",
                                path.display()
                            )));
                        }
                    });
                }
                if !forward {
                    ops.reverse();
                }
                self.ops.extend(ops);
            }
            Some("cube") => {
                if !forward {
                    return Err(invalid_transform(format!(
                        "inverse of 3D LUT '{}' is not supported",
                        path.display()
                    )));
                }
                let lut = cube::read_3d(&path)?;
                self.ops.push(ProcessorOp::Lut3D { lut });
            }
            _ => {
                return Err(invalid_transform(format!(
                    "unsupported LUT format: {}",
                    path.display()
                )));
            }
        }
        Ok(())
    }

    /// Applies the pipeline to a single pixel.
    #[inline]
    pub fn apply_pixel(&self, rgb: [f32; 3]) -> [f32; 3] {
        self.ops.iter().fold(rgb, |acc, op| op.apply(acc))
    }

    /// Applies the pipeline to RGB pixels in place.
    pub fn apply_rgb(&self, pixels: &mut [[f32; 3]]) {
        for pixel in pixels.iter_mut() {
            *pixel = self.apply_pixel(*pixel);
        }
    }
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}
