//! 3D LUT baking.
//!
//! Samples a [`Processor`] on an `N^3` grid over `[0, 1]^3` and writes the
//! result for tools that can't run the pipeline themselves.
//!
//! # Example
//!
//! ```ignore
//! use vpcal_ocio::{Baker, BakeFormat, Config};
//!
//! let config = Config::from_file("config.ocio")?;
//! let processor = config.display_processor("ACEScg", "LED Wall", "Calibrated")?;
//! Baker::new(&processor).write("wall.cube", 33, BakeFormat::ResolveCube)?;
//! ```

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use rayon::prelude::*;
use tracing::info;
use vpcal_lut::{clf, cube, Lut3D, ProcessNode};

use crate::error::{OcioError, OcioResult};
use crate::processor::Processor;

/// Largest accepted cube edge length.
pub const MAX_CUBE_SIZE: usize = 256;

/// Rejects cube edge lengths outside `2..=MAX_CUBE_SIZE`.
pub(crate) fn check_cube_size(size: usize) -> OcioResult<()> {
    if !(2..=MAX_CUBE_SIZE).contains(&size) {
        return Err(OcioError::Validation(format!(
            "cube size must be between 2 and {MAX_CUBE_SIZE}, got {size}"
        )));
    }
    Ok(())
}

/// Output format for baked cubes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BakeFormat {
    /// Resolve `.cube`.
    #[default]
    ResolveCube,
    /// Academy CLF with a single `LUT3D` node.
    Clf,
}

impl BakeFormat {
    /// Format identifier (`resolve_cube`, `clf`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ResolveCube => "resolve_cube",
            Self::Clf => "clf",
        }
    }

    /// Conventional file extension.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::ResolveCube => "cube",
            Self::Clf => "clf",
        }
    }
}

impl fmt::Display for BakeFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BakeFormat {
    type Err = OcioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "resolve_cube" | "cube" => Ok(Self::ResolveCube),
            "clf" => Ok(Self::Clf),
            other => Err(OcioError::Validation(format!(
                "unknown LUT format '{other}' (expected resolve_cube or clf)"
            ))),
        }
    }
}

/// LUT baker for a compiled processor.
#[derive(Debug)]
pub struct Baker<'a> {
    processor: &'a Processor,
}

impl<'a> Baker<'a> {
    /// Creates a baker for the given processor.
    pub fn new(processor: &'a Processor) -> Self {
        Self { processor }
    }

    /// Bakes a cube of edge length `size`.
    ///
    /// Blue slices are evaluated in parallel.
    pub fn bake_3d(&self, size: usize) -> OcioResult<Lut3D> {
        check_cube_size(size)?;
        let step = 1.0 / (size - 1) as f32;
        let mut data = vec![[0.0_f32; 3]; size * size * size];

        data.par_chunks_mut(size * size)
            .enumerate()
            .for_each(|(b, slice)| {
                for g in 0..size {
                    for r in 0..size {
                        let rgb = [r as f32 * step, g as f32 * step, b as f32 * step];
                        slice[g * size + r] = self.processor.apply_pixel(rgb);
                    }
                }
            });

        Ok(Lut3D::from_data(data, size)?)
    }

    /// Bakes and writes a cube in `format`.
    pub fn write(&self, path: impl AsRef<Path>, size: usize, format: BakeFormat) -> OcioResult<Lut3D> {
        let path = path.as_ref();
        let lut = self.bake_3d(size)?;
        let title = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        match format {
            BakeFormat::ResolveCube => cube::write_3d(path, &lut, Some(&title))?,
            BakeFormat::Clf => {
                let mut pl = clf::ProcessList::new(title.as_str())
                    .with_description(format!("Baked {size}^3 cube"));
                pl.nodes.push(ProcessNode::Lut3D(lut.clone()));
                clf::write_clf(path, &pl)?;
            }
        }
        info!(path = %path.display(), size, %format, "baked 3D LUT");
        Ok(lut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Transform, TransformDirection};
    use approx::assert_relative_eq;

    fn halve() -> Processor {
        let t = Transform::matrix(vpcal_math::embed_3x3(&[
            [0.5, 0.0, 0.0],
            [0.0, 0.5, 0.0],
            [0.0, 0.0, 0.5],
        ]));
        Processor::from_transform(&t, TransformDirection::Forward).unwrap()
    }

    #[test]
    fn bake_samples_grid() {
        let p = halve();
        let lut = Baker::new(&p).bake_3d(5).unwrap();
        assert_eq!(lut.data.len(), 125);
        assert_eq!(lut.get(4, 0, 0), [0.5, 0.0, 0.0]);
        assert_eq!(lut.get(0, 2, 4), [0.0, 0.25, 0.5]);
    }

    #[test]
    fn identity_processor_bakes_identity() {
        let p = Processor::default();
        let lut = Baker::new(&p).bake_3d(9).unwrap();
        assert_eq!(lut, Lut3D::identity(9).unwrap());
    }

    #[test]
    fn size_out_of_range() {
        let p = halve();
        for size in [0, 1, MAX_CUBE_SIZE + 1, usize::MAX] {
            assert!(
                matches!(Baker::new(&p).bake_3d(size), Err(OcioError::Validation(_))),
                "size {size}"
            );
        }
    }

    #[test]
    fn writes_both_formats() {
        let dir = tempfile::tempdir().unwrap();
        let p = halve();
        let baker = Baker::new(&p);

        let cube_path = dir.path().join("wall.cube");
        baker.write(&cube_path, 3, BakeFormat::ResolveCube).unwrap();
        let back = cube::read_3d(&cube_path).unwrap();
        assert_relative_eq!(back.apply([1.0, 1.0, 1.0])[1], 0.5, epsilon = 1e-6);

        let clf_path = dir.path().join("wall.clf");
        baker.write(&clf_path, 3, BakeFormat::Clf).unwrap();
        let pl = clf::read_clf(&clf_path).unwrap();
        assert_eq!(pl.id, "wall");
        assert!(matches!(pl.nodes[0], ProcessNode::Lut3D(_)));
    }

    #[test]
    fn format_tokens() {
        assert_eq!("resolve_cube".parse::<BakeFormat>().unwrap(), BakeFormat::ResolveCube);
        assert_eq!("clf".parse::<BakeFormat>().unwrap().extension(), "clf");
        assert!("csp".parse::<BakeFormat>().is_err());
    }
}
