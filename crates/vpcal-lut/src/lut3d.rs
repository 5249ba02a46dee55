//! 3-dimensional lookup table.
//!
//! Baked display pipelines are stored as cubes and written out as Resolve
//! `.cube` or CLF `LUT3D` nodes.

use crate::{LutError, LutResult};

/// A 3-dimensional lookup table.
///
/// # Structure
///
/// - `size^3` RGB entries
/// - stored with R varying fastest, then G, then B (the `.cube` order)
/// - trilinear interpolation, inputs clamped to the domain
///
/// # Example
///
/// ```rust
/// use vpcal_lut::Lut3D;
///
/// let lut = Lut3D::identity(17).unwrap();
/// let out = lut.apply([0.5, 0.25, 1.0]);
/// assert!((out[1] - 0.25).abs() < 1e-6);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Lut3D {
    /// Flattened cube entries, R fastest.
    pub data: Vec<[f32; 3]>,
    /// Cube edge length.
    pub size: usize,
    /// Input domain minimum per channel.
    pub domain_min: [f32; 3],
    /// Input domain maximum per channel.
    pub domain_max: [f32; 3],
}

impl Lut3D {
    /// Creates an identity cube.
    pub fn identity(size: usize) -> LutResult<Self> {
        Self::from_fn(size, |rgb| rgb)
    }

    /// Builds a cube by evaluating `f` at every grid point over `[0, 1]^3`.
    pub fn from_fn(size: usize, f: impl Fn([f32; 3]) -> [f32; 3]) -> LutResult<Self> {
        check_size(size)?;
        let step = 1.0 / (size - 1) as f32;
        let mut data = Vec::with_capacity(size * size * size);
        for b in 0..size {
            for g in 0..size {
                for r in 0..size {
                    data.push(f([r as f32 * step, g as f32 * step, b as f32 * step]));
                }
            }
        }
        Self::from_data(data, size)
    }

    /// Creates a cube from entries in R-fastest order.
    pub fn from_data(data: Vec<[f32; 3]>, size: usize) -> LutResult<Self> {
        check_size(size)?;
        let expected = size * size * size;
        if data.len() != expected {
            return Err(LutError::InvalidSize(format!(
                "expected {} entries for size {}, got {}",
                expected,
                size,
                data.len()
            )));
        }
        Ok(Self {
            data,
            size,
            domain_min: [0.0; 3],
            domain_max: [1.0; 3],
        })
    }

    /// Sets the input domain.
    pub fn with_domain(mut self, min: [f32; 3], max: [f32; 3]) -> Self {
        self.domain_min = min;
        self.domain_max = max;
        self
    }

    /// Flat index of grid point `(r, g, b)`.
    #[inline]
    pub fn index(&self, r: usize, g: usize, b: usize) -> usize {
        (b * self.size + g) * self.size + r
    }

    /// Entry at grid point `(r, g, b)`.
    #[inline]
    pub fn get(&self, r: usize, g: usize, b: usize) -> [f32; 3] {
        self.data[self.index(r, g, b)]
    }

    /// Applies the cube with trilinear interpolation.
    pub fn apply(&self, rgb: [f32; 3]) -> [f32; 3] {
        let n = (self.size - 1) as f32;
        let mut cell = [0usize; 3];
        let mut frac = [0f32; 3];
        for c in 0..3 {
            let span = self.domain_max[c] - self.domain_min[c];
            let t = if span.abs() < 1e-10 {
                0.0
            } else {
                ((rgb[c] - self.domain_min[c]) / span).clamp(0.0, 1.0)
            };
            let pos = t * n;
            cell[c] = (pos.floor() as usize).min(self.size - 2);
            frac[c] = pos - cell[c] as f32;
        }
        let [ri, gi, bi] = cell;
        let [rf, gf, bf] = frac;

        let c000 = self.get(ri, gi, bi);
        let c100 = self.get(ri + 1, gi, bi);
        let c010 = self.get(ri, gi + 1, bi);
        let c110 = self.get(ri + 1, gi + 1, bi);
        let c001 = self.get(ri, gi, bi + 1);
        let c101 = self.get(ri + 1, gi, bi + 1);
        let c011 = self.get(ri, gi + 1, bi + 1);
        let c111 = self.get(ri + 1, gi + 1, bi + 1);

        let mut out = [0.0f32; 3];
        for i in 0..3 {
            let c00 = c000[i] * (1.0 - rf) + c100[i] * rf;
            let c01 = c001[i] * (1.0 - rf) + c101[i] * rf;
            let c10 = c010[i] * (1.0 - rf) + c110[i] * rf;
            let c11 = c011[i] * (1.0 - rf) + c111[i] * rf;
            let c0 = c00 * (1.0 - gf) + c10 * gf;
            let c1 = c01 * (1.0 - gf) + c11 * gf;
            out[i] = c0 * (1.0 - bf) + c1 * bf;
        }
        out
    }
}

fn check_size(size: usize) -> LutResult<()> {
    if size < 2 {
        return Err(LutError::InvalidSize(format!(
            "cube size must be at least 2, got {size}"
        )));
    }
    Ok(())
}
