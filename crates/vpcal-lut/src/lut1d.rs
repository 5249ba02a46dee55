//! 1-dimensional lookup table.
//!
//! A 1D LUT applies an independent curve to each colour channel. The
//! calibration pipeline stores the per-channel EOTF correction this way
//! and applies it in the inverse direction, so numeric inversion is a
//! first-class operation here.

use crate::{LutError, LutResult};

/// A 1-dimensional lookup table.
///
/// # Structure
///
/// - `size` entries per channel
/// - 1 or 3 channels (mono or RGB)
/// - entries sit at evenly spaced inputs over `[domain_min, domain_max]`
/// - linear interpolation between entries, clamped outside the domain
///
/// # Example
///
/// ```rust
/// use vpcal_lut::Lut1D;
///
/// let lut = Lut1D::from_rgb(
///     vec![0.0, 0.25, 1.0],
///     vec![0.0, 0.5, 1.0],
///     vec![0.0, 0.75, 1.0],
///     0.0,
///     1.0,
/// )
/// .unwrap();
/// let out = lut.apply_rgb([0.5, 0.5, 0.5]);
/// assert_eq!(out, [0.25, 0.5, 0.75]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Lut1D {
    /// Red channel entries (or all channels if mono).
    pub r: Vec<f32>,
    /// Green channel entries (None if mono).
    pub g: Option<Vec<f32>>,
    /// Blue channel entries (None if mono).
    pub b: Option<Vec<f32>>,
    /// Input domain minimum.
    pub domain_min: f32,
    /// Input domain maximum.
    pub domain_max: f32,
}

impl Lut1D {
    /// Creates an identity (pass-through) LUT over `[0, 1]`.
    pub fn identity(size: usize) -> LutResult<Self> {
        if size < 2 {
            return Err(LutError::InvalidSize(format!(
                "need at least 2 entries, got {size}"
            )));
        }
        let entries: Vec<f32> = (0..size).map(|i| i as f32 / (size - 1) as f32).collect();
        Self::from_data(entries, 0.0, 1.0)
    }

    /// Creates a mono LUT.
    pub fn from_data(data: Vec<f32>, domain_min: f32, domain_max: f32) -> LutResult<Self> {
        if data.is_empty() {
            return Err(LutError::InvalidSize("LUT size must be > 0".into()));
        }
        Ok(Self {
            r: data,
            g: None,
            b: None,
            domain_min,
            domain_max,
        })
    }

    /// Creates a 3-channel LUT.
    pub fn from_rgb(
        r: Vec<f32>,
        g: Vec<f32>,
        b: Vec<f32>,
        domain_min: f32,
        domain_max: f32,
    ) -> LutResult<Self> {
        if r.is_empty() || g.is_empty() || b.is_empty() {
            return Err(LutError::InvalidSize("LUT size must be > 0".into()));
        }
        if r.len() != g.len() || r.len() != b.len() {
            return Err(LutError::InvalidSize(format!(
                "RGB channels must have same size (got {}, {}, {})",
                r.len(),
                g.len(),
                b.len()
            )));
        }
        Ok(Self {
            r,
            g: Some(g),
            b: Some(b),
            domain_min,
            domain_max,
        })
    }

    /// Number of entries per channel.
    #[inline]
    pub fn size(&self) -> usize {
        self.r.len()
    }

    /// True for a single-channel LUT.
    #[inline]
    pub fn is_mono(&self) -> bool {
        self.g.is_none()
    }

    /// Entries of channel `i` (0 = R, 1 = G, 2 = B). Mono LUTs return the
    /// shared curve for every channel.
    pub fn channel(&self, i: usize) -> &[f32] {
        match i {
            1 => self.g.as_deref().unwrap_or(&self.r),
            2 => self.b.as_deref().unwrap_or(&self.r),
            _ => &self.r,
        }
    }

    /// Applies the LUT to RGB values.
    pub fn apply_rgb(&self, rgb: [f32; 3]) -> [f32; 3] {
        [
            self.interpolate(self.channel(0), rgb[0]),
            self.interpolate(self.channel(1), rgb[1]),
            self.interpolate(self.channel(2), rgb[2]),
        ]
    }

    /// Applies the inverse of the LUT to RGB values.
    ///
    /// For each channel, finds the input whose output equals the given
    /// value, interpolating linearly between entries. Channels are assumed
    /// non-decreasing; values outside the output range clamp to the domain
    /// ends.
    pub fn apply_inverse_rgb(&self, rgb: [f32; 3]) -> [f32; 3] {
        [
            self.invert_value(self.channel(0), rgb[0]),
            self.invert_value(self.channel(1), rgb[1]),
            self.invert_value(self.channel(2), rgb[2]),
        ]
    }

    fn interpolate(&self, data: &[f32], value: f32) -> f32 {
        let size = data.len();
        if size == 0 {
            return value;
        }
        if size == 1 {
            return data[0];
        }

        let range = self.domain_max - self.domain_min;
        let t = if range.abs() < 1e-10 {
            0.0
        } else {
            ((value - self.domain_min) / range).clamp(0.0, 1.0)
        };

        let idx_f = t * (size - 1) as f32;
        let idx0 = (idx_f.floor() as usize).min(size - 1);
        let idx1 = (idx0 + 1).min(size - 1);
        let frac = idx_f - idx0 as f32;

        data[idx0] * (1.0 - frac) + data[idx1] * frac
    }

    fn invert_value(&self, data: &[f32], value: f32) -> f32 {
        let size = data.len();
        if size < 2 {
            return self.domain_min;
        }
        let last = size - 1;
        let to_domain =
            |pos: f32| self.domain_min + (self.domain_max - self.domain_min) * pos / last as f32;

        if value <= data[0] {
            return to_domain(0.0);
        }
        if value >= data[last] {
            return to_domain(last as f32);
        }
        // first entry strictly greater than value; in 1..=last here
        let hi = data.partition_point(|&v| v <= value).clamp(1, last);
        let lo = hi - 1;
        let span = data[hi] - data[lo];
        let frac = if span > 0.0 { (value - data[lo]) / span } else { 0.0 };
        to_domain(lo as f32 + frac)
    }
}
