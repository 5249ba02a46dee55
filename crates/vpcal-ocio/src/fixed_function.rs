//! ACES 1.3 parametric gamut compression.
//!
//! Distances from the achromatic axis beyond a per-channel threshold are
//! compressed so that the distance `limit` lands on the gamut boundary
//! (distance 1.0). Parameters follow the OCIO `ACES_GamutComp13` layout:
//! `[lim_cyan, lim_magenta, lim_yellow, thr_cyan, thr_magenta, thr_yellow, power]`.
//!
//! Like OCIO, the operator takes ACES2065-1 (AP0) input and compresses in
//! ACEScg (AP1), converting back to AP0 on output.

use vpcal_math::matrix::apply_4x4;

use crate::builtin::{AP0_TO_AP1, AP1_TO_AP0};
use crate::error::{invalid_transform, OcioResult};

/// Parameters for ACES gamut compression 1.3.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GamutComp13Params {
    /// Compression limits (cyan, magenta, yellow).
    pub limits: [f64; 3],
    /// Thresholds (cyan, magenta, yellow).
    pub thresholds: [f64; 3],
    /// Power of the compression curve.
    pub power: f64,
    scales: [f64; 3],
}

impl GamutComp13Params {
    /// Validates parameters and precomputes the curve scales.
    pub fn new(limits: [f64; 3], thresholds: [f64; 3], power: f64) -> OcioResult<Self> {
        if !(power.is_finite() && power >= 1.0) {
            return Err(invalid_transform(format!(
                "gamut compression power must be >= 1, got {power}"
            )));
        }
        let mut scales = [0.0; 3];
        for c in 0..3 {
            let (lim, thr) = (limits[c], thresholds[c]);
            if !(lim.is_finite() && lim > 1.0) {
                return Err(invalid_transform(format!(
                    "gamut compression limit must be > 1, got {lim}"
                )));
            }
            if !(thr.is_finite() && (0.0..1.0).contains(&thr)) {
                return Err(invalid_transform(format!(
                    "gamut compression threshold must be in [0, 1), got {thr}"
                )));
            }
            // scale puts the compressed limit at distance 1.0
            let num = lim - thr;
            let inner = ((1.0 - thr) / num).powf(-power) - 1.0;
            scales[c] = num / inner.powf(1.0 / power);
        }
        Ok(Self {
            limits,
            thresholds,
            power,
            scales,
        })
    }

    /// Builds parameters from the 7-value OCIO list.
    pub fn from_slice(params: &[f64]) -> OcioResult<Self> {
        match params {
            [lc, lm, ly, tc, tm, ty, power] => Self::new([*lc, *lm, *ly], [*tc, *tm, *ty], *power),
            _ => Err(invalid_transform(format!(
                "ACES_GamutComp13 takes 7 parameters, got {}",
                params.len()
            ))),
        }
    }

    /// Precomputed curve scales.
    pub fn scales(&self) -> [f64; 3] {
        self.scales
    }
}

#[inline]
fn compress(dist: f64, thr: f64, scale: f64, power: f64) -> f64 {
    if dist < thr {
        return dist;
    }
    let nd = (dist - thr) / scale;
    let p = nd.powf(power);
    thr + scale * nd / (1.0 + p).powf(1.0 / power)
}

#[inline]
fn uncompress(dist: f64, thr: f64, scale: f64, power: f64) -> f64 {
    // past the asymptote there is no preimage
    if dist < thr || dist >= thr + scale {
        return dist;
    }
    let nd = (dist - thr) / scale;
    let p = nd.powf(power);
    thr + scale * (-(p / (p - 1.0))).powf(1.0 / power)
}

fn apply(rgb: [f64; 3], params: &GamutComp13Params, f: fn(f64, f64, f64, f64) -> f64) -> [f64; 3] {
    let ach = rgb[0].max(rgb[1]).max(rgb[2]);
    if ach == 0.0 {
        return [0.0; 3];
    }
    let abs_ach = ach.abs();
    let mut out = [0.0; 3];
    for c in 0..3 {
        let dist = (ach - rgb[c]) / abs_ach;
        let cdist = f(dist, params.thresholds[c], params.scales[c], params.power);
        out[c] = ach - cdist * abs_ach;
    }
    out
}

fn in_ap1(rgb: [f64; 3], params: &GamutComp13Params, f: fn(f64, f64, f64, f64) -> f64) -> [f64; 3] {
    const ZERO: [f64; 4] = [0.0; 4];
    let ap1 = apply_4x4(&AP0_TO_AP1, &ZERO, rgb);
    apply_4x4(&AP1_TO_AP0, &ZERO, apply(ap1, params, f))
}

/// Forward gamut compression of an AP0 pixel.
pub fn gamut_comp_13_fwd(rgb: [f64; 3], params: &GamutComp13Params) -> [f64; 3] {
    in_ap1(rgb, params, compress)
}

/// Inverse gamut compression of an AP0 pixel.
pub fn gamut_comp_13_inv(rgb: [f64; 3], params: &GamutComp13Params) -> [f64; 3] {
    in_ap1(rgb, params, uncompress)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn params() -> GamutComp13Params {
        GamutComp13Params::from_slice(&[1.2, 1.1, 1.05, 0.9, 0.9, 0.9, 4.0]).unwrap()
    }

    #[test]
    fn inside_threshold_is_untouched() {
        let rgb = [0.5, 0.45, 0.48];
        assert_eq!(apply(rgb, &params(), compress), rgb);
    }

    #[test]
    fn limit_maps_to_boundary() {
        let p = params();
        // red distance equals the cyan limit
        let rgb = [1.0 - 1.2, 1.0, 0.5];
        let out = apply(rgb, &p, compress);
        assert_relative_eq!(out[0], 0.0, epsilon = 1e-9);
        assert_relative_eq!(out[1], 1.0);
    }

    #[test]
    fn inverse_round_trips() {
        let p = params();
        let rgb = [-0.1, 0.8, 0.3];
        let back = gamut_comp_13_inv(gamut_comp_13_fwd(rgb, &p), &p);
        for c in 0..3 {
            assert_relative_eq!(back[c], rgb[c], epsilon = 1e-9);
        }
    }

    #[test]
    fn rejects_bad_params() {
        assert!(GamutComp13Params::from_slice(&[1.2, 1.2, 1.2]).is_err());
        assert!(GamutComp13Params::from_slice(&[1.0, 1.2, 1.2, 0.9, 0.9, 0.9, 4.0]).is_err());
        assert!(GamutComp13Params::from_slice(&[1.2, 1.2, 1.2, 1.0, 0.9, 0.9, 4.0]).is_err());
        assert!(GamutComp13Params::from_slice(&[1.2, 1.2, 1.2, 0.9, 0.9, 0.9, 0.5]).is_err());
    }

    #[test]
    fn black_stays_black() {
        assert_eq!(apply([0.0, -0.2, -0.1], &params(), compress), [0.0; 3]);
    }

    #[test]
    fn compresses_in_ap1() {
        let p = GamutComp13Params::from_slice(&[1.2, 1.2, 1.2, 0.9, 0.9, 0.9, 4.0]).unwrap();
        // out of AP1 but inside AP0
        let ap1 = [-0.1, 0.8, 0.3];
        let ap0 = apply_4x4(&AP1_TO_AP0, &[0.0; 4], ap1);
        let out = apply_4x4(&AP0_TO_AP1, &[0.0; 4], gamut_comp_13_fwd(ap0, &p));
        assert!(out[0] > -0.01, "red not pulled in: {out:?}");
        assert_relative_eq!(out[1], 0.8, epsilon = 1e-6);
        assert_relative_eq!(out[0], apply(ap1, &p, compress)[0], epsilon = 1e-6);
    }
}
