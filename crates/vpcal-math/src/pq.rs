//! SMPTE ST 2084 Perceptual Quantizer (PQ).
//!
//! Two scalings are provided:
//!
//! - absolute: [`eotf`] / [`oetf`] work in cd/m2, 0 to 10000 nits;
//! - working: [`decode`] / [`encode`] work in linear units where
//!   1.0 = 100 nits, so the PQ peak of 10000 nits is 100.0.
//!
//! The working scaling is the one the calibration pipeline and the
//! `CURVE - ST-2084_to_LINEAR` builtin use. Negative inputs are mirrored
//! around zero.
//!
//! # Usage
//!
//! ```rust
//! use vpcal_math::pq;
//!
//! let signal = pq::encode(1.0); // 100 nits
//! assert!((signal - 0.508).abs() < 0.001);
//! assert!((pq::decode(signal) - 1.0).abs() < 1e-9);
//! ```

/// Peak luminance representable by PQ, in nits.
pub const PQ_MAX_NITS: f64 = 10000.0;

/// Nits per working linear unit.
pub const NITS_PER_UNIT: f64 = 100.0;

const M1: f64 = 2610.0 / 16384.0;
const M2: f64 = 2523.0 / 4096.0 * 128.0;
const C1: f64 = 3424.0 / 4096.0;
const C2: f64 = 2413.0 / 4096.0 * 32.0;
const C3: f64 = 2392.0 / 4096.0 * 32.0;

/// Decodes a PQ signal to absolute luminance in nits.
#[inline]
pub fn eotf(v: f64) -> f64 {
    let vp = v.abs().powf(1.0 / M2);
    let num = (vp - C1).max(0.0);
    let den = C2 - C3 * vp;
    (PQ_MAX_NITS * (num / den).powf(1.0 / M1)).copysign(v)
}

/// Encodes absolute luminance in nits to a PQ signal.
#[inline]
pub fn oetf(nits: f64) -> f64 {
    if nits == 0.0 {
        return 0.0;
    }
    let y = (nits.abs() / PQ_MAX_NITS).powf(M1);
    ((C1 + C2 * y) / (1.0 + C3 * y)).powf(M2).copysign(nits)
}

/// PQ signal to working linear (1.0 = 100 nits).
#[inline]
pub fn decode(v: f64) -> f64 {
    eotf(v) / NITS_PER_UNIT
}

/// Working linear (1.0 = 100 nits) to PQ signal.
#[inline]
pub fn encode(lin: f64) -> f64 {
    oetf(lin * NITS_PER_UNIT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn end_points() {
        assert_eq!(eotf(0.0), 0.0);
        assert_relative_eq!(eotf(1.0), PQ_MAX_NITS, max_relative = 1e-9);
        assert_relative_eq!(decode(1.0), 100.0, max_relative = 1e-9);
        assert_relative_eq!(oetf(PQ_MAX_NITS), 1.0, max_relative = 1e-12);
    }

    #[test]
    fn reference_white() {
        assert_relative_eq!(oetf(100.0), 0.508_078, epsilon = 1e-5);
    }

    #[test]
    fn round_trip() {
        for &nits in &[0.005, 0.1, 1.0, 48.0, 100.0, 1000.0, 4000.0, 10000.0] {
            assert_relative_eq!(eotf(oetf(nits)), nits, max_relative = 1e-9);
        }
        for i in 0..=20 {
            let v = i as f64 / 20.0;
            assert_relative_eq!(encode(decode(v)), v, epsilon = 1e-12);
        }
    }

    #[test]
    fn negative_mirrors() {
        assert_relative_eq!(encode(-1.0), -encode(1.0));
        assert_relative_eq!(decode(-0.5), -decode(0.5));
    }
}
