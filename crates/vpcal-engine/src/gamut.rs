//! Gamut compression stage.
//!
//! Out-of-gamut colours are pulled in with the ACES 1.3 reference gamut
//! compressor, run in ACEScg. The per-hue distance limits come from the
//! measured max distances of the wall.

use vpcal_ocio::builtin::names;
use vpcal_ocio::{FixedFunctionStyle, GroupTransform, Transform, TransformDirection};

/// Smallest accepted distance limit.
pub const GAMUT_COMPRESSION_LIMIT_MIN: f64 = 1.0001;
/// Largest accepted distance limit.
pub const GAMUT_COMPRESSION_LIMIT_MAX: f64 = 1.3;
/// Compression threshold for every hue.
pub const GAMUT_COMPRESSION_THRESHOLD: f64 = 0.9;
/// Compression curve power.
pub const GAMUT_COMPRESSION_POWER: f64 = 4.0;

// NaN takes the weakest limit; infinities clamp like any other distance
fn clamp_limit(distance: f64) -> f64 {
    if distance.is_nan() {
        return GAMUT_COMPRESSION_LIMIT_MIN;
    }
    distance.clamp(GAMUT_COMPRESSION_LIMIT_MIN, GAMUT_COMPRESSION_LIMIT_MAX)
}

/// Compressor parameters for the cyan, magenta and yellow max distances:
/// three limits, three thresholds, power.
pub fn gamut_compression_params(max_distances: [f64; 3]) -> [f64; 7] {
    let [c, m, y] = max_distances.map(clamp_limit);
    let t = GAMUT_COMPRESSION_THRESHOLD;
    [c, m, y, t, t, t, GAMUT_COMPRESSION_POWER]
}

/// ACEScg to AP0, compress, back to ACEScg.
pub fn gamut_compression_group(max_distances: [f64; 3]) -> GroupTransform {
    GroupTransform::new(vec![
        Transform::builtin(names::ACESCG_TO_ACES2065_1, TransformDirection::Forward),
        Transform::fixed_function(
            FixedFunctionStyle::AcesGamutComp13,
            gamut_compression_params(max_distances).to_vec(),
        ),
        Transform::builtin(names::ACESCG_TO_ACES2065_1, TransformDirection::Inverse),
    ])
}
