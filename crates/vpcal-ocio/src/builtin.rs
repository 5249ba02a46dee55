//! Builtin transform definitions.
//!
//! Only the builtins a calibration pipeline emits are evaluated: the PQ
//! curves bracketing the EOTF correction LUT and the ACES AP0/AP1 primaries
//! conversions around gamut compression.

/// Builtin style names as they appear in configs.
pub mod names {
    /// Linear (1.0 = 100 nits) to ST 2084 code values.
    pub const LINEAR_TO_ST2084: &str = "CURVE - LINEAR_to_ST-2084";
    /// ST 2084 code values to linear (1.0 = 100 nits).
    pub const ST2084_TO_LINEAR: &str = "CURVE - ST-2084_to_LINEAR";
    /// ACEScg to ACES2065-1.
    pub const ACESCG_TO_ACES2065_1: &str = "ACEScg_to_ACES2065-1";
    /// ACES2065-1 to ACEScg.
    pub const ACES2065_1_TO_ACESCG: &str = "ACES2065-1_to_ACEScg";
    /// Identity.
    pub const IDENTITY: &str = "IDENTITY";
}

/// AP0 (ACES 2065-1) to AP1 (ACEScg), row-major.
pub const AP0_TO_AP1: [f64; 16] = [
    1.4514393161, -0.2365107469, -0.2149285693, 0.0,
    -0.0765537734, 1.1762296998, -0.0996759264, 0.0,
    0.0083161484, -0.0060324498, 0.9977163014, 0.0,
    0.0, 0.0, 0.0, 1.0,
];

/// AP1 (ACEScg) to AP0 (ACES 2065-1), row-major.
pub const AP1_TO_AP0: [f64; 16] = [
    0.6954522414, 0.1406786965, 0.1638690622, 0.0,
    0.0447945634, 0.8596711185, 0.0955343182, 0.0,
    -0.0055258826, 0.0040252103, 1.0015006723, 0.0,
    0.0, 0.0, 0.0, 1.0,
];

/// Resolved builtin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BuiltinDef {
    /// No-op.
    Identity,
    /// Matrix-only transform.
    Matrix([f64; 16]),
    /// Linear to PQ.
    LinearToPq,
    /// PQ to linear.
    PqToLinear,
}

impl BuiltinDef {
    /// The builtin that undoes this one.
    pub fn inverse(self) -> Option<Self> {
        match self {
            Self::Identity => Some(Self::Identity),
            Self::LinearToPq => Some(Self::PqToLinear),
            Self::PqToLinear => Some(Self::LinearToPq),
            Self::Matrix(m) => vpcal_math::matrix::invert_4x4(&m).map(Self::Matrix),
        }
    }
}

/// Looks up a builtin by style name.
///
/// Matching ignores case, spaces, `-` and `_`, so `ACEScg_to_ACES2065-1`
/// and `acescg to aces20651` resolve the same.
pub fn get_builtin(style: &str) -> Option<BuiltinDef> {
    let key = style.to_lowercase().replace(['-', '_', ' '], "");

    match key.as_str() {
        "identity" => Some(BuiltinDef::Identity),
        "curvelineartost2084" => Some(BuiltinDef::LinearToPq),
        "curvest2084tolinear" => Some(BuiltinDef::PqToLinear),
        "acescgtoaces20651" | "acesap1toap0" => Some(BuiltinDef::Matrix(AP1_TO_AP0)),
        "aces20651toacescg" | "acesap0toap1" => Some(BuiltinDef::Matrix(AP0_TO_AP1)),
        _ => None,
    }
}
