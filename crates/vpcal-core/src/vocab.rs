//! Closed vocabularies used by wall settings.
//!
//! Each enum serializes to exactly one fixed token. Tokens outside the
//! vocabulary are rejected on parse and on deserialize.
//!
//! | Enum | Tokens |
//! |------|--------|
//! | [`CalculationOrder`] | `CS_EOTF`, `EOTF_CS` |
//! | [`Cat`] | `Bradford`, `CAT02`, `XYZ Scaling`, `Von Kries`, `None` |
//! | [`Eotf`] | `gamma 1.8`, `gamma 2.2`, `gamma 2.4`, `sRGB`, `ST 2084` |
//! | [`ColourSpace`] | `ITU-R BT.709`, `ITU-R BT.2020`, `P3-D65`, `DCI-P3`, `ACES2065-1`, `ACEScg` |
//! | [`CameraColourSpace`] | camera native gamuts |

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Token not in an enum's vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} '{token}' (expected one of: {expected})")]
pub struct UnknownToken {
    /// Vocabulary name.
    pub kind: &'static str,
    /// Rejected token.
    pub token: String,
    /// Accepted tokens, comma separated.
    pub expected: String,
}

macro_rules! token_enum {
    (
        $(#[$meta:meta])*
        $name:ident $(, default = $default:ident)? {
            $( $(#[$vmeta:meta])* $variant:ident => $token:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $( $(#[$vmeta])* #[serde(rename = $token)] $variant ),+
        }

        impl $name {
            /// Every member in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Serialized token.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $token),+
                }
            }
        }

        $(
            impl Default for $name {
                fn default() -> Self {
                    $name::$default
                }
            }
        )?

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = UnknownToken;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                $name::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str() == s)
                    .ok_or_else(|| UnknownToken {
                        kind: stringify!($name),
                        token: s.to_string(),
                        expected: $name::ALL
                            .iter()
                            .map(|v| v.as_str())
                            .collect::<Vec<_>>()
                            .join(", "),
                    })
            }
        }
    };
}

pub(crate) use token_enum;

token_enum! {
    /// Order in which the EOTF correction and the colour matrix are applied.
    CalculationOrder, default = ColourSpaceThenEotf {
        /// EOTF correction stage first, then the target-to-screen matrix.
        ColourSpaceThenEotf => "CS_EOTF",
        /// Target-to-screen matrix first, then the EOTF correction stage.
        EotfThenColourSpace => "EOTF_CS",
    }
}

token_enum! {
    /// Chromatic adaptation transform.
    Cat, default = Cat02 {
        /// Bradford.
        Bradford => "Bradford",
        /// CIECAM02.
        Cat02 => "CAT02",
        /// Plain XYZ scaling.
        XyzScaling => "XYZ Scaling",
        /// Von Kries.
        VonKries => "Von Kries",
        /// No adaptation.
        NoAdaptation => "None",
    }
}

token_enum! {
    /// Target electro-optical transfer function.
    Eotf, default = Pq {
        /// Pure power 1.8.
        Gamma18 => "gamma 1.8",
        /// Pure power 2.2.
        Gamma22 => "gamma 2.2",
        /// Pure power 2.4.
        Gamma24 => "gamma 2.4",
        /// IEC 61966-2-1 piecewise curve.
        Srgb => "sRGB",
        /// SMPTE ST 2084 perceptual quantizer.
        Pq => "ST 2084",
    }
}

token_enum! {
    /// Target and plate colour spaces.
    ColourSpace, default = Rec2020 {
        /// Rec.709 primaries, D65.
        Rec709 => "ITU-R BT.709",
        /// Rec.2020 primaries, D65.
        Rec2020 => "ITU-R BT.2020",
        /// P3 primaries, D65 white.
        P3D65 => "P3-D65",
        /// P3 primaries, DCI white.
        DciP3 => "DCI-P3",
        /// ACES AP0.
        Aces2065 => "ACES2065-1",
        /// ACES AP1.
        AcesCg => "ACEScg",
    }
}

token_enum! {
    /// Native gamut of the camera photographing the wall.
    CameraColourSpace, default = Rec709 {
        /// Rec.709.
        Rec709 => "ITU-R BT.709",
        /// ARRI Alexa wide gamut (LogC3).
        ArriWideGamut3 => "ARRI Wide Gamut 3",
        /// ARRI Alexa 35 wide gamut (LogC4).
        ArriWideGamut4 => "ARRI Wide Gamut 4",
        /// Sony S-Gamut3.
        SGamut3 => "S-Gamut3",
        /// Sony S-Gamut3.Cine.
        SGamut3Cine => "S-Gamut3.Cine",
        /// RED Wide Gamut RGB.
        RedWideGamut => "RED Wide Gamut RGB",
        /// Canon Cinema Gamut.
        CanonCinemaGamut => "Canon Cinema Gamut",
        /// Panasonic V-Gamut.
        VGamut => "V-Gamut",
        /// Blackmagic Wide Gamut.
        BlackmagicWideGamut => "Blackmagic Wide Gamut",
    }
}
