//! Per-wall calibration settings.
//!
//! [`WallSettings`] is a flat record keyed by [`WallField`]. Reads go through
//! typed getters or [`WallSettings::get`]; writes go through
//! [`Project::set`](crate::Project::set), which owns the linkage and
//! propagation rules between primary and verification walls.
//!
//! Fields are split in two groups:
//!
//! - **unique** fields (`name`, `input_sequence_folder`, `roi`,
//!   `reference_wall`, `verification_wall`, `is_verification_wall`) belong to
//!   one wall only and are never propagated;
//! - **mirrored** fields (everything else) are copied from a primary wall to
//!   its linked verification wall on every write.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{SettingsError, SettingsResult};
use crate::vocab::{
    token_enum, CalculationOrder, CameraColourSpace, Cat, ColourSpace, Eotf, UnknownToken,
};

/// Name given to a wall created without one.
pub const DEFAULT_WALL_NAME: &str = "Wall1";
/// Default number of grey patches in the EOTF ramp.
pub const DEFAULT_NUM_GREY_PATCHES: u32 = 33;
/// Default saturation of the primaries patches.
pub const DEFAULT_PRIMARIES_SATURATION: f64 = 0.7;
/// Default shadow roll-off.
pub const DEFAULT_SHADOW_ROLLOFF: f64 = 0.008;
/// Default target peak luminance in nits.
pub const DEFAULT_TARGET_MAX_LUM_NITS: u32 = 1000;

token_enum! {
    /// Key of a wall setting.
    WallField {
        /// Wall name.
        Name => "name",
        /// Apply the measured EOTF correction LUT.
        EnableEotfCorrection => "enable_eotf_correction",
        /// Apply gamut compression.
        EnableGamutCompression => "enable_gamut_compression",
        /// Derive white balance from the capture itself.
        AutoWbSource => "auto_wb_source",
        /// Folder holding the captured plate sequence.
        InputSequenceFolder => "input_sequence_folder",
        /// Number of grey patches in the EOTF ramp.
        NumGreyPatches => "num_grey_patches",
        /// Saturation of the primaries patches.
        PrimariesSaturation => "primaries_saturation",
        /// EOTF/matrix stage order.
        CalculationOrder => "calculation_order",
        /// Gamut of the input plate.
        InputPlateGamut => "input_plate_gamut",
        /// Native gamut of the camera.
        NativeCameraGamut => "native_camera_gamut",
        /// Adaptation from reference to target.
        ReferenceToTargetCat => "reference_to_target_cat",
        /// Region of interest in the captured frames.
        Roi => "roi",
        /// Shadow roll-off.
        ShadowRolloff => "shadow_rolloff",
        /// Target peak luminance in nits.
        TargetMaxLumNits => "target_max_lum_nits",
        /// Target gamut.
        TargetGamut => "target_gamut",
        /// Target EOTF.
        TargetEotf => "target_eotf",
        /// Adaptation from target to screen.
        TargetToScreenCat => "target_to_screen_cat",
        /// White balance matches the reference wall.
        MatchReferenceWall => "match_reference_wall",
        /// Wall used as white point reference.
        ReferenceWall => "reference_wall",
        /// White point comes from an external file.
        UseExternalWhitePoint => "use_external_white_point",
        /// External white point file.
        ExternalWhitePointFile => "external_white_point_file",
        /// This wall mirrors a primary wall.
        IsVerificationWall => "is_verification_wall",
        /// Linked wall (verification wall of a primary, or primary of a verification wall).
        VerificationWall => "verification_wall",
        /// Scale the calibration to avoid clipping.
        AvoidClipping => "avoid_clipping",
    }
}

impl WallField {
    /// True for fields that belong to a single wall and never propagate.
    pub fn is_unique(&self) -> bool {
        matches!(
            self,
            WallField::Name
                | WallField::InputSequenceFolder
                | WallField::Roi
                | WallField::ReferenceWall
                | WallField::VerificationWall
                | WallField::IsVerificationWall
        )
    }

    /// True for the three mutually exclusive white point sources.
    pub fn is_white_point_source(&self) -> bool {
        matches!(
            self,
            WallField::AutoWbSource | WallField::MatchReferenceWall | WallField::UseExternalWhitePoint
        )
    }

    /// Value type accepted by this field.
    pub fn kind(&self) -> ValueKind {
        use WallField::*;
        match self {
            EnableEotfCorrection | EnableGamutCompression | AutoWbSource | MatchReferenceWall
            | UseExternalWhitePoint | IsVerificationWall | AvoidClipping => ValueKind::Bool,
            NumGreyPatches | TargetMaxLumNits => ValueKind::Int,
            PrimariesSaturation | ShadowRolloff => ValueKind::Float,
            Roi => ValueKind::IntList,
            CalculationOrder | InputPlateGamut | NativeCameraGamut | ReferenceToTargetCat
            | TargetGamut | TargetEotf | TargetToScreenCat => ValueKind::Token,
            Name | InputSequenceFolder | ReferenceWall | ExternalWhitePointFile
            | VerificationWall => ValueKind::Text,
        }
    }
}

/// Type of value a [`WallField`] accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// `true` / `false`.
    Bool,
    /// Integer.
    Int,
    /// Floating point; integers are accepted too.
    Float,
    /// Free text.
    Text,
    /// Text restricted to a closed vocabulary.
    Token,
    /// List of integers.
    IntList,
}

/// A dynamically typed setting value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    /// Boolean.
    Bool(bool),
    /// Integer.
    Int(i64),
    /// Float.
    Float(f64),
    /// Text or vocabulary token.
    Text(String),
    /// Integer list.
    IntList(Vec<i64>),
}

impl SettingValue {
    /// Parses command-line text according to the field's value kind.
    ///
    /// Integer lists are comma separated; an empty string is an empty list.
    pub fn parse_for(field: WallField, raw: &str) -> SettingsResult<Self> {
        let key = field.as_str();
        let raw = raw.trim();
        match field.kind() {
            ValueKind::Bool => match raw.to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" | "on" => Ok(Self::Bool(true)),
                "false" | "0" | "no" | "off" => Ok(Self::Bool(false)),
                _ => Err(SettingsError::invalid_value(key, format!("'{raw}' is not a boolean"))),
            },
            ValueKind::Int => raw
                .parse::<i64>()
                .map(Self::Int)
                .map_err(|e| SettingsError::invalid_value(key, e.to_string())),
            ValueKind::Float => raw
                .parse::<f64>()
                .map(Self::Float)
                .map_err(|e| SettingsError::invalid_value(key, e.to_string())),
            ValueKind::Text | ValueKind::Token => Ok(Self::Text(raw.to_string())),
            ValueKind::IntList => {
                if raw.is_empty() {
                    return Ok(Self::IntList(Vec::new()));
                }
                raw.split(',')
                    .map(|s| s.trim().parse::<i64>())
                    .collect::<Result<Vec<_>, _>>()
                    .map(Self::IntList)
                    .map_err(|e| SettingsError::invalid_value(key, e.to_string()))
            }
        }
    }
}

impl fmt::Display for SettingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Text(v) => write!(f, "{v}"),
            Self::IntList(v) => {
                let parts: Vec<String> = v.iter().map(|i| i.to_string()).collect();
                write!(f, "[{}]", parts.join(", "))
            }
        }
    }
}

impl From<bool> for SettingValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for SettingValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for SettingValue {
    fn from(v: i32) -> Self {
        Self::Int(v as i64)
    }
}

impl From<u32> for SettingValue {
    fn from(v: u32) -> Self {
        Self::Int(v as i64)
    }
}

impl From<f64> for SettingValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for SettingValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for SettingValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<Vec<i64>> for SettingValue {
    fn from(v: Vec<i64>) -> Self {
        Self::IntList(v)
    }
}

macro_rules! token_value {
    ($($ty:ty),+) => {
        $(
            impl From<$ty> for SettingValue {
                fn from(v: $ty) -> Self {
                    Self::Text(v.as_str().to_string())
                }
            }
        )+
    };
}

token_value!(CalculationOrder, Cat, Eotf, ColourSpace, CameraColourSpace);

/// Calibration settings of one LED wall.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WallSettings {
    name: String,
    enable_eotf_correction: bool,
    enable_gamut_compression: bool,
    auto_wb_source: bool,
    input_sequence_folder: String,
    num_grey_patches: u32,
    primaries_saturation: f64,
    calculation_order: CalculationOrder,
    input_plate_gamut: ColourSpace,
    native_camera_gamut: CameraColourSpace,
    reference_to_target_cat: Cat,
    roi: Vec<i64>,
    shadow_rolloff: f64,
    target_max_lum_nits: u32,
    target_gamut: ColourSpace,
    target_eotf: Eotf,
    target_to_screen_cat: Cat,
    match_reference_wall: bool,
    reference_wall: String,
    use_external_white_point: bool,
    external_white_point_file: String,
    is_verification_wall: bool,
    verification_wall: String,
    avoid_clipping: bool,
}

impl Default for WallSettings {
    fn default() -> Self {
        Self {
            name: DEFAULT_WALL_NAME.to_string(),
            enable_eotf_correction: true,
            enable_gamut_compression: true,
            auto_wb_source: false,
            input_sequence_folder: String::new(),
            num_grey_patches: DEFAULT_NUM_GREY_PATCHES,
            primaries_saturation: DEFAULT_PRIMARIES_SATURATION,
            calculation_order: CalculationOrder::ColourSpaceThenEotf,
            input_plate_gamut: ColourSpace::Rec709,
            native_camera_gamut: CameraColourSpace::Rec709,
            reference_to_target_cat: Cat::Cat02,
            roi: Vec::new(),
            shadow_rolloff: DEFAULT_SHADOW_ROLLOFF,
            target_max_lum_nits: DEFAULT_TARGET_MAX_LUM_NITS,
            target_gamut: ColourSpace::Rec2020,
            target_eotf: Eotf::Pq,
            target_to_screen_cat: Cat::NoAdaptation,
            match_reference_wall: false,
            reference_wall: String::new(),
            use_external_white_point: false,
            external_white_point_file: String::new(),
            is_verification_wall: false,
            verification_wall: String::new(),
            avoid_clipping: true,
        }
    }
}

impl WallSettings {
    /// Creates a wall with default settings.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Wall name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the EOTF correction LUT is applied.
    pub fn enable_eotf_correction(&self) -> bool {
        self.enable_eotf_correction
    }

    /// Whether gamut compression is applied.
    pub fn enable_gamut_compression(&self) -> bool {
        self.enable_gamut_compression
    }

    /// White balance is derived from the capture.
    pub fn auto_wb_source(&self) -> bool {
        self.auto_wb_source
    }

    /// Plate sequence folder.
    pub fn input_sequence_folder(&self) -> &str {
        &self.input_sequence_folder
    }

    /// Number of grey patches.
    pub fn num_grey_patches(&self) -> u32 {
        self.num_grey_patches
    }

    /// Primaries patch saturation.
    pub fn primaries_saturation(&self) -> f64 {
        self.primaries_saturation
    }

    /// EOTF/matrix stage order.
    pub fn calculation_order(&self) -> CalculationOrder {
        self.calculation_order
    }

    /// Input plate gamut.
    pub fn input_plate_gamut(&self) -> ColourSpace {
        self.input_plate_gamut
    }

    /// Native camera gamut.
    pub fn native_camera_gamut(&self) -> CameraColourSpace {
        self.native_camera_gamut
    }

    /// Reference to target adaptation.
    pub fn reference_to_target_cat(&self) -> Cat {
        self.reference_to_target_cat
    }

    /// Region of interest.
    pub fn roi(&self) -> &[i64] {
        &self.roi
    }

    /// Shadow roll-off.
    pub fn shadow_rolloff(&self) -> f64 {
        self.shadow_rolloff
    }

    /// Target peak luminance in nits.
    pub fn target_max_lum_nits(&self) -> u32 {
        self.target_max_lum_nits
    }

    /// Target gamut.
    pub fn target_gamut(&self) -> ColourSpace {
        self.target_gamut
    }

    /// Target EOTF.
    pub fn target_eotf(&self) -> Eotf {
        self.target_eotf
    }

    /// Target to screen adaptation.
    pub fn target_to_screen_cat(&self) -> Cat {
        self.target_to_screen_cat
    }

    /// White balance matches the reference wall.
    pub fn match_reference_wall(&self) -> bool {
        self.match_reference_wall
    }

    /// Reference wall name, empty when unset.
    pub fn reference_wall(&self) -> &str {
        &self.reference_wall
    }

    /// White point comes from an external file.
    pub fn use_external_white_point(&self) -> bool {
        self.use_external_white_point
    }

    /// External white point file.
    pub fn external_white_point_file(&self) -> &str {
        &self.external_white_point_file
    }

    /// This wall mirrors a primary.
    pub fn is_verification_wall(&self) -> bool {
        self.is_verification_wall
    }

    /// Linked wall name, empty when unlinked.
    pub fn verification_wall(&self) -> &str {
        &self.verification_wall
    }

    /// Avoid clipping.
    pub fn avoid_clipping(&self) -> bool {
        self.avoid_clipping
    }

    /// At most one white point source is enabled.
    pub fn has_valid_white_balance_options(&self) -> bool {
        [
            self.auto_wb_source,
            self.match_reference_wall,
            self.use_external_white_point,
        ]
        .iter()
        .filter(|on| **on)
        .count()
            <= 1
    }

    /// Reads a field as a dynamic value.
    pub fn get(&self, field: WallField) -> SettingValue {
        use WallField::*;
        match field {
            Name => self.name.clone().into(),
            EnableEotfCorrection => self.enable_eotf_correction.into(),
            EnableGamutCompression => self.enable_gamut_compression.into(),
            AutoWbSource => self.auto_wb_source.into(),
            InputSequenceFolder => self.input_sequence_folder.clone().into(),
            NumGreyPatches => self.num_grey_patches.into(),
            PrimariesSaturation => self.primaries_saturation.into(),
            CalculationOrder => self.calculation_order.into(),
            InputPlateGamut => self.input_plate_gamut.into(),
            NativeCameraGamut => self.native_camera_gamut.into(),
            ReferenceToTargetCat => self.reference_to_target_cat.into(),
            Roi => self.roi.clone().into(),
            ShadowRolloff => self.shadow_rolloff.into(),
            TargetMaxLumNits => self.target_max_lum_nits.into(),
            TargetGamut => self.target_gamut.into(),
            TargetEotf => self.target_eotf.into(),
            TargetToScreenCat => self.target_to_screen_cat.into(),
            MatchReferenceWall => self.match_reference_wall.into(),
            ReferenceWall => self.reference_wall.clone().into(),
            UseExternalWhitePoint => self.use_external_white_point.into(),
            ExternalWhitePointFile => self.external_white_point_file.clone().into(),
            IsVerificationWall => self.is_verification_wall.into(),
            VerificationWall => self.verification_wall.clone().into(),
            AvoidClipping => self.avoid_clipping.into(),
        }
    }

    /// Serializes this wall as a flat JSON object.
    pub fn to_json(&self) -> SettingsResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parses a wall from a flat JSON object; missing keys take defaults.
    pub fn from_json(json: &str) -> SettingsResult<Self> {
        let wall: Self = serde_json::from_str(json)?;
        wall.check_record()?;
        Ok(wall)
    }

    /// Type-checks `value` and writes it, enforcing the record-local
    /// invariants (no self links, one white point source).
    pub(crate) fn apply(&mut self, field: WallField, value: &SettingValue) -> SettingsResult<()> {
        use WallField::*;
        let key = field.as_str();
        match field {
            Name => {
                let name = expect_text(key, value)?;
                if name.is_empty() {
                    return Err(SettingsError::invalid_value(key, "wall name cannot be empty"));
                }
                self.name = name;
            }
            EnableEotfCorrection => self.enable_eotf_correction = expect_bool(key, value)?,
            EnableGamutCompression => self.enable_gamut_compression = expect_bool(key, value)?,
            AutoWbSource | MatchReferenceWall | UseExternalWhitePoint => {
                let on = expect_bool(key, value)?;
                if on {
                    self.check_white_point_source(field)?;
                }
                match field {
                    AutoWbSource => self.auto_wb_source = on,
                    MatchReferenceWall => self.match_reference_wall = on,
                    _ => self.use_external_white_point = on,
                }
            }
            InputSequenceFolder => self.input_sequence_folder = expect_text(key, value)?,
            NumGreyPatches => self.num_grey_patches = expect_positive(key, value)?,
            PrimariesSaturation => self.primaries_saturation = expect_float(key, value)?,
            CalculationOrder => self.calculation_order = expect_token(key, value)?,
            InputPlateGamut => self.input_plate_gamut = expect_token(key, value)?,
            NativeCameraGamut => self.native_camera_gamut = expect_token(key, value)?,
            ReferenceToTargetCat => self.reference_to_target_cat = expect_token(key, value)?,
            Roi => self.roi = expect_int_list(key, value)?,
            ShadowRolloff => self.shadow_rolloff = expect_float(key, value)?,
            TargetMaxLumNits => self.target_max_lum_nits = expect_positive(key, value)?,
            TargetGamut => self.target_gamut = expect_token(key, value)?,
            TargetEotf => self.target_eotf = expect_token(key, value)?,
            TargetToScreenCat => self.target_to_screen_cat = expect_token(key, value)?,
            ReferenceWall => {
                let target = expect_text(key, value)?;
                self.check_not_self(field, &target)?;
                self.reference_wall = target;
            }
            ExternalWhitePointFile => self.external_white_point_file = expect_text(key, value)?,
            IsVerificationWall => self.is_verification_wall = expect_bool(key, value)?,
            VerificationWall => {
                let target = expect_text(key, value)?;
                self.check_not_self(field, &target)?;
                self.verification_wall = target;
            }
            AvoidClipping => self.avoid_clipping = expect_bool(key, value)?,
        }
        Ok(())
    }

    /// Copy of `primary` carrying this wall's unique fields.
    pub(crate) fn mirrored_from(&self, primary: &WallSettings) -> WallSettings {
        WallSettings {
            name: self.name.clone(),
            input_sequence_folder: self.input_sequence_folder.clone(),
            roi: self.roi.clone(),
            reference_wall: self.reference_wall.clone(),
            verification_wall: self.verification_wall.clone(),
            is_verification_wall: self.is_verification_wall,
            ..primary.clone()
        }
    }

    /// Default settings carrying this wall's unique fields.
    pub(crate) fn cleared(&self) -> WallSettings {
        self.mirrored_from(&WallSettings::default())
    }

    /// Checks the invariants that do not need the rest of the project.
    pub(crate) fn check_record(&self) -> SettingsResult<()> {
        self.check_not_self(WallField::ReferenceWall, &self.reference_wall)?;
        self.check_not_self(WallField::VerificationWall, &self.verification_wall)?;
        if let [first, rest @ ..] = self.enabled_white_point_sources().as_slice() {
            if !rest.is_empty() {
                return Err(SettingsError::ConflictingWhitePointSource {
                    wall: self.name.clone(),
                    field: first.as_str().to_string(),
                    other: rest
                        .iter()
                        .map(|f| f.as_str())
                        .collect::<Vec<_>>()
                        .join(", "),
                });
            }
        }
        Ok(())
    }

    pub(crate) fn set_name(&mut self, name: String) {
        self.name = name;
    }

    pub(crate) fn set_reference_wall(&mut self, name: String) {
        self.reference_wall = name;
    }

    pub(crate) fn set_link(&mut self, linked: String, is_verification: bool) {
        self.verification_wall = linked;
        self.is_verification_wall = is_verification;
    }

    fn enabled_white_point_sources(&self) -> Vec<WallField> {
        [
            (WallField::AutoWbSource, self.auto_wb_source),
            (WallField::MatchReferenceWall, self.match_reference_wall),
            (WallField::UseExternalWhitePoint, self.use_external_white_point),
        ]
        .into_iter()
        .filter_map(|(field, on)| on.then_some(field))
        .collect()
    }

    fn check_white_point_source(&self, field: WallField) -> SettingsResult<()> {
        if let Some(other) = self
            .enabled_white_point_sources()
            .into_iter()
            .find(|other| *other != field)
        {
            return Err(SettingsError::ConflictingWhitePointSource {
                wall: self.name.clone(),
                field: field.as_str().to_string(),
                other: other.as_str().to_string(),
            });
        }
        Ok(())
    }

    fn check_not_self(&self, field: WallField, target: &str) -> SettingsResult<()> {
        if !target.is_empty() && target == self.name {
            return Err(SettingsError::InvalidLink {
                wall: self.name.clone(),
                reason: format!("{} cannot reference the wall itself", field.as_str()),
            });
        }
        Ok(())
    }
}

fn type_error(key: &str, expected: &str, value: &SettingValue) -> SettingsError {
    SettingsError::invalid_value(key, format!("expected {expected}, got {value:?}"))
}

fn expect_bool(key: &str, value: &SettingValue) -> SettingsResult<bool> {
    match value {
        SettingValue::Bool(v) => Ok(*v),
        other => Err(type_error(key, "a boolean", other)),
    }
}

fn expect_float(key: &str, value: &SettingValue) -> SettingsResult<f64> {
    let v = match value {
        SettingValue::Float(v) => *v,
        SettingValue::Int(v) => *v as f64,
        other => return Err(type_error(key, "a number", other)),
    };
    if !v.is_finite() {
        return Err(SettingsError::invalid_value(key, "value must be finite"));
    }
    Ok(v)
}

fn expect_positive(key: &str, value: &SettingValue) -> SettingsResult<u32> {
    match value {
        SettingValue::Int(v) if *v > 0 => u32::try_from(*v)
            .map_err(|_| SettingsError::invalid_value(key, format!("{v} is out of range"))),
        SettingValue::Int(v) => Err(SettingsError::invalid_value(
            key,
            format!("{v} must be greater than zero"),
        )),
        other => Err(type_error(key, "an integer", other)),
    }
}

fn expect_text(key: &str, value: &SettingValue) -> SettingsResult<String> {
    match value {
        SettingValue::Text(v) => Ok(v.clone()),
        other => Err(type_error(key, "text", other)),
    }
}

fn expect_int_list(key: &str, value: &SettingValue) -> SettingsResult<Vec<i64>> {
    match value {
        SettingValue::IntList(v) => Ok(v.clone()),
        other => Err(type_error(key, "a list of integers", other)),
    }
}

fn expect_token<T>(key: &str, value: &SettingValue) -> SettingsResult<T>
where
    T: FromStr<Err = UnknownToken>,
{
    let text = expect_text(key, value)?;
    text.parse::<T>()
        .map_err(|e| SettingsError::invalid_value(key, e.to_string()))
}
