//! Transform definitions.
//!
//! A calibration pipeline is a [`GroupTransform`] of these stages:
//! - [`MatrixTransform`] - 4x4 matrix plus offset
//! - [`FileTransform`] - reference to a LUT sidecar
//! - [`BuiltinTransform`] - named builtin (PQ curves, ACES primaries)
//! - [`FixedFunctionTransform`] - ACES gamut compression
//! - nested [`GroupTransform`]s
//!
//! Transforms serialize to YAML with OCIO-style type tags
//! (`!MatrixTransform`, `!GroupTransform`, ...). The `!<Tag>` spelling used
//! in `.ocio` files is accepted on input.

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

use crate::error::{OcioError, OcioResult};

/// Transform application direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransformDirection {
    /// Forward transform.
    #[default]
    Forward,
    /// Inverse transform.
    Inverse,
}

impl TransformDirection {
    /// Returns the opposite direction.
    #[inline]
    pub fn inverse(self) -> Self {
        match self {
            Self::Forward => Self::Inverse,
            Self::Inverse => Self::Forward,
        }
    }

    /// True for [`TransformDirection::Forward`].
    #[inline]
    pub fn is_forward(&self) -> bool {
        *self == Self::Forward
    }

    /// Direction of a stage with direction `self` applied inside an
    /// enclosing context running in `outer`.
    #[inline]
    pub fn combine(self, outer: Self) -> Self {
        if outer.is_forward() { self } else { self.inverse() }
    }
}

/// Colour transform definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Transform {
    /// 4x4 matrix transform.
    #[serde(rename = "MatrixTransform")]
    Matrix(MatrixTransform),
    /// LUT from file.
    #[serde(rename = "FileTransform")]
    File(FileTransform),
    /// Builtin transform by name.
    #[serde(rename = "BuiltinTransform")]
    Builtin(BuiltinTransform),
    /// Fixed function (ACES specific).
    #[serde(rename = "FixedFunctionTransform")]
    FixedFunction(FixedFunctionTransform),
    /// Group of chained transforms.
    #[serde(rename = "GroupTransform")]
    Group(GroupTransform),
}

impl Transform {
    /// Creates a matrix transform from a row-major 4x4 array.
    pub fn matrix(matrix: [f64; 16]) -> Self {
        Self::Matrix(MatrixTransform {
            matrix,
            offset: [0.0; 4],
            direction: TransformDirection::Forward,
        })
    }

    /// Creates a file transform (LUT reference).
    pub fn file(src: impl Into<String>, direction: TransformDirection) -> Self {
        Self::File(FileTransform {
            src: src.into(),
            interpolation: None,
            direction,
        })
    }

    /// Creates a builtin transform.
    pub fn builtin(style: impl Into<String>, direction: TransformDirection) -> Self {
        Self::Builtin(BuiltinTransform {
            style: style.into(),
            direction,
        })
    }

    /// Creates a fixed function transform.
    pub fn fixed_function(style: FixedFunctionStyle, params: Vec<f64>) -> Self {
        Self::FixedFunction(FixedFunctionTransform {
            style,
            params,
            direction: TransformDirection::Forward,
        })
    }

    /// Wraps transforms in a group.
    pub fn group(children: Vec<Transform>) -> Self {
        Self::Group(GroupTransform::new(children))
    }

    /// Direction stored on this stage.
    pub fn direction(&self) -> TransformDirection {
        match self {
            Self::Matrix(t) => t.direction,
            Self::File(t) => t.direction,
            Self::Builtin(t) => t.direction,
            Self::FixedFunction(t) => t.direction,
            Self::Group(t) => t.direction,
        }
    }

    /// Returns the inverse of this transform.
    pub fn inverse(self) -> Self {
        match self {
            Self::Matrix(mut t) => {
                t.direction = t.direction.inverse();
                Self::Matrix(t)
            }
            Self::File(mut t) => {
                t.direction = t.direction.inverse();
                Self::File(t)
            }
            Self::Builtin(mut t) => {
                t.direction = t.direction.inverse();
                Self::Builtin(t)
            }
            Self::FixedFunction(mut t) => {
                t.direction = t.direction.inverse();
                Self::FixedFunction(t)
            }
            Self::Group(mut t) => {
                t.direction = t.direction.inverse();
                Self::Group(t)
            }
        }
    }

    /// Visits every non-group stage, depth first.
    pub fn for_each_stage<'a>(&'a self, f: &mut impl FnMut(&'a Transform)) {
        match self {
            Self::Group(g) => {
                for child in &g.children {
                    child.for_each_stage(&mut *f);
                }
            }
            other => f(other),
        }
    }

    /// Mutable variant of [`Transform::for_each_stage`].
    pub fn for_each_stage_mut(&mut self, f: &mut impl FnMut(&mut Transform)) {
        match self {
            Self::Group(g) => {
                for child in &mut g.children {
                    child.for_each_stage_mut(&mut *f);
                }
            }
            other => f(other),
        }
    }
}

/// 4x4 matrix + offset transform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatrixTransform {
    /// 4x4 matrix in row-major order.
    #[serde(default = "identity_4x4")]
    pub matrix: [f64; 16],
    /// RGBA offset.
    #[serde(default)]
    pub offset: [f64; 4],
    /// Direction.
    #[serde(default, skip_serializing_if = "TransformDirection::is_forward")]
    pub direction: TransformDirection,
}

fn identity_4x4() -> [f64; 16] {
    vpcal_math::IDENTITY_4X4
}

/// File-based transform (LUT reference).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileTransform {
    /// Source file, absolute or relative to the config search path.
    pub src: String,
    /// Interpolation hint. Only linear is evaluated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interpolation: Option<String>,
    /// Direction.
    #[serde(default, skip_serializing_if = "TransformDirection::is_forward")]
    pub direction: TransformDirection,
}

/// Builtin transform by style name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuiltinTransform {
    /// Builtin style, e.g. `CURVE - LINEAR_to_ST-2084`.
    pub style: String,
    /// Direction.
    #[serde(default, skip_serializing_if = "TransformDirection::is_forward")]
    pub direction: TransformDirection,
}

/// Fixed function transform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixedFunctionTransform {
    /// Function style.
    pub style: FixedFunctionStyle,
    /// Style parameters.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<f64>,
    /// Direction.
    #[serde(default, skip_serializing_if = "TransformDirection::is_forward")]
    pub direction: TransformDirection,
}

/// Fixed function styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FixedFunctionStyle {
    /// ACES 1.3 parametric gamut compression.
    #[serde(rename = "ACES_GamutComp13")]
    AcesGamutComp13,
}

/// Ordered chain of transforms.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GroupTransform {
    /// Child transforms, applied first to last.
    #[serde(default)]
    pub children: Vec<Transform>,
    /// Direction.
    #[serde(default, skip_serializing_if = "TransformDirection::is_forward")]
    pub direction: TransformDirection,
}

impl GroupTransform {
    /// Creates a forward group.
    pub fn new(children: Vec<Transform>) -> Self {
        Self {
            children,
            direction: TransformDirection::Forward,
        }
    }

    /// Appends a transform.
    pub fn push(&mut self, transform: Transform) {
        self.children.push(transform);
    }

    /// Number of direct children.
    #[inline]
    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// True if the group has no children.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Serializes the group as a tagged YAML document.
    pub fn to_yaml(&self) -> OcioResult<String> {
        Ok(serde_yaml::to_string(&Transform::Group(self.clone()))?)
    }

    /// Parses a group written by [`GroupTransform::to_yaml`] or taken from
    /// an `.ocio` file.
    pub fn from_yaml(yaml: &str) -> OcioResult<Self> {
        match serde_yaml::from_str(&normalize_tags(yaml)?)? {
            Transform::Group(group) => Ok(group),
            other => Ok(GroupTransform::new(vec![other])),
        }
    }
}

impl From<GroupTransform> for Transform {
    fn from(group: GroupTransform) -> Self {
        Transform::Group(group)
    }
}

/// Rewrites OCIO `!<Tag>` local tags for serde_yaml.
///
/// Transform tags become `!Tag` enum tags. Structural tags (`!<ColorSpace>`,
/// `!<View>`, `!<ViewTransform>`, ...) are dropped; the shape of the node
/// already says what it is.
pub(crate) fn normalize_tags(yaml: &str) -> OcioResult<String> {
    let re = Regex::new(r"!<(\w+)>").map_err(|e| OcioError::Validation(e.to_string()))?;
    Ok(re
        .replace_all(yaml, |caps: &Captures<'_>| {
            let tag = &caps[1];
            if tag.ends_with("Transform") && tag != "ViewTransform" {
                format!("!{tag}")
            } else {
                String::new()
            }
        })
        .into_owned())
}
