//! Colour-management configuration parsing.
//!
//! Reads the subset of the `.ocio` YAML format a calibration deployment
//! needs: profile version, search path, colour spaces with their
//! reference transforms, and displays with their views.
//!
//! # Example
//!
//! ```ignore
//! use vpcal_ocio::Config;
//!
//! let config = Config::from_file("vp_cal/config.ocio")?;
//! let proc = config.display_processor("ACEScg", "LED Wall", "Calibrated")?;
//! ```

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::error::{OcioError, OcioResult};
use crate::processor::Processor;
use crate::transform::{normalize_tags, GroupTransform, Transform, TransformDirection};

/// Oldest config version accepted by [`crate::NativeBackend`]. Gamut
/// compression needs 2.1.
pub const MIN_CONFIG_VERSION: ConfigVersion = ConfigVersion::new(2, 1);

/// Config profile version (`major.minor`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConfigVersion {
    /// Major version.
    pub major: u32,
    /// Minor version.
    pub minor: u32,
}

impl ConfigVersion {
    /// Creates a version.
    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    /// Parses `2`, `2.1` or `"2.1"`.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        let (major, minor) = match text.split_once('.') {
            Some((major, minor)) => (major, minor),
            None => (text, "0"),
        };
        Some(Self::new(major.parse().ok()?, minor.parse().ok()?))
    }
}

impl fmt::Display for ConfigVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// A named colour space and its conversions to and from the reference.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorSpace {
    /// Colour space name.
    pub name: String,
    /// Description text.
    pub description: String,
    /// Conversion into the reference space.
    pub to_reference: Option<Transform>,
    /// Conversion out of the reference space.
    pub from_reference: Option<Transform>,
}

impl ColorSpace {
    /// Creates a colour space with no transforms (identical to the reference).
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            to_reference: None,
            from_reference: None,
        }
    }

    /// Transform from this space into the reference, if any.
    pub fn to_reference_transform(&self) -> Option<Transform> {
        self.to_reference
            .clone()
            .or_else(|| self.from_reference.clone().map(Transform::inverse))
    }

    /// Transform from the reference into this space, if any.
    pub fn from_reference_transform(&self) -> Option<Transform> {
        self.from_reference
            .clone()
            .or_else(|| self.to_reference.clone().map(Transform::inverse))
    }
}

/// A view: a named output colour space on a display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct View {
    /// View name.
    pub name: String,
    /// Colour space the view renders into.
    pub colorspace: String,
}

/// A display device with its views.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Display {
    /// Display name.
    pub name: String,
    /// Views in config order.
    pub views: Vec<View>,
}

impl Display {
    /// Finds a view by name.
    pub fn view(&self, name: &str) -> Option<&View> {
        self.views.iter().find(|v| v.name == name)
    }
}

/// Parsed configuration.
#[derive(Debug, Clone)]
pub struct Config {
    name: String,
    version: ConfigVersion,
    working_dir: PathBuf,
    search_paths: Vec<PathBuf>,
    colorspaces: Vec<ColorSpace>,
    displays: Vec<Display>,
}

impl Config {
    /// Creates an empty config at the given version.
    pub fn new(version: ConfigVersion) -> Self {
        Self {
            name: String::new(),
            version,
            working_dir: PathBuf::from("."),
            search_paths: Vec::new(),
            colorspaces: Vec::new(),
            displays: Vec::new(),
        }
    }

    /// Loads configuration from a file. Relative search paths resolve
    /// against the file's directory.
    pub fn from_file(path: impl AsRef<Path>) -> OcioResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(OcioError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        let working_dir = path
            .parent()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));
        Self::from_yaml_str(&content, working_dir)
    }

    /// Loads configuration from a YAML string.
    pub fn from_yaml_str(yaml: &str, working_dir: PathBuf) -> OcioResult<Self> {
        let raw: RawConfig = serde_yaml::from_str(&normalize_tags(yaml)?)?;
        Self::from_raw(raw, working_dir)
    }

    fn from_raw(raw: RawConfig, working_dir: PathBuf) -> OcioResult<Self> {
        let version_text = scalar_text(&raw.ocio_profile_version);
        let version = ConfigVersion::parse(&version_text).ok_or_else(|| {
            OcioError::Validation(format!("bad ocio_profile_version '{version_text}'"))
        })?;

        let search_paths = raw
            .search_path
            .map(|v| match v {
                serde_yaml::Value::Sequence(items) => items.iter().map(scalar_text).collect(),
                other => scalar_text(&other)
                    .split(':')
                    .map(str::to_string)
                    .collect::<Vec<_>>(),
            })
            .unwrap_or_default()
            .into_iter()
            .filter(|p| !p.is_empty())
            .map(|p| working_dir.join(p))
            .collect();

        let mut config = Self {
            name: raw.name.unwrap_or_default(),
            version,
            working_dir,
            search_paths,
            colorspaces: Vec::new(),
            displays: Vec::new(),
        };

        for raw_cs in raw.colorspaces.unwrap_or_default() {
            config.colorspaces.push(ColorSpace {
                name: raw_cs.name,
                description: raw_cs.description.unwrap_or_default(),
                to_reference: raw_cs.to_reference.map(parse_transform).transpose()?,
                from_reference: raw_cs.from_reference.map(parse_transform).transpose()?,
            });
        }

        if let Some(displays) = raw.displays {
            for (name, views) in displays {
                let name = scalar_text(&name);
                let views: Vec<RawView> = serde_yaml::from_value(views)?;
                config.displays.push(Display {
                    name,
                    views: views
                        .into_iter()
                        .map(|v| View {
                            name: v.name,
                            colorspace: v.colorspace,
                        })
                        .collect(),
                });
            }
        }

        debug!(
            version = %config.version,
            colorspaces = config.colorspaces.len(),
            displays = config.displays.len(),
            "parsed config"
        );
        Ok(config)
    }

    /// Config name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Profile version.
    #[inline]
    pub fn version(&self) -> ConfigVersion {
        self.version
    }

    /// Directory the config was loaded from.
    #[inline]
    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    /// LUT search paths.
    #[inline]
    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }

    /// Appends a LUT search path.
    pub fn add_search_path(&mut self, path: impl Into<PathBuf>) {
        self.search_paths.push(path.into());
    }

    /// All colour spaces.
    #[inline]
    pub fn colorspaces(&self) -> &[ColorSpace] {
        &self.colorspaces
    }

    /// Finds a colour space by name.
    pub fn colorspace(&self, name: &str) -> Option<&ColorSpace> {
        self.colorspaces.iter().find(|cs| cs.name == name)
    }

    /// Adds a colour space, replacing one with the same name.
    pub fn add_colorspace(&mut self, cs: ColorSpace) {
        match self.colorspaces.iter_mut().find(|c| c.name == cs.name) {
            Some(existing) => *existing = cs,
            None => self.colorspaces.push(cs),
        }
    }

    /// All displays.
    #[inline]
    pub fn displays(&self) -> &[Display] {
        &self.displays
    }

    /// Finds a display by name.
    pub fn display(&self, name: &str) -> Option<&Display> {
        self.displays.iter().find(|d| d.name == name)
    }

    /// Adds a display, replacing one with the same name.
    pub fn add_display(&mut self, display: Display) {
        match self.displays.iter_mut().find(|d| d.name == display.name) {
            Some(existing) => *existing = display,
            None => self.displays.push(display),
        }
    }

    /// Resolves a LUT file: absolute paths as-is, then the working
    /// directory, then each search path.
    pub fn resolve_file(&self, filename: &str) -> Option<PathBuf> {
        let path = PathBuf::from(filename);
        if path.is_absolute() {
            return path.exists().then_some(path);
        }
        std::iter::once(&self.working_dir)
            .chain(self.search_paths.iter())
            .map(|dir| dir.join(filename))
            .find(|p| p.exists())
    }

    fn colorspace_or_err(&self, name: &str) -> OcioResult<&ColorSpace> {
        self.colorspace(name)
            .ok_or_else(|| OcioError::ColorSpaceNotFound { name: name.into() })
    }

    /// Looks up a display's view, failing with the offending name.
    pub fn view(&self, display: &str, view: &str) -> OcioResult<&View> {
        let d = self
            .display(display)
            .ok_or_else(|| OcioError::DisplayNotFound {
                name: display.into(),
            })?;
        d.view(view).ok_or_else(|| OcioError::ViewNotFound {
            display: display.into(),
            view: view.into(),
        })
    }

    /// Transform converting `src` to `dst` through the reference space.
    pub fn conversion(&self, src: &str, dst: &str) -> OcioResult<GroupTransform> {
        let src_cs = self.colorspace_or_err(src)?;
        let dst_cs = self.colorspace_or_err(dst)?;
        let mut group = GroupTransform::default();
        if src_cs.name != dst_cs.name {
            group.children.extend(src_cs.to_reference_transform());
            group.children.extend(dst_cs.from_reference_transform());
        }
        Ok(group)
    }

    /// Processor converting `src` to `dst`.
    pub fn processor(&self, src: &str, dst: &str) -> OcioResult<Processor> {
        let group = self.conversion(src, dst)?;
        Processor::from_transform_in(self, &group.into(), TransformDirection::Forward)
    }

    /// Processor from `input` to the colour space of `display`/`view`.
    pub fn display_processor(&self, input: &str, display: &str, view: &str) -> OcioResult<Processor> {
        self.colorspace_or_err(input)?;
        let target = self.view(display, view)?.colorspace.clone();
        self.processor(input, &target)
    }
}

/// Text of a YAML scalar (numbers keep their written form).
fn scalar_text(value: &serde_yaml::Value) -> String {
    match value {
        serde_yaml::Value::String(s) => s.clone(),
        serde_yaml::Value::Number(n) => n.to_string(),
        serde_yaml::Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

/// A reference transform is either one tagged transform or a list of them.
fn parse_transform(value: serde_yaml::Value) -> OcioResult<Transform> {
    match value {
        serde_yaml::Value::Sequence(items) => Ok(Transform::group(
            items
                .into_iter()
                .map(serde_yaml::from_value)
                .collect::<Result<_, _>>()?,
        )),
        other => Ok(serde_yaml::from_value(other)?),
    }
}

// ============================================================================
// Raw YAML structures
// ============================================================================

#[derive(Debug, Deserialize)]
struct RawConfig {
    ocio_profile_version: serde_yaml::Value,
    name: Option<String>,
    search_path: Option<serde_yaml::Value>,
    colorspaces: Option<Vec<RawColorSpace>>,
    displays: Option<serde_yaml::Mapping>,
}

#[derive(Debug, Deserialize)]
struct RawColorSpace {
    name: String,
    description: Option<String>,
    #[serde(alias = "to_scene_reference", alias = "to_display_reference")]
    to_reference: Option<serde_yaml::Value>,
    #[serde(alias = "from_scene_reference", alias = "from_display_reference")]
    from_reference: Option<serde_yaml::Value>,
}

#[derive(Debug, Deserialize)]
struct RawView {
    name: String,
    colorspace: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: &str = r#"
ocio_profile_version: 2.1
name: wall
search_path: "luts:shared"

colorspaces:
  - name: ACES2065-1
    description: reference
  - name: ACEScg
    to_reference: !<BuiltinTransform> {style: ACEScg_to_ACES2065-1}
  - name: Wall1 Calibrated
    from_reference: !<GroupTransform>
      children:
        - !<BuiltinTransform> {style: ACEScg_to_ACES2065-1, direction: inverse}
        - !<MatrixTransform> {matrix: [2, 0, 0, 0, 0, 2, 0, 0, 0, 0, 2, 0, 0, 0, 0, 1]}

displays:
  LED Wall:
    - !<View> {name: Calibrated, colorspace: Wall1 Calibrated}
    - !<View> {name: Raw, colorspace: ACES2065-1}
"#;

    fn config() -> Config {
        Config::from_yaml_str(CONFIG, PathBuf::from("/cfg")).unwrap()
    }

    #[test]
    fn parses_version_and_paths() {
        let c = config();
        assert_eq!(c.version(), ConfigVersion::new(2, 1));
        assert_eq!(c.search_paths(), &[PathBuf::from("/cfg/luts"), PathBuf::from("/cfg/shared")]);
        assert_eq!(c.colorspaces().len(), 3);
    }

    #[test]
    fn version_parsing() {
        assert_eq!(ConfigVersion::parse("2"), Some(ConfigVersion::new(2, 0)));
        assert_eq!(ConfigVersion::parse("2.1"), Some(ConfigVersion::new(2, 1)));
        assert_eq!(ConfigVersion::parse("two"), None);
        assert!(ConfigVersion::new(2, 0) < MIN_CONFIG_VERSION);
        assert!(ConfigVersion::new(2, 3) > MIN_CONFIG_VERSION);
    }

    #[test]
    fn displays_keep_order() {
        let c = config();
        let d = c.display("LED Wall").unwrap();
        assert_eq!(d.views[0].name, "Calibrated");
        assert_eq!(c.view("LED Wall", "Raw").unwrap().colorspace, "ACES2065-1");
        assert!(matches!(
            c.view("LED Wall", "Film"),
            Err(OcioError::ViewNotFound { .. })
        ));
        assert!(matches!(
            c.view("Projector", "Raw"),
            Err(OcioError::DisplayNotFound { .. })
        ));
    }

    #[test]
    fn conversion_goes_through_reference() {
        let c = config();
        let g = c.conversion("ACEScg", "Wall1 Calibrated").unwrap();
        assert_eq!(g.len(), 2);
        assert!(c.conversion("ACEScg", "ACEScg").unwrap().is_empty());
        assert!(matches!(
            c.conversion("sRGB", "ACEScg"),
            Err(OcioError::ColorSpaceNotFound { .. })
        ));
    }
}
