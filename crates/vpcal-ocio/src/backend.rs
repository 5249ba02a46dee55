//! Colour-management capability used by the calibration engine.
//!
//! The engine only needs three things from a colour-management system:
//! what it offers ([`ColourBackend::describe`]), running a transform group
//! on pixels ([`ColourBackend::execute`]) and baking a display pipeline to a
//! 3D LUT ([`ColourBackend::bake_3d_lut`]). [`NativeBackend`] provides them
//! in-process on top of [`Config`], [`Processor`] and [`Baker`].

use std::path::PathBuf;

use tracing::{debug, info};

use crate::baker::{check_cube_size, BakeFormat, Baker};
use crate::config::{Config, MIN_CONFIG_VERSION};
use crate::error::{OcioError, OcioResult};
use crate::processor::Processor;
use crate::transform::{GroupTransform, Transform, TransformDirection};

/// A display and its view names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayDescription {
    /// Display name.
    pub name: String,
    /// View names.
    pub views: Vec<String>,
}

/// What a backend offers.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BackendDescription {
    /// Colour space names.
    pub colour_spaces: Vec<String>,
    /// Displays with their views.
    pub displays: Vec<DisplayDescription>,
}

/// Parameters of a 3D LUT bake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BakeRequest {
    /// Input colour space name.
    pub input_colour_space: String,
    /// Display name.
    pub display: String,
    /// View name on that display.
    pub view: String,
    /// Cube edge length.
    pub cube_size: usize,
    /// Output format.
    pub format: BakeFormat,
    /// Output file.
    pub output: PathBuf,
}

impl BakeRequest {
    /// Default cube edge length.
    pub const DEFAULT_CUBE_SIZE: usize = 64;
}

/// Narrow colour-management capability.
pub trait ColourBackend: Send + Sync {
    /// Colour spaces, displays and views available.
    fn describe(&self) -> BackendDescription;

    /// Runs `group` over `pixels` in place.
    fn execute(&self, group: &GroupTransform, pixels: &mut [[f32; 3]]) -> OcioResult<()>;

    /// Bakes the `input` to `display`/`view` pipeline and returns the
    /// written path.
    fn bake_3d_lut(&self, request: &BakeRequest) -> OcioResult<PathBuf>;
}

/// In-process backend over a parsed [`Config`].
#[derive(Debug, Clone)]
pub struct NativeBackend {
    config: Config,
}

impl NativeBackend {
    /// Wraps a config. Configs older than [`MIN_CONFIG_VERSION`] are
    /// refused.
    pub fn new(config: Config) -> OcioResult<Self> {
        if config.version() < MIN_CONFIG_VERSION {
            return Err(OcioError::UnsupportedVersion {
                version: config.version().to_string(),
                minimum: MIN_CONFIG_VERSION,
            });
        }
        debug!(version = %config.version(), "native backend ready");
        Ok(Self { config })
    }

    /// Loads a config file and wraps it.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> OcioResult<Self> {
        Self::new(Config::from_file(path)?)
    }

    /// The wrapped config.
    pub fn config(&self) -> &Config {
        &self.config
    }
}

impl ColourBackend for NativeBackend {
    fn describe(&self) -> BackendDescription {
        BackendDescription {
            colour_spaces: self
                .config
                .colorspaces()
                .iter()
                .map(|cs| cs.name.clone())
                .collect(),
            displays: self
                .config
                .displays()
                .iter()
                .map(|d| DisplayDescription {
                    name: d.name.clone(),
                    views: d.views.iter().map(|v| v.name.clone()).collect(),
                })
                .collect(),
        }
    }

    fn execute(&self, group: &GroupTransform, pixels: &mut [[f32; 3]]) -> OcioResult<()> {
        let transform = Transform::Group(group.clone());
        let processor = Processor::from_transform_in(&self.config, &transform, TransformDirection::Forward)?;
        processor.apply_rgb(pixels);
        Ok(())
    }

    fn bake_3d_lut(&self, request: &BakeRequest) -> OcioResult<PathBuf> {
        if self.config.colorspace(&request.input_colour_space).is_none() {
            return Err(OcioError::ColorSpaceNotFound {
                name: request.input_colour_space.clone(),
            });
        }
        self.config.view(&request.display, &request.view)?;
        check_cube_size(request.cube_size)?;

        let processor = self.config.display_processor(
            &request.input_colour_space,
            &request.display,
            &request.view,
        )?;
        Baker::new(&processor).write(&request.output, request.cube_size, request.format)?;
        info!(
            input = %request.input_colour_space,
            display = %request.display,
            view = %request.view,
            "bake complete"
        );
        Ok(request.output.clone())
    }
}
