//! CLI command implementations

pub mod assemble;
pub mod bake;
pub mod recommend;
pub mod validate;
pub mod wall;

use anyhow::{Context, Result};
use std::path::Path;
use vpcal_core::{CalibrationResults, Project};

/// Load a project file
pub fn load_project(path: &Path) -> Result<Project> {
    Project::load(path).with_context(|| format!("Failed to load project: {}", path.display()))
}

/// Load a project file, or start an empty project if it doesn't exist yet
pub fn load_or_new_project(path: &Path) -> Result<Project> {
    if path.exists() {
        load_project(path)
    } else {
        Ok(Project::new())
    }
}

/// Save a project file
pub fn save_project(path: &Path, project: &Project) -> Result<()> {
    project
        .save(path)
        .with_context(|| format!("Failed to save project: {}", path.display()))
}

/// Load a calibration results file
pub fn load_results(path: &Path) -> Result<CalibrationResults> {
    CalibrationResults::load(path)
        .with_context(|| format!("Failed to load results: {}", path.display()))
}
