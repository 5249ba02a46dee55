//! Pipeline assembly command
//!
//! Writes the sidecar LUT and a YAML description of the stage group next
//! to it, named after the wall and its calculation order.

use crate::AssembleArgs;
use anyhow::{Context, Result};
use std::fs;
use tracing::{info, warn};
use vpcal_engine::Assembler;

pub fn run(args: AssembleArgs, verbose: bool) -> Result<()> {
    let project = super::load_project(&args.project)?;
    let wall = project.wall(&args.wall)?;
    let results = super::load_results(&args.results)?;

    let assembled = Assembler::new(wall, &results)
        .assemble(&args.output)
        .with_context(|| format!("Failed to assemble '{}'", args.wall))?;

    for issue in &assembled.curve_issues {
        warn!(wall = %args.wall, "{issue}");
    }

    let yaml = assembled.to_yaml()?;
    let yaml_path = args
        .output
        .join(format!("{}_{}.yaml", wall.name(), wall.calculation_order()));
    fs::write(&yaml_path, &yaml)
        .with_context(|| format!("Failed to write {}", yaml_path.display()))?;
    info!(path = %yaml_path.display(), "wrote pipeline description");

    if verbose {
        print!("{yaml}");
    }
    if let Some(lut) = &assembled.lut_path {
        println!("{}", lut.display());
    }
    println!("{}", yaml_path.display());
    Ok(())
}
