//! 3D LUT bake command

use crate::BakeArgs;
use anyhow::{Context, Result};
use tracing::debug;
use vpcal_ocio::{BakeFormat, BakeRequest, ColourBackend, NativeBackend};

pub fn run(args: BakeArgs, verbose: bool) -> Result<()> {
    let format: BakeFormat = args.format.parse()?;
    let backend = NativeBackend::from_file(&args.config)
        .with_context(|| format!("Failed to load config: {}", args.config.display()))?;

    if verbose {
        let desc = backend.describe();
        debug!(
            colour_spaces = desc.colour_spaces.len(),
            displays = desc.displays.len(),
            "config loaded"
        );
    }

    let request = BakeRequest {
        input_colour_space: args.input,
        display: args.display,
        view: args.view,
        cube_size: args.size,
        format,
        output: args.output,
    };
    let path = backend.bake_3d_lut(&request)?;
    println!("{}", path.display());
    Ok(())
}
