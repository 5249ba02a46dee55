//! Settings recommendation command

use crate::RecommendArgs;
use anyhow::{Context, Result};
use vpcal_engine::{apply, recommend};

pub fn run(args: RecommendArgs, _verbose: bool) -> Result<()> {
    let results = super::load_results(&args.results)?;
    let recs = recommend(&results);

    for rec in &recs {
        println!("{} = {}", rec.field, rec.value);
    }

    if let (Some(path), Some(wall)) = (&args.apply, &args.wall) {
        let mut project = super::load_project(path)?;
        apply(&mut project, wall, &recs)
            .with_context(|| format!("Failed to apply recommendations to '{wall}'"))?;
        super::save_project(path, &project)?;
    }
    Ok(())
}
