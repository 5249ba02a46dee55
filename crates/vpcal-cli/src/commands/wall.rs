//! Wall settings commands

use crate::{WallAddArgs, WallCommand, WallLinkArgs, WallNameArgs, WallRenameArgs, WallSetArgs, WallShowArgs};
use anyhow::{Context, Result};
use tracing::info;
use vpcal_core::{WallField, WallSettings};

pub fn run(cmd: WallCommand, verbose: bool) -> Result<()> {
    match cmd {
        WallCommand::Add(args) => add(args),
        WallCommand::Set(args) => set(args),
        WallCommand::Show(args) => show(args, verbose),
        WallCommand::Link(args) => link(args),
        WallCommand::Unlink(args) => unlink(args),
        WallCommand::Rename(args) => rename(args),
        WallCommand::Remove(args) => remove(args),
    }
}

fn add(args: WallAddArgs) -> Result<()> {
    let mut project = super::load_or_new_project(&args.project)?;
    match &args.verification_of {
        Some(primary) => {
            project
                .add_verification_wall(primary, &args.name)
                .with_context(|| format!("Failed to add verification wall '{}'", args.name))?;
            info!(wall = %args.name, %primary, "added verification wall");
        }
        None => {
            project
                .add_wall(&args.name)
                .with_context(|| format!("Failed to add wall '{}'", args.name))?;
            info!(wall = %args.name, "added wall");
        }
    }
    super::save_project(&args.project, &project)
}

fn set(args: WallSetArgs) -> Result<()> {
    let mut project = super::load_project(&args.project)?;
    project
        .set_str(&args.wall, &args.key, &args.value)
        .with_context(|| format!("Failed to set {} on '{}'", args.key, args.wall))?;
    super::save_project(&args.project, &project)
}

fn show(args: WallShowArgs, verbose: bool) -> Result<()> {
    let project = super::load_project(&args.project)?;
    let walls: Vec<&WallSettings> = match &args.wall {
        Some(name) => vec![project.wall(name)?],
        None => project.walls().collect(),
    };

    if args.json {
        let json: Vec<serde_json::Value> = walls
            .iter()
            .map(|w| serde_json::to_value(w))
            .collect::<Result<_, _>>()?;
        println!("{}", serde_json::to_string_pretty(&json)?);
        return Ok(());
    }

    for wall in walls {
        print_wall(wall, verbose);
    }
    Ok(())
}

/// Prints a wall; only the key settings unless verbose.
fn print_wall(wall: &WallSettings, verbose: bool) {
    let role = if wall.is_verification_wall() {
        format!(" (verifies {})", wall.verification_wall())
    } else if !wall.verification_wall().is_empty() {
        format!(" (verified by {})", wall.verification_wall())
    } else {
        String::new()
    };
    println!("{}{}", wall.name(), role);

    let fields: &[WallField] = if verbose {
        WallField::ALL
    } else {
        &[
            WallField::CalculationOrder,
            WallField::TargetMaxLumNits,
            WallField::TargetGamut,
            WallField::TargetEotf,
            WallField::EnableEotfCorrection,
            WallField::EnableGamutCompression,
        ]
    };
    for field in fields.iter().filter(|f| **f != WallField::Name) {
        println!("  {:<26} {}", field.as_str(), wall.get(*field));
    }
}

fn link(args: WallLinkArgs) -> Result<()> {
    let mut project = super::load_project(&args.project)?;
    project
        .link_verification_wall(&args.primary, &args.verification)
        .with_context(|| format!("Failed to link '{}' to '{}'", args.verification, args.primary))?;
    super::save_project(&args.project, &project)
}

fn unlink(args: WallNameArgs) -> Result<()> {
    let mut project = super::load_project(&args.project)?;
    project.unlink_verification_wall(&args.name)?;
    super::save_project(&args.project, &project)
}

fn rename(args: WallRenameArgs) -> Result<()> {
    let mut project = super::load_project(&args.project)?;
    project
        .rename_wall(&args.old, &args.new)
        .with_context(|| format!("Failed to rename '{}'", args.old))?;
    super::save_project(&args.project, &project)
}

fn remove(args: WallNameArgs) -> Result<()> {
    let mut project = super::load_project(&args.project)?;
    project.remove_wall(&args.name)?;
    info!(wall = %args.name, "removed wall");
    super::save_project(&args.project, &project)
}
