//! vpcal - LED wall calibration CLI
//!
//! Manages wall settings, validates measurement results, assembles the
//! calibration pipeline and bakes display LUTs.

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "vpcal")]
#[command(author, version, about = "LED wall calibration transform & validation")]
#[command(long_about = "
Turns LED wall measurements into a deployable calibration pipeline.

Examples:
  vpcal wall add project.json Wall1
  vpcal wall add project.json Wall1_verify --verification-of Wall1
  vpcal wall set project.json Wall1 target_max_lum_nits 1500
  vpcal wall show project.json Wall1
  vpcal validate Wall1_results.json
  vpcal recommend Wall1_results.json --apply project.json --wall Wall1
  vpcal assemble project.json Wall1 Wall1_results.json -o out/
  vpcal bake -c config.ocio -i ACEScg -d 'LED Wall' -V Wall1 -o wall1.cube
")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output (debug logging)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Create, edit and inspect walls in a project file
    #[command(subcommand)]
    Wall(WallCommand),

    /// Run the validation checks on a results file
    #[command(visible_alias = "v")]
    Validate(ValidateArgs),

    /// Recommend settings from a results file
    Recommend(RecommendArgs),

    /// Assemble a wall's calibration pipeline and write its sidecar LUT
    #[command(visible_alias = "a")]
    Assemble(AssembleArgs),

    /// Bake a display pipeline to a 3D LUT
    #[command(visible_alias = "b")]
    Bake(BakeArgs),
}

#[derive(Subcommand)]
enum WallCommand {
    /// Add a wall (the project file is created if missing)
    Add(WallAddArgs),

    /// Set one setting; mirrored settings follow to the verification wall
    Set(WallSetArgs),

    /// Show walls and their settings
    Show(WallShowArgs),

    /// Pair a primary wall with a verification wall
    Link(WallLinkArgs),

    /// Break a primary/verification pairing
    Unlink(WallNameArgs),

    /// Rename a wall and every link to it
    Rename(WallRenameArgs),

    /// Remove a wall and every link to it
    Remove(WallNameArgs),
}

#[derive(Args)]
struct WallAddArgs {
    /// Project file
    project: PathBuf,

    /// New wall name
    name: String,

    /// Add as the verification wall of this primary
    #[arg(long)]
    verification_of: Option<String>,
}

#[derive(Args)]
struct WallSetArgs {
    /// Project file
    project: PathBuf,

    /// Wall name
    wall: String,

    /// Setting key, e.g. target_max_lum_nits
    key: String,

    /// Value; lists are comma separated
    value: String,
}

#[derive(Args)]
struct WallShowArgs {
    /// Project file
    project: PathBuf,

    /// Only this wall
    wall: Option<String>,

    /// Machine-readable output (JSON)
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct WallLinkArgs {
    /// Project file
    project: PathBuf,

    /// Primary wall
    primary: String,

    /// Verification wall
    verification: String,
}

#[derive(Args)]
struct WallNameArgs {
    /// Project file
    project: PathBuf,

    /// Wall name
    name: String,
}

#[derive(Args)]
struct WallRenameArgs {
    /// Project file
    project: PathBuf,

    /// Current name
    old: String,

    /// New name
    new: String,
}

#[derive(Args)]
struct ValidateArgs {
    /// Calibration results file
    results: PathBuf,

    /// Machine-readable output (JSON)
    #[arg(long)]
    json: bool,

    /// Exit with an error if any check fails
    #[arg(long)]
    strict: bool,
}

#[derive(Args)]
struct RecommendArgs {
    /// Calibration results file
    results: PathBuf,

    /// Write the recommendations into this project file
    #[arg(long, requires = "wall")]
    apply: Option<PathBuf>,

    /// Wall to apply the recommendations to
    #[arg(long)]
    wall: Option<String>,
}

#[derive(Args)]
struct AssembleArgs {
    /// Project file
    project: PathBuf,

    /// Wall name
    wall: String,

    /// Calibration results file
    results: PathBuf,

    /// Output folder for the sidecar LUT and pipeline description
    #[arg(short, long)]
    output: PathBuf,
}

#[derive(Args)]
struct BakeArgs {
    /// OCIO config file
    #[arg(short, long)]
    config: PathBuf,

    /// Input colour space
    #[arg(short, long)]
    input: String,

    /// Display name
    #[arg(short, long)]
    display: String,

    /// View name
    #[arg(short = 'V', long)]
    view: String,

    /// Cube edge length
    #[arg(short, long, default_value_t = vpcal_ocio::BakeRequest::DEFAULT_CUBE_SIZE)]
    size: usize,

    /// Output format: resolve_cube, clf
    #[arg(short, long, default_value = "resolve_cube")]
    format: String,

    /// Output file
    #[arg(short, long)]
    output: PathBuf,
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Wall(cmd) => commands::wall::run(cmd, cli.verbose),
        Commands::Validate(args) => commands::validate::run(args, cli.verbose),
        Commands::Recommend(args) => commands::recommend::run(args, cli.verbose),
        Commands::Assemble(args) => commands::assemble::run(args, cli.verbose),
        Commands::Bake(args) => commands::bake::run(args, cli.verbose),
    }
}
