//! Validation command

use crate::ValidateArgs;
use anyhow::{Result, bail};
use vpcal_engine::{run_validations, ValidationStatus};

pub fn run(args: ValidateArgs, verbose: bool) -> Result<()> {
    let results = super::load_results(&args.results)?;
    let report = run_validations(&results);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for check in &report {
            println!("[{:<7}] {}", check.status.as_str(), check.name);
            if !check.message.is_empty() && (verbose || check.status != ValidationStatus::Pass) {
                for line in check.message.lines() {
                    println!("          {line}");
                }
            }
        }
    }

    let failed = report
        .iter()
        .filter(|r| r.status == ValidationStatus::Fail)
        .count();
    if args.strict && failed > 0 {
        bail!("{failed} validation check(s) failed");
    }
    Ok(())
}
