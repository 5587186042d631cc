//! `quay build` command

use anyhow::Result;

use crate::cli::BuildArgs;
use quay::core::ProjectConfig;
use quay::ops::{build, BuildOptions};
use quay::util::{Shell, SystemExecutor};

pub fn execute(args: BuildArgs, shell: &Shell) -> Result<()> {
    let mut config = ProjectConfig::load(&args.config, shell)?;

    let opts = BuildOptions {
        jobs: args.jobs,
        emit_plan: args.plan,
        emit_compile_commands: args.emit_compile_commands,
    };

    let result = build(&mut config, &args.profile, &opts, shell, &SystemExecutor)?;

    if args.plan {
        println!("{}", result.plan.to_json()?);
    }

    // Compile and link failures were already reported; the process still
    // exits successfully.
    if let Some(outcome) = &result.outcome {
        tracing::debug!("build outcome: {:?}", outcome);
    }

    Ok(())
}
