//! Implementation of `quay build`.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::Result;

use crate::builder::{BuildOutcome, BuildPlan, NativeBuilder};
use crate::core::manifest::ProjectConfig;
use crate::util::fs::{ensure_dir, ensure_dir_single};
use crate::util::process::ProcessExecutor;
use crate::util::shell::{format_duration, Shell, Status};

/// Options for the build command.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Number of sources compiled concurrently
    pub jobs: usize,

    /// Stop after planning; nothing is created or run
    pub emit_plan: bool,

    /// Write `compile_commands.json` into the build directory
    pub emit_compile_commands: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        BuildOptions {
            jobs: 1,
            emit_plan: false,
            emit_compile_commands: false,
        }
    }
}

/// Build result.
#[derive(Debug)]
pub struct BuildResult {
    /// Profile the build ran with, after any fallback
    pub profile: String,

    /// The executed (or only planned) build
    pub plan: BuildPlan,

    /// `None` when only the plan was requested
    pub outcome: Option<BuildOutcome>,

    /// Path of the written compilation database, if any
    pub compile_commands: Option<PathBuf>,
}

/// Create the build directory and every per-profile target directory.
///
/// The build directory is created on its own and its parent must already
/// exist. Target directories get any missing parents. Existing directories
/// are left alone.
pub fn prepare_dirs(config: &ProjectConfig, shell: &Shell) -> Result<()> {
    let build = &config.dirs().build;
    if !build.exists() {
        ensure_dir_single(build)?;
        shell.status(Status::Created, build.display());
    }

    for dir in config.dirs().target_dirs() {
        if !dir.exists() {
            ensure_dir(dir)?;
            shell.status(Status::Created, dir.display());
        }
    }

    Ok(())
}

/// Build the project with `profile`.
///
/// Unknown profiles fall back to the first configured one. Compile and link
/// failures are reported through the shell and returned in the outcome;
/// only configuration and filesystem problems are errors.
pub fn build(
    config: &mut ProjectConfig,
    profile: &str,
    opts: &BuildOptions,
    shell: &Shell,
    executor: &dyn ProcessExecutor,
) -> Result<BuildResult> {
    let profile = config.set_active_profile(profile, shell)?.to_string();
    let plan = BuildPlan::new(config, &profile)?;

    if opts.emit_plan {
        return Ok(BuildResult {
            profile,
            plan,
            outcome: None,
            compile_commands: None,
        });
    }

    let start = Instant::now();
    prepare_dirs(config, shell)?;

    let compile_commands = if opts.emit_compile_commands {
        let path = plan.write_compile_commands()?;
        shell.status(Status::Created, path.display());
        Some(path)
    } else {
        None
    };

    let outcome = NativeBuilder::new(shell, executor)
        .jobs(opts.jobs)
        .build(&plan)?;

    if outcome.is_success() {
        shell.status(
            Status::Finished,
            format!(
                "\"{}\" profile in {}",
                profile,
                format_duration(start.elapsed())
            ),
        );
    }

    Ok(BuildResult {
        profile,
        plan,
        outcome: Some(outcome),
        compile_commands,
    })
}
