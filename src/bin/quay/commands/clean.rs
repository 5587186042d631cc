//! `quay clean` command

use anyhow::Result;

use crate::cli::CleanArgs;
use quay::core::ProjectConfig;
use quay::ops::clean;
use quay::util::Shell;

pub fn execute(args: CleanArgs, shell: &Shell) -> Result<()> {
    let config = ProjectConfig::load(&args.config, shell)?;
    clean(&config, shell)?;
    Ok(())
}
