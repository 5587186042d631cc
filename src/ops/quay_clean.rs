//! Implementation of `quay clean`.

use anyhow::Result;

use crate::core::manifest::ProjectConfig;
use crate::util::fs::remove_dir_all_if_exists;
use crate::util::shell::{Shell, Status};

/// Remove the build directory and every per-profile target directory.
///
/// Directories that do not exist are skipped, so cleaning twice is fine.
/// Returns how many directories were actually removed.
pub fn clean(config: &ProjectConfig, shell: &Shell) -> Result<usize> {
    let mut removed = 0;

    for dir in config.cleanup_dirs() {
        if remove_dir_all_if_exists(dir)? {
            shell.status(Status::Removed, dir.display());
            removed += 1;
        } else {
            tracing::debug!("{} does not exist, skipping", dir.display());
        }
    }

    if removed == 0 {
        shell.note("nothing to clean");
    }

    Ok(removed)
}
