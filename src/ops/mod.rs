//! High-level operations.
//!
//! This module contains the implementation of Quay commands.

pub mod quay_build;
pub mod quay_clean;

pub use quay_build::{build, prepare_dirs, BuildOptions, BuildResult};
pub use quay_clean::clean;
