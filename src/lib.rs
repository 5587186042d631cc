//! Quay - a declarative build orchestrator for C and C++ projects
//!
//! This crate provides the core library functionality for Quay: loading
//! and resolving a project's build file, planning compiler invocations per
//! profile, and running them.

pub mod builder;
pub mod core;
pub mod ops;
pub mod util;

/// Test utilities and mocks for Quay unit tests.
///
/// This module is only available when compiling with `--cfg test` or
/// running tests. It provides a scripted process executor and on-disk
/// project fixtures.
#[cfg(test)]
pub mod test_support;

pub use builder::{BuildOutcome, BuildPlan, NativeBuilder};
pub use core::{ConfigError, ProjectConfig};
pub use util::Shell;
