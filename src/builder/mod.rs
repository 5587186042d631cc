//! C/C++ build system.
//!
//! This module implements build planning and the native compiler driver.

pub mod artifact;
pub mod native;
pub mod plan;

pub use native::{BuildOutcome, CompileResult, LinkResult, NativeBuilder};
pub use plan::BuildPlan;
