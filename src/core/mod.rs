//! Core data structures for Quay.
//!
//! This module contains the foundational types used throughout Quay:
//! - The parsed build file and its key lookups
//! - Directory, file and dependency resolution
//! - Profiles and the resolved project configuration

pub mod dependency;
pub mod document;
pub mod errors;
pub mod manifest;
pub mod paths;
pub mod profile;

pub use dependency::{Dependency, DependencySpec, DependencyTable, ResolvedDependencies};
pub use document::ConfigDocument;
pub use errors::{ConfigError, PathKind};
pub use manifest::{ProjectConfig, ProjectMetadata};
pub use paths::{DirectorySet, FileSet, TargetDirs};
pub use profile::{Profile, ProfileFlags, ProfileSelector};
