//! Configuration resolution errors.
//!
//! Everything here is fatal: it aborts resolution before any compiler runs.
//! Per-file compile and link failures are not errors, see
//! [`crate::builder::BuildOutcome`].

use std::path::PathBuf;

use miette::Diagnostic as MietteDiagnostic;
use thiserror::Error;

use crate::util::diagnostic::Diagnostic;

/// What kind of declared path failed to resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathKind {
    /// An explicitly absolute entry of `project.setup.files`.
    File,
    /// A `paths` entry of a system-wide dependency that does not exist.
    SystemDependency,
    /// A `paths` entry of a system-wide dependency that is not absolute.
    RelativeSystemDependency,
}

impl PathKind {
    fn describe(&self) -> &'static str {
        match self {
            PathKind::File => "file",
            PathKind::SystemDependency => "system-wide dependency path",
            PathKind::RelativeSystemDependency => "system-wide dependency path (must be absolute)",
        }
    }
}

/// Error raised while loading or resolving a project configuration.
#[derive(Debug, Error, MietteDiagnostic)]
pub enum ConfigError {
    #[error("unable to load configuration file `{}`: {message}", path.display())]
    #[diagnostic(
        code(quay::config::load),
        help("Check that the file exists and is a valid TOML document")
    )]
    Load { path: PathBuf, message: String },

    #[error("required key `{key}` not found in build file")]
    #[diagnostic(code(quay::config::missing_key))]
    MissingKey { key: String },

    #[error("invalid value for `{key}`: {message}")]
    #[diagnostic(code(quay::config::invalid))]
    Invalid { key: String, message: String },

    #[error("{} `{}` not found", kind.describe(), path.display())]
    #[diagnostic(
        code(quay::config::path_not_found),
        help("Absolute paths must exist; relative paths are resolved against the project")
    )]
    PathNotFound { path: PathBuf, kind: PathKind },

    #[error("no build profiles configured under `project.setup.profiles`")]
    #[diagnostic(code(quay::config::no_profiles))]
    NoProfiles,

    #[error("no compiler configured under `project.setup.compiler`")]
    #[diagnostic(code(quay::config::no_compiler))]
    NoCompiler,
}

impl ConfigError {
    /// Shorthand for [`ConfigError::PathNotFound`].
    pub fn path_not_found(path: impl Into<PathBuf>, kind: PathKind) -> Self {
        ConfigError::PathNotFound {
            path: path.into(),
            kind,
        }
    }

    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let mut diag = Diagnostic::error(self.to_string());
        if let Some(code) = MietteDiagnostic::code(self) {
            diag = diag.with_context(format!("[{}]", code));
        }
        if let Some(help) = MietteDiagnostic::help(self) {
            diag = diag.with_suggestion(help.to_string());
        }
        match self {
            ConfigError::Load { path, .. } => diag.with_location(path.clone()),
            ConfigError::MissingKey { key } => diag
                .with_context(format!("`{}` has no default", key))
                .with_suggestion(format!("Add `{}` to the configuration file", key)),
            ConfigError::Invalid { key, .. } => {
                diag.with_suggestion(format!("Check the type of `{}`", key))
            }
            ConfigError::PathNotFound { path, kind } => {
                let diag = diag.with_location(path.clone());
                match kind {
                    PathKind::File => diag.with_suggestion(
                        "Use a path relative to the source or include directory",
                    ),
                    PathKind::SystemDependency | PathKind::RelativeSystemDependency => diag
                        .with_suggestion("Install the package or set `system_wide = false`"),
                }
            }
            ConfigError::NoProfiles => diag.with_suggestion(
                "Add a profile, e.g. `debug = [\"-g\"]` under [project.setup.profiles]",
            ),
            ConfigError::NoCompiler => {
                diag.with_suggestion("Set `compiler = \"cc\"` under [project.setup]")
            }
        }
    }
}
