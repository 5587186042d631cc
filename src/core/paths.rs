//! Project path resolution.
//!
//! Paths in a build file are either absolute or relative to the project root.
//! Directories are resolved optimistically (they may be created later by
//! `prepare_dirs`), explicitly absolute files strictly (a typo must surface
//! before the compiler runs).

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::core::errors::{ConfigError, PathKind};

/// Result of resolving one path against a root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved {
    /// Absolute path that exists, returned unchanged.
    Existing(PathBuf),
    /// Relative path joined to the root. Existence was not checked.
    Joined(PathBuf),
    /// Absolute path that does not exist.
    Missing(PathBuf),
}

/// Canonicalizes declared paths against a project root.
#[derive(Debug, Clone)]
pub struct PathResolver {
    root: PathBuf,
}

impl PathResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        PathResolver { root: root.into() }
    }

    /// Classify `path` against the resolver's root.
    pub fn resolve(&self, path: &Path) -> Resolved {
        resolve_against(path, &self.root)
    }

    /// Resolve a directory. An absolute directory that does not exist yet is
    /// kept as declared.
    pub fn resolve_dir(&self, path: &Path) -> PathBuf {
        match self.resolve(path) {
            Resolved::Existing(p) | Resolved::Joined(p) => p,
            Resolved::Missing(p) => {
                tracing::debug!("directory {} does not exist yet", p.display());
                p
            }
        }
    }
}

/// Resolve `path` against `root`.
///
/// Absolute and existing: unchanged. Absolute and missing: [`Resolved::Missing`].
/// Relative: `root/path`, without touching the filesystem.
pub fn resolve_against(path: &Path, root: &Path) -> Resolved {
    if path.is_absolute() {
        if path.exists() {
            Resolved::Existing(path.to_path_buf())
        } else {
            Resolved::Missing(path.to_path_buf())
        }
    } else {
        Resolved::Joined(root.join(path))
    }
}

/// Resolve a build file under `base`, failing on a missing absolute path.
pub fn resolve_file(path: &Path, base: &Path) -> Result<PathBuf, ConfigError> {
    match resolve_against(path, base) {
        Resolved::Existing(p) | Resolved::Joined(p) => Ok(p),
        Resolved::Missing(p) => Err(ConfigError::path_not_found(p, PathKind::File)),
    }
}

/// Directories as declared under `project.dirs`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawDirs {
    pub source: Option<PathBuf>,
    pub include: Option<PathBuf>,
    pub build: Option<PathBuf>,
    pub deps: Option<PathBuf>,
    pub target: Option<PathBuf>,
}

/// The output directory, before and after per-profile expansion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetDirs {
    /// The single declared `target` directory.
    Single(PathBuf),
    /// One `target/<profile>` directory per profile, in profile order.
    PerProfile(Vec<(String, PathBuf)>),
}

/// The resolved project directories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectorySet {
    pub source: PathBuf,
    pub include: PathBuf,
    pub build: PathBuf,
    pub deps: PathBuf,
    pub target: TargetDirs,
}

impl DirectorySet {
    /// Resolve every declared directory. All five names are required.
    pub fn resolve(raw: &RawDirs, resolver: &PathResolver) -> Result<Self, ConfigError> {
        let required = |value: &Option<PathBuf>, name: &str| -> Result<PathBuf, ConfigError> {
            value
                .as_deref()
                .map(|p| resolver.resolve_dir(p))
                .ok_or_else(|| ConfigError::MissingKey {
                    key: format!("project:dirs:{}", name),
                })
        };

        Ok(DirectorySet {
            source: required(&raw.source, "source")?,
            include: required(&raw.include, "include")?,
            build: required(&raw.build, "build")?,
            deps: required(&raw.deps, "deps")?,
            target: TargetDirs::Single(required(&raw.target, "target")?),
        })
    }

    /// Replace the single target directory with `target/<profile>` entries.
    ///
    /// Expanding an already expanded set is a no-op.
    pub fn expand_target<'a>(&mut self, profiles: impl IntoIterator<Item = &'a str>) {
        if let TargetDirs::Single(base) = &self.target {
            let expanded = profiles
                .into_iter()
                .map(|name| (name.to_string(), base.join(name)))
                .collect();
            self.target = TargetDirs::PerProfile(expanded);
        }
    }

    /// Output directory for `profile`, once expanded.
    pub fn target_dir(&self, profile: &str) -> Option<&Path> {
        match &self.target {
            TargetDirs::Single(_) => None,
            TargetDirs::PerProfile(dirs) => dirs
                .iter()
                .find(|(name, _)| name == profile)
                .map(|(_, path)| path.as_path()),
        }
    }

    /// Every target directory (one entry before expansion).
    pub fn target_dirs(&self) -> Vec<&Path> {
        match &self.target {
            TargetDirs::Single(path) => vec![path.as_path()],
            TargetDirs::PerProfile(dirs) => dirs.iter().map(|(_, p)| p.as_path()).collect(),
        }
    }
}

/// Build files as declared under `project.setup.files`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawFiles {
    #[serde(default)]
    pub sources: Vec<PathBuf>,
    #[serde(default)]
    pub include: Vec<PathBuf>,
}

/// Resolved source and header files, in declared order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileSet {
    pub sources: Vec<PathBuf>,
    pub include: Vec<PathBuf>,
}

impl FileSet {
    /// Sources resolve under `dirs.source`, headers under `dirs.include`.
    pub fn resolve(raw: &RawFiles, dirs: &DirectorySet) -> Result<Self, ConfigError> {
        let sources = raw
            .sources
            .iter()
            .map(|p| resolve_file(p, &dirs.source))
            .collect::<Result<Vec<_>, _>>()?;
        let include = raw
            .include
            .iter()
            .map(|p| resolve_file(p, &dirs.include))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(FileSet { sources, include })
    }
}
