//! Project configuration loading and resolution.
//!
//! [`ProjectConfig::load`] turns a build file into a fully resolved project:
//! absolute directories, resolved source/header lists, dependency switches,
//! per-profile flags and per-profile output directories. Every step may fail
//! fast and abort the ones after it.

use std::path::{Path, PathBuf};

use semver::Version;

use crate::core::dependency::{
    include_switches, library_switches, DependencyTable, ResolvedDependencies,
};
use crate::core::document::ConfigDocument;
use crate::core::errors::ConfigError;
use crate::core::paths::{DirectorySet, FileSet, PathResolver, RawDirs, RawFiles};
use crate::core::profile::{ProfileFlags, ProfileSelector};
use crate::util::shell::{Shell, Status};

/// Human-facing project metadata. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectMetadata {
    pub name: Option<String>,
    pub authors: Vec<String>,
    pub version: Option<String>,
    pub language: Option<String>,
}

impl ProjectMetadata {
    /// Parse the version string as semver.
    pub fn semver(&self) -> Option<Version> {
        self.version.as_deref().and_then(|v| Version::parse(v).ok())
    }
}

/// A fully resolved project configuration.
#[derive(Debug, Clone)]
pub struct ProjectConfig {
    config_path: PathBuf,
    root: PathBuf,
    metadata: ProjectMetadata,
    dirs: DirectorySet,
    files: FileSet,
    build_type: Option<String>,
    compiler: Option<String>,
    profiles: ProfileFlags,
    dependencies: ResolvedDependencies,
    include_dirs: Vec<PathBuf>,
    library_dirs: Vec<PathBuf>,
    linker_args: Vec<String>,
    include_switches: Vec<String>,
    library_switches: Vec<String>,
    cleanup_dirs: Vec<PathBuf>,
    active_profile: Option<String>,
}

impl ProjectConfig {
    /// Load and resolve the build file at `path`.
    ///
    /// All relative paths in the file are relative to the directory that
    /// contains it.
    pub fn load(path: &Path, shell: &Shell) -> Result<Self, ConfigError> {
        shell.status(Status::Resolving, format!("configuration {}", path.display()));

        let config_path = path.canonicalize().map_err(|e| ConfigError::Load {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let doc = ConfigDocument::load(&config_path)?;
        let root = config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("/"));

        Self::from_document(&doc, root, shell)
    }

    /// Resolve an already parsed document against `root`.
    pub fn from_document(
        doc: &ConfigDocument,
        root: PathBuf,
        shell: &Shell,
    ) -> Result<Self, ConfigError> {
        // Metadata
        let metadata = ProjectMetadata {
            name: doc.get_as("project:name", shell)?,
            authors: doc.get_as("project:authors", shell)?.unwrap_or_default(),
            version: doc.get_as("project:version", shell)?,
            language: doc.get_as("project:language", shell)?,
        };
        if let Some(version) = metadata.version.as_deref() {
            if metadata.semver().is_none() {
                shell.warn(format!("Project version \"{}\" is not a semantic version", version));
            }
        }

        // Directories
        let resolver = PathResolver::new(&root);
        shell.status(Status::Resolving, "project directories");
        let raw_dirs: RawDirs =
            doc.get_as("project:dirs", shell)?
                .ok_or_else(|| ConfigError::MissingKey {
                    key: "project:dirs".to_string(),
                })?;
        let mut dirs = DirectorySet::resolve(&raw_dirs, &resolver)?;

        // Build files
        shell.status(Status::Resolving, "source and header files");
        let raw_files: RawFiles = doc
            .get_as("project:setup:files", shell)?
            .unwrap_or_default();
        let files = FileSet::resolve(&raw_files, &dirs)?;

        // Build setup
        let build_type: Option<String> = doc.get_as("project:setup:type", shell)?;
        let compiler: Option<String> = doc.get_as("project:setup:compiler", shell)?;
        let profiles = match doc.get_as::<toml::Table>("project:setup:profiles", shell)? {
            Some(table) => ProfileFlags::from_toml(&table)?,
            None => ProfileFlags::default(),
        };

        // Dependencies
        shell.status(Status::Resolving, "dependencies");
        let table = match doc.find_as::<toml::Table>("dependencies", shell)? {
            Some(table) => DependencyTable::from_toml(&table)?,
            None => DependencyTable::default(),
        };
        tracing::debug!("{} dependencies declared", table.len());
        let dependencies = table.resolve(&dirs)?;

        let include_dirs = dependencies.include_dirs(&dirs);
        let library_dirs = dependencies.library_dirs();
        let linker_args = dependencies.linker_args();
        let include_switches = include_switches(&include_dirs);
        let library_switches = library_switches(&library_dirs);

        // Per-profile output directories
        dirs.expand_target(profiles.names());

        let mut cleanup_dirs = vec![dirs.build.clone()];
        cleanup_dirs.extend(dirs.target_dirs().into_iter().map(Path::to_path_buf));

        Ok(ProjectConfig {
            config_path: doc.path().to_path_buf(),
            root,
            metadata,
            dirs,
            files,
            build_type,
            compiler,
            profiles,
            dependencies,
            include_dirs,
            library_dirs,
            linker_args,
            include_switches,
            library_switches,
            cleanup_dirs,
            active_profile: None,
        })
    }

    /// Activate `requested`, falling back to the first profile if unknown.
    pub fn set_active_profile(&mut self, requested: &str, shell: &Shell) -> Result<&str, ConfigError> {
        let active = ProfileSelector::new(shell).select(requested, &self.profiles)?;
        Ok(self.active_profile.insert(active).as_str())
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Directory containing the build file.
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn metadata(&self) -> &ProjectMetadata {
        &self.metadata
    }

    pub fn dirs(&self) -> &DirectorySet {
        &self.dirs
    }

    pub fn files(&self) -> &FileSet {
        &self.files
    }

    pub fn build_type(&self) -> Option<&str> {
        self.build_type.as_deref()
    }

    pub fn compiler(&self) -> Option<&str> {
        self.compiler.as_deref()
    }

    pub fn profiles(&self) -> &ProfileFlags {
        &self.profiles
    }

    pub fn dependencies(&self) -> &ResolvedDependencies {
        &self.dependencies
    }

    pub fn include_dirs(&self) -> &[PathBuf] {
        &self.include_dirs
    }

    pub fn library_dirs(&self) -> &[PathBuf] {
        &self.library_dirs
    }

    pub fn linker_args(&self) -> &[String] {
        &self.linker_args
    }

    /// `-I` switches, dependencies first, then `include` and `source`.
    pub fn include_switches(&self) -> &[String] {
        &self.include_switches
    }

    /// `-L` switches of enabled dependencies.
    pub fn library_switches(&self) -> &[String] {
        &self.library_switches
    }

    /// The build directory followed by every per-profile target directory.
    pub fn cleanup_dirs(&self) -> &[PathBuf] {
        &self.cleanup_dirs
    }

    pub fn active_profile(&self) -> Option<&str> {
        self.active_profile.as_deref()
    }

    /// Name of the linked binary, without extension.
    ///
    /// Falls back to the project directory name when `project.name` is absent.
    pub fn binary_stem(&self) -> String {
        match &self.metadata.name {
            Some(name) => name.clone(),
            None => self
                .root
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "a".to_string()),
        }
    }

    /// `target/<profile>/<name>.<type>` for `profile`.
    pub fn binary_path(&self, profile: &str) -> Option<PathBuf> {
        let dir = self.dirs.target_dir(profile)?;
        let file_name = match &self.build_type {
            Some(ext) if !ext.is_empty() => format!("{}.{}", self.binary_stem(), ext),
            _ => self.binary_stem(),
        };
        Some(dir.join(file_name))
    }
}
