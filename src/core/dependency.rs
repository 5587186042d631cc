//! Dependency tables.
//!
//! A dependency is a prebuilt package the project compiles and links against.
//! It is either project-local (laid out under `<deps>/<name>/`) or system-wide
//! (already installed on the host, declared with absolute paths).
//!
//! ```toml
//! [dependencies.zlib]
//! enabled = true
//! system_wide = false
//! header_only = false
//! paths = { include = "include", lib = "lib" }
//! libs = ["libz.a"]
//! args = ["-lz"]
//! search_paths = { include = "/usr/include", lib = "/usr/lib" }
//! ```
//!
//! Linker arguments are only taken from `header_only` packages. Such a package
//! ships no library for quay to locate, so whatever the linker needs must be
//! spelled out in `args`. This is a configuration convention enforced here,
//! not something the compiler requires.

use std::path::{Path, PathBuf};

use serde::de::{Deserializer, Error as _};
use serde::Deserialize;

use crate::core::errors::{ConfigError, PathKind};
use crate::core::paths::DirectorySet;

/// Key of the include directory in `paths` / `search_paths`.
pub const INCLUDE_KEY: &str = "include";
/// Key of the library directory in `paths` / `search_paths`.
pub const LIB_KEY: &str = "lib";

/// Role to directory map (`paths`, `search_paths`), in declared order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirMap {
    entries: Vec<(String, PathBuf)>,
}

impl DirMap {
    pub fn get(&self, key: &str) -> Option<&Path> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, path)| path.as_path())
    }

    /// Set `key`, keeping its position if it is already present.
    pub fn insert(&mut self, key: impl Into<String>, path: impl Into<PathBuf>) {
        let key = key.into();
        let path = path.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = path,
            None => self.entries.push((key, path)),
        }
    }

    pub fn values(&self) -> impl Iterator<Item = &Path> {
        self.entries.iter().map(|(_, path)| path.as_path())
    }

    fn values_mut(&mut self) -> impl Iterator<Item = &mut PathBuf> {
        self.entries.iter_mut().map(|(_, path)| path)
    }
}

impl<K: Into<String>, P: Into<PathBuf>, const N: usize> From<[(K, P); N]> for DirMap {
    fn from(entries: [(K, P); N]) -> Self {
        let mut map = DirMap::default();
        for (key, path) in entries {
            map.insert(key, path);
        }
        map
    }
}

impl<'de> Deserialize<'de> for DirMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let table = toml::Table::deserialize(deserializer)?;
        let mut map = DirMap::default();
        for (key, value) in table {
            match value {
                toml::Value::String(path) => map.insert(key, path),
                other => {
                    return Err(D::Error::custom(format!(
                        "expected a path string for `{}`, found {}",
                        key,
                        other.type_str()
                    )))
                }
            }
        }
        Ok(map)
    }
}

/// One dependency block as declared in the build file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DependencySpec {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default)]
    pub system_wide: bool,

    #[serde(default)]
    pub header_only: bool,

    /// Package directories, keyed by role (`include`, `lib`, ...).
    #[serde(default)]
    pub paths: DirMap,

    /// Library files, relative to `paths.lib` for local packages.
    #[serde(default)]
    pub libs: Vec<PathBuf>,

    /// Extra linker arguments (header-only packages).
    #[serde(default)]
    pub args: Vec<String>,

    /// Host directories searched for system-wide packages.
    #[serde(default)]
    pub search_paths: DirMap,
}

fn default_true() -> bool {
    true
}

/// A named dependency entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    name: String,
    spec: DependencySpec,
}

impl Dependency {
    pub fn new(name: impl Into<String>, spec: DependencySpec) -> Self {
        Dependency {
            name: name.into(),
            spec,
        }
    }

    /// Get the package name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_enabled(&self) -> bool {
        self.spec.enabled
    }

    pub fn is_system_wide(&self) -> bool {
        self.spec.system_wide
    }

    pub fn is_header_only(&self) -> bool {
        self.spec.header_only
    }

    /// The include directory this dependency contributes, if any.
    ///
    /// Local packages use `paths.include`, system-wide ones
    /// `search_paths.include`. Disabled packages contribute nothing.
    pub fn include_dir(&self) -> Option<&Path> {
        self.dir_for(INCLUDE_KEY)
    }

    /// The library directory this dependency contributes, if any.
    pub fn library_dir(&self) -> Option<&Path> {
        self.dir_for(LIB_KEY)
    }

    /// Library files (fully qualified once resolved).
    pub fn libs(&self) -> &[PathBuf] {
        &self.spec.libs
    }

    /// Declared linker arguments.
    pub fn args(&self) -> &[String] {
        &self.spec.args
    }

    fn dir_for(&self, key: &str) -> Option<&Path> {
        if !self.spec.enabled {
            return None;
        }
        let table = if self.spec.system_wide {
            &self.spec.search_paths
        } else {
            &self.spec.paths
        };
        table.get(key)
    }

    /// System-wide packages must point at existing absolute paths.
    fn validate_system_paths(&self) -> Result<(), ConfigError> {
        for path in self.spec.paths.values() {
            if !path.is_absolute() {
                return Err(ConfigError::path_not_found(
                    path,
                    PathKind::RelativeSystemDependency,
                ));
            }
            if !path.exists() {
                return Err(ConfigError::path_not_found(
                    path,
                    PathKind::SystemDependency,
                ));
            }
        }
        Ok(())
    }

    /// Root local packages under `<deps>/<name>/`.
    fn relocate(&mut self, deps_dir: &Path) {
        let root = deps_dir.join(&self.name);

        if !self.spec.header_only {
            let lib_dir = self
                .spec
                .paths
                .get(LIB_KEY)
                .map(|lib| root.join(lib))
                .unwrap_or_else(|| root.clone());
            self.spec.libs = self.spec.libs.iter().map(|lib| lib_dir.join(lib)).collect();
        }

        for path in self.spec.paths.values_mut() {
            *path = root.join(&*path);
        }
    }
}

/// The dependency table in declaration order, before resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyTable {
    entries: Vec<Dependency>,
}

impl DependencyTable {
    pub fn new(entries: Vec<Dependency>) -> Self {
        DependencyTable { entries }
    }

    /// Build from a `dependencies` table, keeping declaration order.
    pub fn from_toml(table: &toml::Table) -> Result<Self, ConfigError> {
        let mut entries = Vec::with_capacity(table.len());
        for (name, value) in table {
            let spec: DependencySpec =
                value
                    .clone()
                    .try_into()
                    .map_err(|e: toml::de::Error| ConfigError::Invalid {
                        key: format!("dependencies:{}", name),
                        message: e.message().to_string(),
                    })?;
            entries.push(Dependency::new(name.clone(), spec));
        }
        Ok(DependencyTable { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolve every enabled entry.
    ///
    /// System-wide entries are validated; the first bad path aborts the whole
    /// resolution. Local entries get their paths and libraries rooted under
    /// `<deps>/<name>/`. Disabled entries are left untouched.
    pub fn resolve(self, dirs: &DirectorySet) -> Result<ResolvedDependencies, ConfigError> {
        let mut entries = self.entries;

        for dep in entries.iter_mut().filter(|d| d.is_enabled()) {
            if dep.is_system_wide() {
                dep.validate_system_paths()?;
                tracing::debug!("dependency `{}` is system-wide", dep.name());
            } else {
                dep.relocate(&dirs.deps);
                tracing::debug!("dependency `{}` resolved under {}", dep.name(), dirs.deps.display());
            }
        }

        Ok(ResolvedDependencies { entries })
    }
}

/// Dependencies after resolution. All accessors are pure.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedDependencies {
    entries: Vec<Dependency>,
}

impl ResolvedDependencies {
    pub fn entries(&self) -> &[Dependency] {
        &self.entries
    }

    /// Include directories of enabled dependencies in table order, followed
    /// by the project's own `include` and `source` directories.
    pub fn include_dirs(&self, dirs: &DirectorySet) -> Vec<PathBuf> {
        let mut includes: Vec<PathBuf> = self
            .entries
            .iter()
            .filter_map(|d| d.include_dir().map(Path::to_path_buf))
            .collect();
        includes.push(dirs.include.clone());
        includes.push(dirs.source.clone());
        includes
    }

    /// Library directories of enabled dependencies in table order.
    pub fn library_dirs(&self) -> Vec<PathBuf> {
        self.entries
            .iter()
            .filter_map(|d| d.library_dir().map(Path::to_path_buf))
            .collect()
    }

    /// Linker arguments of enabled header-only dependencies in table order.
    pub fn linker_args(&self) -> Vec<String> {
        self.entries
            .iter()
            .filter(|d| d.is_enabled() && d.is_header_only())
            .flat_map(|d| d.args().iter().cloned())
            .collect()
    }

    /// Library files of enabled dependencies in table order.
    pub fn library_files(&self) -> Vec<PathBuf> {
        self.entries
            .iter()
            .filter(|d| d.is_enabled())
            .flat_map(|d| d.libs().iter().cloned())
            .collect()
    }
}

/// Render include directories as `-I<path>` switches.
pub fn include_switches(dirs: &[PathBuf]) -> Vec<String> {
    dirs.iter().map(|d| format!("-I{}", d.display())).collect()
}

/// Render library directories as `-L<path>` switches.
pub fn library_switches(dirs: &[PathBuf]) -> Vec<String> {
    dirs.iter().map(|d| format!("-L{}", d.display())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::paths::{PathResolver, RawDirs};
    use tempfile::TempDir;

    fn project_dirs() -> DirectorySet {
        let raw = RawDirs {
            source: Some("src".into()),
            include: Some("include".into()),
            build: Some("build".into()),
            deps: Some("deps".into()),
            target: Some("target".into()),
        };
        DirectorySet::resolve(&raw, &PathResolver::new("/project")).unwrap()
    }

    fn local(include: &str, lib: &str) -> DependencySpec {
        DependencySpec {
            enabled: true,
            paths: DirMap::from([
                (INCLUDE_KEY.to_string(), PathBuf::from(include)),
                (LIB_KEY.to_string(), PathBuf::from(lib)),
            ]),
            ..Default::default()
        }
    }

    fn parse(content: &str) -> DependencyTable {
        let table: toml::Table = toml::from_str(content).unwrap();
        DependencyTable::from_toml(&table).unwrap()
    }

    #[test]
    fn test_defaults_from_toml() {
        let table = parse("[zlib]\n");
        let dep = &table.entries[0];
        assert_eq!(dep.name(), "zlib");
        assert!(dep.is_enabled());
        assert!(!dep.is_system_wide());
        assert!(!dep.is_header_only());
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let table: toml::Table = toml::from_str("[zlib]\nenabeld = true\n").unwrap();
        let err = DependencyTable::from_toml(&table).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref key, .. } if key == "dependencies:zlib"));
    }

    #[test]
    fn test_local_dependency_is_rooted_under_deps() {
        let mut spec = local("include", "lib");
        spec.libs = vec![PathBuf::from("libz.a")];
        let table = DependencyTable::new(vec![Dependency::new("zlib", spec)]);

        let resolved = table.resolve(&project_dirs()).unwrap();
        let dep = &resolved.entries()[0];
        assert_eq!(dep.include_dir(), Some(Path::new("/project/deps/zlib/include")));
        assert_eq!(dep.library_dir(), Some(Path::new("/project/deps/zlib/lib")));
        assert_eq!(
            resolved.library_files(),
            vec![PathBuf::from("/project/deps/zlib/lib/libz.a")]
        );
    }

    #[test]
    fn test_include_dirs_end_with_project_dirs() {
        let table = DependencyTable::new(vec![
            Dependency::new("a", local("inc", "lib")),
            Dependency::new("b", local("headers", "lib")),
        ]);
        let dirs = project_dirs();
        let resolved = table.resolve(&dirs).unwrap();

        assert_eq!(
            resolved.include_dirs(&dirs),
            vec![
                PathBuf::from("/project/deps/a/inc"),
                PathBuf::from("/project/deps/b/headers"),
                PathBuf::from("/project/include"),
                PathBuf::from("/project/src"),
            ]
        );

        let empty = DependencyTable::default().resolve(&dirs).unwrap();
        assert_eq!(
            empty.include_dirs(&dirs),
            vec![PathBuf::from("/project/include"), PathBuf::from("/project/src")]
        );
    }

    #[test]
    fn test_disabled_dependency_contributes_nothing() {
        let mut spec = local("include", "lib");
        spec.enabled = false;
        spec.header_only = true;
        spec.system_wide = true;
        spec.libs = vec![PathBuf::from("libz.a")];
        spec.args = vec!["-lz".to_string()];
        spec.paths.insert(INCLUDE_KEY, "/definitely/missing");
        let dirs = project_dirs();

        let resolved = DependencyTable::new(vec![Dependency::new("zlib", spec)])
            .resolve(&dirs)
            .unwrap();

        assert_eq!(resolved.include_dirs(&dirs).len(), 2);
        assert!(resolved.library_dirs().is_empty());
        assert!(resolved.linker_args().is_empty());
        assert!(resolved.library_files().is_empty());
    }

    #[test]
    fn test_linker_args_only_from_header_only() {
        let mut with_args = local("include", "lib");
        with_args.header_only = true;
        with_args.args = vec!["-lssl".to_string(), "-lcrypto".to_string()];

        let mut ignored = local("include", "lib");
        ignored.args = vec!["-lignored".to_string()];

        let resolved = DependencyTable::new(vec![
            Dependency::new("ssl", with_args),
            Dependency::new("other", ignored),
        ])
        .resolve(&project_dirs())
        .unwrap();

        assert_eq!(resolved.linker_args(), vec!["-lssl", "-lcrypto"]);
    }

    #[test]
    fn test_header_only_libs_are_not_relocated() {
        let mut spec = local("include", "lib");
        spec.header_only = true;
        spec.libs = vec![PathBuf::from("libfoo.a")];

        let resolved = DependencyTable::new(vec![Dependency::new("foo", spec)])
            .resolve(&project_dirs())
            .unwrap();
        assert_eq!(resolved.library_files(), vec![PathBuf::from("libfoo.a")]);
    }

    #[test]
    fn test_system_wide_uses_search_paths() {
        let tmp = TempDir::new().unwrap();
        let include = tmp.path().join("include");
        std::fs::create_dir_all(&include).unwrap();

        let spec = DependencySpec {
            enabled: true,
            system_wide: true,
            paths: DirMap::from([(INCLUDE_KEY.to_string(), include.clone())]),
            search_paths: DirMap::from([
                (INCLUDE_KEY.to_string(), PathBuf::from("/usr/include")),
                (LIB_KEY.to_string(), PathBuf::from("/usr/lib")),
            ]),
            ..Default::default()
        };
        let dirs = project_dirs();
        let resolved = DependencyTable::new(vec![Dependency::new("sys", spec)])
            .resolve(&dirs)
            .unwrap();

        assert_eq!(resolved.include_dirs(&dirs)[0], PathBuf::from("/usr/include"));
        assert_eq!(resolved.library_dirs(), vec![PathBuf::from("/usr/lib")]);
    }

    #[test]
    fn test_system_wide_relative_path_fails() {
        let spec = DependencySpec {
            enabled: true,
            system_wide: true,
            paths: DirMap::from([(INCLUDE_KEY.to_string(), PathBuf::from("include"))]),
            ..Default::default()
        };

        let err = DependencyTable::new(vec![Dependency::new("sys", spec)])
            .resolve(&project_dirs())
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::PathNotFound { kind: PathKind::RelativeSystemDependency, .. }
        ));
    }

    #[test]
    fn test_system_wide_missing_path_fails_fast() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("missing");
        let bad = DependencySpec {
            enabled: true,
            system_wide: true,
            paths: DirMap::from([(INCLUDE_KEY.to_string(), missing.clone())]),
            ..Default::default()
        };

        let err = DependencyTable::new(vec![
            Dependency::new("bad", bad),
            Dependency::new("good", local("include", "lib")),
        ])
        .resolve(&project_dirs())
        .unwrap_err();

        assert!(matches!(
            err,
            ConfigError::PathNotFound { ref path, kind: PathKind::SystemDependency } if *path == missing
        ));
    }

    #[test]
    fn test_system_wide_paths_checked_in_declared_order() {
        let table = parse(
            r#"
[sys]
system_wide = true
paths = { lib = "/definitely/missing/lib", include = "/definitely/missing/include" }
"#,
        );

        let err = table.resolve(&project_dirs()).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::PathNotFound { ref path, kind: PathKind::SystemDependency }
                if *path == Path::new("/definitely/missing/lib")
        ));
    }

    #[test]
    fn test_paths_must_be_strings() {
        let table: toml::Table = toml::from_str("[zlib]\npaths = { include = 1 }\n").unwrap();
        let err = DependencyTable::from_toml(&table).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref message, .. } if message.contains("path string")));
    }

    #[test]
    fn test_switch_rendering() {
        let dirs = vec![PathBuf::from("/a b/include"), PathBuf::from("/usr/include")];
        assert_eq!(
            include_switches(&dirs),
            vec!["-I/a b/include", "-I/usr/include"]
        );
        assert_eq!(library_switches(&[PathBuf::from("/usr/lib")]), vec!["-L/usr/lib"]);
    }
}
