//! The raw configuration document.
//!
//! A build file is a TOML document. Two lookups are offered on top of it:
//!
//! - [`ConfigDocument::get`]: a flattened single-value lookup using
//!   colon-separated key paths such as `project:setup:compiler`
//! - [`ConfigDocument::find`]: a recursive search for a key that may appear
//!   anywhere in the tree (used for `dependencies`). The first match of a
//!   depth-first walk wins; tables are walked in declaration order, arrays
//!   element by element.
//!
//! A missing key is never an error at this level: a warning goes through the
//! shell and the caller gets `None`.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use toml::Value;

use crate::core::errors::ConfigError;
use crate::util::shell::Shell;

/// Separator used by flattened key paths.
pub const KEY_SEPARATOR: char = ':';

/// A parsed configuration document.
#[derive(Debug, Clone)]
pub struct ConfigDocument {
    root: toml::Table,
    path: PathBuf,
}

impl ConfigDocument {
    /// Read and parse the document at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Load {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        Self::parse(&content, path)
    }

    /// Parse document content. `path` is only used in messages.
    pub fn parse(content: &str, path: &Path) -> Result<Self, ConfigError> {
        let root: toml::Table = toml::from_str(content).map_err(|e| ConfigError::Load {
            path: path.to_path_buf(),
            message: e.message().to_string(),
        })?;

        if root.is_empty() {
            return Err(ConfigError::Load {
                path: path.to_path_buf(),
                message: "document is empty".to_string(),
            });
        }

        Ok(ConfigDocument {
            root,
            path: path.to_path_buf(),
        })
    }

    /// Path the document was read from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Flattened lookup, e.g. `project:dirs:source`.
    pub fn get(&self, key: &str, shell: &Shell) -> Option<&Value> {
        let value = self.lookup(key);
        if value.is_none() {
            warn_missing(key, shell);
        }
        value
    }

    /// Flattened lookup converted to `T`.
    ///
    /// A missing key yields `Ok(None)` after a warning; a present value of the
    /// wrong shape is an error.
    pub fn get_as<T: DeserializeOwned>(
        &self,
        key: &str,
        shell: &Shell,
    ) -> Result<Option<T>, ConfigError> {
        self.get(key, shell)
            .map(|value| convert(key, value))
            .transpose()
    }

    /// Recursive lookup returning the first occurrence of `key`.
    pub fn find(&self, key: &str, shell: &Shell) -> Option<&Value> {
        let value = find_in_table(&self.root, key);
        if value.is_none() {
            warn_missing(key, shell);
        }
        value
    }

    /// Recursive lookup converted to `T`.
    pub fn find_as<T: DeserializeOwned>(
        &self,
        key: &str,
        shell: &Shell,
    ) -> Result<Option<T>, ConfigError> {
        self.find(key, shell)
            .map(|value| convert(key, value))
            .transpose()
    }

    fn lookup(&self, key: &str) -> Option<&Value> {
        let mut parts = key.split(KEY_SEPARATOR);
        let first = parts.next()?;
        let mut current = self.root.get(first)?;
        for part in parts {
            current = current.as_table()?.get(part)?;
        }
        Some(current)
    }
}

fn warn_missing(key: &str, shell: &Shell) {
    tracing::debug!("missing config key {}", key);
    shell.warn(format!("Key \"{}\" not found in build file", key));
}

fn convert<T: DeserializeOwned>(key: &str, value: &Value) -> Result<T, ConfigError> {
    value.clone().try_into().map_err(|e: toml::de::Error| ConfigError::Invalid {
        key: key.to_string(),
        message: e.message().to_string(),
    })
}

fn find_in_table<'a>(table: &'a toml::Table, key: &str) -> Option<&'a Value> {
    for (k, v) in table {
        if k == key {
            return Some(v);
        }
        if let Some(found) = find_in_value(v, key) {
            return Some(found);
        }
    }
    None
}

fn find_in_value<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    match value {
        Value::Table(table) => find_in_table(table, key),
        Value::Array(items) => items.iter().find_map(|item| find_in_value(item, key)),
        _ => None,
    }
}
