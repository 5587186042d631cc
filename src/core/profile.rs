//! Build profiles.
//!
//! A profile is a named list of compiler flags (`debug = ["-g"]`). Each
//! profile also gets its own output directory, `target/<profile>`.

use crate::core::errors::ConfigError;
use crate::util::shell::Shell;

/// A named flag list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub name: String,
    pub flags: Vec<String>,
}

/// Profile name to flag list, in declaration order. Read-only once built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileFlags {
    profiles: Vec<Profile>,
}

impl ProfileFlags {
    /// Build from the `project.setup.profiles` table.
    pub fn from_toml(table: &toml::Table) -> Result<Self, ConfigError> {
        let mut profiles = Vec::with_capacity(table.len());
        for (name, value) in table {
            let flags: Vec<String> =
                value
                    .clone()
                    .try_into()
                    .map_err(|e: toml::de::Error| ConfigError::Invalid {
                        key: format!("project:setup:profiles:{}", name),
                        message: e.message().to_string(),
                    })?;
            profiles.push(Profile {
                name: name.clone(),
                flags,
            });
        }
        Ok(ProfileFlags { profiles })
    }

    /// Flags of `name`, if such a profile exists.
    pub fn flags(&self, name: &str) -> Option<&[String]> {
        self.profiles
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.flags.as_slice())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.profiles.iter().any(|p| p.name == name)
    }

    /// Profile names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.profiles.iter().map(|p| p.name.as_str())
    }

    pub fn first(&self) -> Option<&Profile> {
        self.profiles.first()
    }
}

/// Picks the active profile for a build.
///
/// An unknown name is not fatal: the error is reported and the first
/// configured profile is used instead.
pub struct ProfileSelector<'a> {
    shell: &'a Shell,
}

impl<'a> ProfileSelector<'a> {
    pub fn new(shell: &'a Shell) -> Self {
        ProfileSelector { shell }
    }

    /// Select `requested` from `profiles`, falling back to the first one.
    pub fn select(&self, requested: &str, profiles: &ProfileFlags) -> Result<String, ConfigError> {
        if profiles.contains(requested) {
            tracing::debug!("selected profile {}", requested);
            return Ok(requested.to_string());
        }

        let fallback = profiles.first().ok_or(ConfigError::NoProfiles)?;

        self.shell
            .error(format!("Profile \"{}\" is not configured", requested));
        self.shell
            .error(format!("Defaulting to \"{}\"", fallback.name));

        Ok(fallback.name.clone())
    }
}
