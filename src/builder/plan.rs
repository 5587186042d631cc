//! Build plan generation.
//!
//! A BuildPlan is the fully assembled set of compiler invocations for one
//! profile: one compile step per source, then one link step. Nothing runs
//! here; [`crate::builder::NativeBuilder`] executes the plan.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;

use crate::builder::artifact::object_path;
use crate::core::errors::ConfigError;
use crate::core::manifest::ProjectConfig;
use crate::util::fs::write_string;
use crate::util::process::ProcessBuilder;

/// File name of the compilation database written into the build directory.
pub const COMPILE_COMMANDS_FILE: &str = "compile_commands.json";

/// A complete build plan for one profile.
#[derive(Debug, Clone, Serialize)]
pub struct BuildPlan {
    /// Active profile
    pub profile: String,
    /// Compiler executable, also used as the linker driver
    pub compiler: String,
    /// Working directory for every invocation (the project root)
    pub cwd: PathBuf,
    /// Directory holding the object files
    pub build_dir: PathBuf,
    /// Compile steps in declared source order
    pub compile: Vec<CompileStep>,
    /// Final link step
    pub link: LinkStep,
    /// Resolved dependency library files, for inspection
    pub libraries: Vec<PathBuf>,
}

/// Compile one source file to an object file.
#[derive(Debug, Clone, Serialize)]
pub struct CompileStep {
    pub source: PathBuf,
    pub object: PathBuf,
    /// Arguments after the compiler name
    pub args: Vec<String>,
}

/// Link every object in the build directory into the profile's binary.
#[derive(Debug, Clone, Serialize)]
pub struct LinkStep {
    pub output: PathBuf,
    /// Profile flags, then `-L` switches, then linker arguments
    pub trailing_args: Vec<String>,
}

/// One entry of `compile_commands.json`.
#[derive(Debug, Clone, Serialize)]
pub struct CompileCommand {
    pub directory: PathBuf,
    pub file: PathBuf,
    pub arguments: Vec<String>,
    pub output: PathBuf,
}

impl BuildPlan {
    /// Assemble the plan for `profile`.
    pub fn new(config: &ProjectConfig, profile: &str) -> Result<Self, ConfigError> {
        let compiler = config.compiler().ok_or(ConfigError::NoCompiler)?;
        let flags = config
            .profiles()
            .flags(profile)
            .ok_or_else(|| ConfigError::Invalid {
                key: "profile".to_string(),
                message: format!("profile `{}` is not configured", profile),
            })?;
        let output = config
            .binary_path(profile)
            .ok_or_else(|| ConfigError::Invalid {
                key: "project:dirs:target".to_string(),
                message: format!("no target directory for profile `{}`", profile),
            })?;

        let build_dir = config.dirs().build.clone();

        let compile = config
            .files()
            .sources
            .iter()
            .map(|source| {
                let object = object_path(&build_dir, source);
                let mut args = vec![
                    "-c".to_string(),
                    "-o".to_string(),
                    object.display().to_string(),
                    source.display().to_string(),
                ];
                args.extend(config.include_switches().iter().cloned());
                args.extend(flags.iter().cloned());
                CompileStep {
                    source: source.clone(),
                    object,
                    args,
                }
            })
            .collect();

        let mut trailing_args: Vec<String> = flags.to_vec();
        trailing_args.extend(config.library_switches().iter().cloned());
        trailing_args.extend(config.linker_args().iter().cloned());

        Ok(BuildPlan {
            profile: profile.to_string(),
            compiler: compiler.to_string(),
            cwd: config.root().to_path_buf(),
            build_dir,
            compile,
            link: LinkStep {
                output,
                trailing_args,
            },
            libraries: config.dependencies().library_files(),
        })
    }

    /// Number of compile steps.
    pub fn compile_count(&self) -> usize {
        self.compile.len()
    }

    /// Command for one compile step.
    pub fn compile_command(&self, step: &CompileStep) -> ProcessBuilder {
        ProcessBuilder::new(&self.compiler)
            .args(&step.args)
            .cwd(&self.cwd)
    }

    /// Link command over `objects`.
    pub fn link_command(&self, objects: &[PathBuf]) -> ProcessBuilder {
        ProcessBuilder::new(&self.compiler)
            .arg("-o")
            .arg(&self.link.output)
            .args(objects)
            .args(&self.link.trailing_args)
            .cwd(&self.cwd)
    }

    /// Entries for a `compile_commands.json` database.
    pub fn compile_commands(&self) -> Vec<CompileCommand> {
        self.compile
            .iter()
            .map(|step| {
                let mut arguments = vec![self.compiler.clone()];
                arguments.extend(step.args.iter().cloned());
                CompileCommand {
                    directory: self.cwd.clone(),
                    file: step.source.clone(),
                    arguments,
                    output: step.object.clone(),
                }
            })
            .collect()
    }

    /// Write the compilation database into the build directory.
    pub fn write_compile_commands(&self) -> Result<PathBuf> {
        let path = self.build_dir.join(COMPILE_COMMANDS_FILE);
        let json = serde_json::to_string_pretty(&self.compile_commands())
            .context("failed to serialize compile commands")?;
        write_string(&path, &json)?;
        Ok(path)
    }

    /// Serialize the plan as pretty JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("failed to serialize build plan")
    }

    /// Path of the binary this plan links.
    pub fn output(&self) -> &Path {
        &self.link.output
    }
}
