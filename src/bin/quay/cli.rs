//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use quay::util::shell::ColorChoice;

/// Quay - a declarative build orchestrator for C and C++ projects
#[derive(Parser)]
#[command(name = "quay")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Show every compiler command and resolution step
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only print errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Coloring: auto, always, never
    #[arg(long, global = true, default_value = "auto", env = "QUAY_COLOR")]
    pub color: ColorChoice,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Remove the build directory and every per-profile target directory
    Clean(CleanArgs),

    /// Compile and link the project with a profile
    Build(BuildArgs),
}

#[derive(Args)]
pub struct CleanArgs {
    /// Path to the build file
    pub config: PathBuf,
}

#[derive(Args)]
pub struct BuildArgs {
    /// Path to the build file
    pub config: PathBuf,

    /// Profile to build; unknown names fall back to the first profile
    pub profile: String,

    /// Number of parallel compile jobs
    #[arg(short, long, default_value_t = 1)]
    pub jobs: usize,

    /// Print the build plan as JSON and exit (no build)
    #[arg(long)]
    pub plan: bool,

    /// Emit compile_commands.json into the build directory
    #[arg(long)]
    pub emit_compile_commands: bool,
}
