//! Quay CLI - a declarative build orchestrator for C and C++

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use quay::core::ConfigError;
use quay::util::diagnostic::emit;
use quay::util::Shell;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("quay=debug")
    } else {
        EnvFilter::try_from_env("QUAY_LOG").unwrap_or_else(|_| EnvFilter::new("quay=warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    let shell = Shell::from_flags(cli.quiet, cli.verbose, cli.color);

    if let Err(e) = run(cli.command, &shell) {
        match e.downcast_ref::<ConfigError>() {
            Some(config_err) => emit(&config_err.to_diagnostic(), shell.supports_color()),
            None => eprintln!("error: {:#}", e),
        }
        std::process::exit(1);
    }
}

fn run(command: Commands, shell: &Shell) -> Result<()> {
    match command {
        Commands::Clean(args) => commands::clean::execute(args, shell),
        Commands::Build(args) => commands::build::execute(args, shell),
    }
}
