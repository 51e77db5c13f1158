//! syncwatch - run a project's sync command whenever its files change,
//! never more than one invocation at a time per project.

mod actor;
mod cli;
mod config;
mod core;
mod logger;
mod project;
mod utils;

use std::sync::Arc;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use config::SyncConfig;

fn main() -> Result<()> {
    // Setup global Ctrl+C handler (before any blocking operations)
    core::setup_shutdown_handler()?;

    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);

    let config = SyncConfig::load(&cli)?;

    match &cli.command {
        Commands::Watch { .. } => cli::watch::watch_projects(Arc::new(config)),
        Commands::Sync {
            id,
            path,
            timestamp,
            ..
        } => {
            let code = cli::sync::sync_once(&config, id, path, *timestamp)?;
            std::process::exit(code)
        }
        Commands::Check { .. } => cli::check::check_config(&config),
    }
}
