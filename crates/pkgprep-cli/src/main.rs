//! pkgprep CLI
//!
//! Classifies an upstream source, picks how to acquire it and resolves the
//! Debian package identity. The acquisition steps are printed, never run.

mod cli;
mod commands;
mod config;
mod error;
mod logging;

use clap::Parser;
use colored::Colorize;

use cli::Cli;
use config::{Maintainer, UserConfig};
use error::{CliError, Result};

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    logging::init(cli.verbose)
        .map_err(|e| CliError::user(format!("Failed to initialize logging: {e}")))?;
    tracing::debug!("Verbose mode enabled");

    let user_config = UserConfig::load(config::config_dir().as_deref())?;
    let maintainer = Maintainer::resolve(
        cli.email.clone(),
        cli.fullname.clone(),
        &user_config,
        std::env::var("USER").ok(),
    );

    let cwd = std::env::current_dir()?;
    commands::run_resolve(&cwd, &cli.request(), &maintainer)
}
