//! # panther
//!
//! Command-line client for the Panther backend: manage the host inventory,
//! run shell commands across hosts, watch vulnerability scans, and install
//! security updates.

#![deny(unsafe_code)]

mod cli;
mod commands;
mod render;

use anyhow::{Context, Result};
use clap::Parser;
use panther_settings::PantherSettings;

use cli::{Cli, Commands};

/// Load settings from `--settings` (or the default path) and apply the
/// global flags on top.
fn resolve_settings(cli: &Cli) -> Result<PantherSettings> {
    let mut settings = match &cli.settings {
        Some(path) => panther_settings::load_settings_from_path(path)
            .with_context(|| format!("failed to load settings from {}", path.display()))?,
        None => panther_settings::load_settings().context("failed to load settings")?,
    };
    if let Some(url) = &cli.url {
        settings.server.base_url.clone_from(url);
    }
    if let Some(level) = &cli.log_level {
        settings.logging.level.clone_from(level);
    }
    Ok(settings)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = resolve_settings(&cli)?;

    if settings.logging.json {
        panther_core::logging::init_json_subscriber(&settings.logging.level);
    } else {
        panther_core::logging::init_subscriber(&settings.logging.level);
    }
    tracing::debug!(base_url = %settings.server.base_url, "settings resolved");

    match cli.command {
        Commands::Hosts { action } => commands::hosts::run(&settings, action).await,
        Commands::Exec(args) => commands::exec::run(&settings, args).await,
        Commands::Scan(args) => commands::scan::run(&settings, args).await,
        Commands::Remediate(args) => commands::remediate::run(&settings, args).await,
    }
}
