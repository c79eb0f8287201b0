//! Subcommand handlers.

pub mod exec;
pub mod hosts;
pub mod remediate;
pub mod scan;

use anyhow::{Context, Result};
use panther_exec::SessionFactory;
use panther_settings::PantherSettings;

/// Session factory for the configured exec endpoint.
fn session_factory(settings: &PantherSettings) -> Result<SessionFactory> {
    let url = settings
        .exec_url()
        .context("invalid exec endpoint in settings")?;
    Ok(SessionFactory::new(url))
}
