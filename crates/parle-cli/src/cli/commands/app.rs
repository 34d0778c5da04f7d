//! Interactive app command.

use anyhow::Result;
use parle_core::config::Config;
use parle_core::gateway::Backend;

#[cfg(feature = "tui")]
pub fn run(config: &Config, offline: bool) -> Result<()> {
    let backend = Backend::from_config(config, offline)?;
    tracing::info!(offline, query_mode = ?config.query_mode, "starting interactive app");
    parle_tui::run_app(config, backend)
}

#[cfg(not(feature = "tui"))]
pub fn run(_config: &Config, _offline: bool) -> Result<()> {
    anyhow::bail!("This build has no interactive app. Use `parle words list` instead.")
}
