//! Full-screen TUI for Parle.

pub mod actions;
pub mod common;
pub mod effects;
pub mod events;
pub mod features;
pub mod overlays;
pub mod render;
pub mod runtime;
pub mod state;
pub mod terminal;
pub mod update;

use std::io::{IsTerminal, stderr};

use anyhow::Result;
use parle_core::config::Config;
use parle_core::gateway::Backend;
pub use runtime::{Controller, RuntimeOptions, TuiRuntime};

/// Runs the interactive app until the user quits.
///
/// # Errors
/// Returns an error if stderr is not a terminal or terminal I/O fails.
pub fn run_app(config: &Config, backend: Backend) -> Result<()> {
    if !stderr().is_terminal() {
        anyhow::bail!(
            "The interactive app requires a terminal.\n\
             Use `parle words list` for non-interactive access."
        );
    }

    let mut runtime = TuiRuntime::new(backend, RuntimeOptions::from_config(config))?;
    let result = runtime.run();
    drop(runtime);
    result?;

    println!("Au revoir!");
    Ok(())
}
