//! Tracing subscriber setup.
//!
//! The interactive UI owns the terminal, so it logs to a daily file under
//! `$PARLE_HOME/logs`. One-shot commands log to stderr.

use std::io;

use anyhow::{Context, Result};
use parle_core::config::{LoggingConfig, paths};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

/// Environment variable overriding every other level source.
pub const LOG_ENV: &str = "PARLE_LOG";

const LOG_FILE_PREFIX: &str = "parle.log";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget {
    /// Daily-rotated file; nothing reaches the terminal.
    File,
    Stderr,
}

/// Filter directive from `-v` count, falling back to the configured level.
fn directive(verbosity: u8, configured: &str) -> String {
    match verbosity {
        0 => {
            let configured = configured.trim();
            if configured.is_empty() {
                "info".to_string()
            } else {
                configured.to_string()
            }
        }
        1 => "debug".to_string(),
        _ => "trace".to_string(),
    }
}

fn build_filter(verbosity: u8, config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| {
        let directive = directive(verbosity, &config.level);
        EnvFilter::try_new(&directive).unwrap_or_else(|err| {
            eprintln!("Warning: invalid log level {directive:?} ({err}), using info");
            EnvFilter::new("info")
        })
    })
}

/// Installs the global subscriber.
///
/// Returns the guard that flushes the file writer; keep it alive until exit.
/// File logging can be switched off with `logging.file = false`.
///
/// # Errors
/// Returns an error if the log directory cannot be created or a subscriber
/// is already installed.
pub fn init(
    target: LogTarget,
    verbosity: u8,
    config: &LoggingConfig,
) -> Result<Option<WorkerGuard>> {
    let filter = build_filter(verbosity, config);

    match target {
        LogTarget::File => {
            if !config.file {
                return Ok(None);
            }
            let dir = paths::logs_dir();
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
            let appender = tracing_appender::rolling::daily(&dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_writer(writer).with_ansi(false))
                .try_init()
                .context("Failed to install log subscriber")?;
            Ok(Some(guard))
        }
        LogTarget::Stderr => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .with_writer(io::stderr)
                        .with_target(false)
                        .without_time(),
                )
                .try_init()
                .context("Failed to install log subscriber")?;
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_overrides_configured_level() {
        assert_eq!(directive(0, "warn"), "warn");
        assert_eq!(directive(1, "warn"), "debug");
        assert_eq!(directive(3, "warn"), "trace");
    }

    #[test]
    fn test_blank_level_falls_back_to_info() {
        assert_eq!(directive(0, "  "), "info");
    }

    #[test]
    fn test_configured_directive_is_kept_verbatim() {
        assert_eq!(directive(0, "parle_core=debug"), "parle_core=debug");
    }
}
