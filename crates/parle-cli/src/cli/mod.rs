//! CLI entry and dispatch.

use anyhow::{Context, Result};
use clap::Parser;
use parle_core::config;

use crate::logging::{self, LogTarget};

mod commands;

#[derive(Parser)]
#[command(name = "parle")]
#[command(version)]
#[command(about = "French vocabulary flashcards in the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Use the in-memory backend; nothing outlives the process
    #[arg(long, global = true)]
    offline: bool,

    /// Raise log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Open the interactive app (default)
    Tui,

    /// Sign in with email and password (password read from stdin)
    Login {
        #[arg(long)]
        email: String,
    },

    /// Create an account (password and confirmation read from stdin)
    Register {
        #[arg(long)]
        email: String,
    },

    /// Sign out and forget the cached session
    Logout,

    /// Show the signed-in account
    Whoami,

    /// Manage your vocabulary
    Words {
        #[command(subcommand)]
        command: WordsCommands,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Subcommand)]
enum WordsCommands {
    /// List your words
    List,
    /// Add a word
    Add {
        /// The French word
        #[arg(value_name = "FRENCH")]
        french: String,
        /// Its English translation
        #[arg(value_name = "ENGLISH", default_value = "")]
        english: String,
    },
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Show the path to the config file
    Path,
    /// Initialize a default config file (if not present)
    Init,
    /// Generate a fresh config from Rust defaults (for xtask)
    Generate,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    // one tokio runtime for everything
    let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;

    rt.block_on(async move { dispatch(cli).await })
}

async fn dispatch(cli: Cli) -> Result<()> {
    let Cli {
        command,
        offline,
        verbose,
    } = cli;
    let command = command.unwrap_or(Commands::Tui);

    // Config commands must work even when the config file is broken.
    if let Commands::Config { command } = command {
        return match command {
            ConfigCommands::Path => {
                commands::config::path();
                Ok(())
            }
            ConfigCommands::Init => commands::config::init(),
            ConfigCommands::Generate => commands::config::generate(),
        };
    }

    let config = config::Config::load().context("load config")?;
    let target = if matches!(command, Commands::Tui) {
        LogTarget::File
    } else {
        LogTarget::Stderr
    };
    let _log_guard = logging::init(target, verbose, &config.logging)?;

    match command {
        Commands::Tui => commands::app::run(&config, offline),
        Commands::Login { email } => commands::auth::login(&config, offline, &email).await,
        Commands::Register { email } => commands::auth::register(&config, offline, &email).await,
        Commands::Logout => commands::auth::logout(),
        Commands::Whoami => commands::auth::whoami(),
        Commands::Words { command } => match command {
            WordsCommands::List => commands::words::list(&config, offline).await,
            WordsCommands::Add { french, english } => {
                commands::words::add(&config, offline, &french, &english).await
            }
        },
        // Handled before the config is loaded.
        Commands::Config { .. } => Ok(()),
    }
}
