//! Taskboard - project and task tracker
//!
//! # Usage
//!
//! ```bash
//! # Run the API server (default)
//! taskboard
//! taskboard serve --config taskboard.toml
//!
//! # Seed accounts
//! taskboard user add --email ada@example.com --name Ada --role admin --password '...'
//! taskboard user list
//! taskboard user set-role --email mia@example.com --role member
//! ```

mod cmd;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use taskboard_config::{Config, LogFormat, LogLevel};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Default config file, used when present and no `--config` is given
const DEFAULT_CONFIG_FILE: &str = "taskboard.toml";

/// Taskboard - project and task tracker
#[derive(Parser, Debug)]
#[command(name = "taskboard")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Path to configuration file (error if specified but not found)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error). Overrides config file.
    #[arg(short, long, global = true)]
    log_level: Option<LogLevel>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the API server
    Serve,

    /// Manage user accounts
    User(cmd::user::UserArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    init_logging(&config, cli.log_level)?;

    match cli.command {
        Some(Command::User(args)) => cmd::user::run(args, &config).await,
        // No subcommand = run server
        Some(Command::Serve) | None => cmd::serve::run(config).await,
    }
}

/// Load config: explicit path > ./taskboard.toml > defaults
fn load_config(path: Option<&Path>) -> Result<Config> {
    if let Some(path) = path {
        return Config::from_file(path)
            .with_context(|| format!("failed to load config from {}", path.display()));
    }

    let default_path = Path::new(DEFAULT_CONFIG_FILE);
    if default_path.exists() {
        return Config::from_file(default_path)
            .with_context(|| format!("failed to load config from {}", DEFAULT_CONFIG_FILE));
    }

    Ok(Config::default())
}

/// Initialize the tracing subscriber for logging
///
/// Level: CLI flag > config file > "info". `RUST_LOG` is not consulted so
/// the config file stays the single source of truth.
fn init_logging(config: &Config, cli_level: Option<LogLevel>) -> Result<()> {
    let directive = config.log.filter_directive(cli_level);
    let filter = EnvFilter::try_new(&directive)
        .or_else(|_| EnvFilter::try_new("info"))
        .map_err(|e| anyhow::anyhow!("invalid log level: {}", e))?;

    let registry = tracing_subscriber::registry().with(filter);

    match config.log.format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_target(true).with_current_span(true))
            .init(),
        LogFormat::Console => registry
            .with(fmt::layer().with_target(true).with_thread_ids(false))
            .init(),
    }

    Ok(())
}
