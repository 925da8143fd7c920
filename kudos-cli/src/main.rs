//! Kudos CLI - Command line interface for the product review service
//!
//! Runs the HTTP API and inspects its configuration.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use kudos_core::{Config, ConfigOverrides, StoreBackend};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::ServeArgs;

/// Kudos: product reviews over HTTP
#[derive(Parser, Debug)]
#[command(name = "kudos")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file to use instead of ~/.config/kudos/config.toml
    #[arg(short, long, global = true, env = "KUDOS_CONFIG")]
    config: Option<PathBuf>,

    /// Address to listen on (overrides config and env)
    #[arg(long, global = true)]
    bind: Option<String>,

    /// Storage backend: memory or sqlite (overrides config and env)
    #[arg(long, global = true)]
    db_backend: Option<StoreBackend>,

    /// SQLite database file (overrides config and env)
    #[arg(long, global = true)]
    db_path: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the review HTTP service
    #[command(visible_alias = "s")]
    Serve(ServeArgs),

    /// Show current configuration
    Config,

    /// Show version information
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing; RUST_LOG wins over --verbose
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();

    // Load configuration with overrides
    let config = Config::load_with_overrides(
        cli.config.as_deref(),
        ConfigOverrides {
            bind: cli.bind.clone(),
            backend: cli.db_backend,
            db_path: cli.db_path.clone(),
        },
    )?;

    tracing::debug!(
        bind = %config.server.bind,
        backend = %config.storage.backend,
        "Configuration loaded"
    );

    match cli.command {
        Some(Commands::Serve(args)) => {
            args.execute(&config).await?;
        }
        None => {
            ServeArgs::default().execute(&config).await?;
        }
        Some(Commands::Config) => {
            println!("Kudos Configuration");
            println!("===================");
            println!();
            println!("{}", toml::to_string_pretty(&config)?);
            match cli.config.or_else(Config::default_config_path) {
                Some(path) if path.exists() => println!("Config file: {}", path.display()),
                Some(path) => println!(
                    "Config file: {} (not found - using defaults)",
                    path.display()
                ),
                None => println!("Config file: (no config directory)"),
            }
        }
        Some(Commands::Version) => {
            println!("kudos {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
