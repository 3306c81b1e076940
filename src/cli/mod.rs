//! Command-line interface for bitcoind-wrapper
//!
//! Subcommands edit `bitcoin.conf`, apply the launch policy and interpret
//! health checks. Global flags pick the wrapper config and conf file.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::{load_config, WrapperConfig};

mod conf;
mod health;
mod launch;
mod mempool;
mod reindex;
mod settings;
mod utils;

/// Manage a bitcoind node's configuration and launch
#[derive(Parser)]
#[command(name = "bitcoind-wrapper")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging (sets log level to DEBUG)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to wrapper config file (bitcoind-wrapper.toml or .yml)
    #[arg(short = 'c', long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// bitcoin.conf to operate on (overrides the config file)
    #[arg(long, global = true, value_name = "FILE", env = "BITCOIND_WRAPPER_CONF")]
    conf: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the values of selected keys
    Get(conf::GetArgs),

    /// Set or remove keys, leaving all other lines untouched
    Set(conf::SetArgs),

    /// Print the node settings form as JSON
    Show,

    /// Validate a settings form (JSON) and write it to bitcoin.conf
    Save(settings::SaveArgs),

    /// Show or edit mempool policy
    #[command(subcommand)]
    Mempool(mempool::MempoolCommand),

    /// Request a reindex on the next start
    Reindex(reindex::ReindexArgs),

    /// Apply the launch policy and print bitcoind arguments
    Launch(launch::LaunchArgs),

    /// Run a health check through bitcoin-cli
    Health(health::HealthArgs),
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG in the environment always takes precedence; --verbose falls back to DEBUG.
    let filter = if cli.verbose {
        EnvFilter::from_default_env().add_directive(Level::DEBUG.into())
    } else {
        EnvFilter::from_default_env().add_directive(Level::WARN.into())
    };
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init();

    let cfg = wrapper_config(cli.config.as_deref(), cli.conf)?;

    match cli.command {
        Commands::Get(args) => conf::get(args, &cfg),
        Commands::Set(args) => conf::set(args, &cfg),
        Commands::Show => settings::show(&cfg),
        Commands::Save(args) => settings::save(args, &cfg),
        Commands::Mempool(cmd) => mempool::run(cmd, &cfg),
        Commands::Reindex(args) => reindex::run(args, &cfg),
        Commands::Launch(args) => launch::run(args, &cfg),
        Commands::Health(args) => health::run(args, &cfg),
    }
}

fn wrapper_config(
    config_path: Option<&std::path::Path>,
    conf: Option<PathBuf>,
) -> Result<WrapperConfig> {
    let cwd = std::env::current_dir()?;
    let mut cfg = load_config(&cwd, config_path)?;
    if let Some(conf) = conf {
        cfg.conf_path = conf;
    }
    Ok(cfg)
}
