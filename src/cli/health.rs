//! Health check command

use anyhow::Result;
use clap::{Args, ValueEnum};

use super::utils::{print_json, OutputFormat};
use crate::conf::ConfFile;
use crate::config::WrapperConfig;
use crate::health::{rpc_ready, run_cli, sync_progress, HealthResult};
use crate::launch::rpc_port;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Check {
    /// Block sync progress (`getblockchaininfo`)
    Sync,
    /// RPC interface readiness (`getrpcinfo`)
    Rpc,
}

#[derive(Args)]
pub struct HealthArgs {
    #[arg(value_enum)]
    pub check: Check,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

pub fn run(args: HealthArgs, cfg: &WrapperConfig) -> Result<()> {
    let port = rpc_port(&ConfFile::new(&cfg.conf_path), cfg)?;

    let check = match args.check {
        Check::Sync => sync_progress(&run_cli(cfg, port, "getblockchaininfo")?),
        Check::Rpc => rpc_ready(&run_cli(cfg, port, "getrpcinfo")?),
    };

    match args.format {
        OutputFormat::Text => {
            let label = match check.result {
                HealthResult::Success => "success",
                HealthResult::Loading => "loading",
                HealthResult::Starting => "starting",
                HealthResult::Failure => "failure",
            };
            match &check.message {
                Some(message) => println!("{}: {}", label, message),
                None => println!("{}", label),
            }
        }
        OutputFormat::Json => print_json(&check)?,
    }

    if check.result == HealthResult::Failure {
        anyhow::bail!("Health check failed");
    }
    Ok(())
}
