//! Launch command implementation

use anyhow::Result;
use clap::Args;

use super::utils::{print_json, OutputFormat};
use crate::conf::ConfFile;
use crate::config::WrapperConfig;
use crate::launch::{disk_total, plan_launch, LaunchEnv, PackageStore};

#[derive(Args)]
pub struct LaunchArgs {
    /// Host IP serving the Tor SOCKS proxy
    #[arg(long, value_name = "IP")]
    pub os_ip: String,

    /// Public URL of the peer interface (repeatable)
    #[arg(long = "onion-url", value_name = "URL")]
    pub onion_urls: Vec<String>,

    /// Use this disk capacity instead of querying the data disk
    #[arg(long, value_name = "BYTES")]
    pub disk_total: Option<u64>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

pub fn run(args: LaunchArgs, cfg: &WrapperConfig) -> Result<()> {
    let disk_total = match args.disk_total {
        Some(bytes) => bytes,
        None => disk_total(&cfg.disk_path)?,
    };
    let env = LaunchEnv {
        config: cfg,
        disk_total,
        os_ip: args.os_ip,
        peer_urls: args.onion_urls,
    };

    let conf = ConfFile::new(&cfg.conf_path);
    let mut store = PackageStore::load(&cfg.store_path)?;
    let plan = plan_launch(&conf, &mut store, &env)?;
    if plan.write_proxy_config(&cfg.proxy_config_path)? {
        tracing::info!("RPC proxy config written to {}", cfg.proxy_config_path.display());
    }

    match args.format {
        OutputFormat::Text => {
            for arg in &plan.args {
                println!("{}", arg);
            }
            Ok(())
        }
        OutputFormat::Json => print_json(&plan),
    }
}
