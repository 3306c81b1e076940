//! Mempool policy commands

use anyhow::{Context, Result};
use clap::Subcommand;
use std::path::PathBuf;

use super::utils::{print_json, read_input, report_merge};
use crate::conf::ConfFile;
use crate::config::WrapperConfig;
use crate::settings::{read_mempool, write_mempool, MempoolSettings};

#[derive(Subcommand)]
pub enum MempoolCommand {
    /// Print current mempool policy as JSON
    Show,

    /// Write mempool policy from JSON (`-` or omitted reads stdin)
    Set {
        #[arg(value_name = "FILE")]
        input: Option<PathBuf>,
    },
}

pub fn run(cmd: MempoolCommand, cfg: &WrapperConfig) -> Result<()> {
    let conf = ConfFile::new(&cfg.conf_path);
    match cmd {
        MempoolCommand::Show => print_json(&read_mempool(&conf)?),
        MempoolCommand::Set { input } => {
            let text = read_input(input.as_deref())?;
            let settings: MempoolSettings =
                serde_json::from_str(&text).context("Mempool input is not valid JSON")?;
            let merged = write_mempool(&conf, &settings)?;
            report_merge(&merged, &cfg.conf_path);
            Ok(())
        }
    }
}
