//! Settings form commands: `show` and `save`

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use super::utils::{print_json, read_input, report_merge};
use crate::conf::ConfFile;
use crate::config::WrapperConfig;
use crate::settings::{read_settings, save_settings, NodeSettings};

#[derive(Args)]
pub struct SaveArgs {
    /// Settings JSON as printed by `show` (`-` or omitted reads stdin)
    #[arg(value_name = "FILE")]
    pub input: Option<PathBuf>,
}

pub fn show(cfg: &WrapperConfig) -> Result<()> {
    let settings = read_settings(&ConfFile::new(&cfg.conf_path))?;
    print_json(&settings)
}

pub fn save(args: SaveArgs, cfg: &WrapperConfig) -> Result<()> {
    let text = read_input(args.input.as_deref())?;
    let settings: NodeSettings =
        serde_json::from_str(&text).context("Settings input is not valid JSON")?;
    let merged = save_settings(&ConfFile::new(&cfg.conf_path), &settings)?;
    report_merge(&merged, &cfg.conf_path);
    Ok(())
}
