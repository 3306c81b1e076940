//! Reindex request command

use anyhow::Result;
use clap::Args;

use crate::config::WrapperConfig;
use crate::launch::{request_reindex, ReindexKind};

#[derive(Args)]
pub struct ReindexArgs {
    /// Rebuild only the chainstate from blocks on disk
    #[arg(long)]
    pub chainstate: bool,

    /// The service is currently stopped
    #[arg(long)]
    pub stopped: bool,
}

pub fn run(args: ReindexArgs, cfg: &WrapperConfig) -> Result<()> {
    let kind = if args.chainstate { ReindexKind::Chainstate } else { ReindexKind::Blockchain };
    let message = request_reindex(&cfg.store_path, kind, args.stopped)?;
    println!("{}", message);
    Ok(())
}
