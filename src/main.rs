//! bitcoind-wrapper: manage a bitcoind node's configuration and launch
//!
//! Edits `bitcoin.conf` in place without disturbing unrelated lines, applies
//! the pruning and reindex policy at startup and reports node health.

use anyhow::Result;

fn main() -> Result<()> {
    bitcoind_wrapper::cli::run()
}
