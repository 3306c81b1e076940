//! RPC proxy configuration for pruned nodes
//!
//! When pruned, bitcoind serves RPC on a loopback port and `btc_rpc_proxy`
//! takes over the public RPC port.

use super::LaunchError;
use crate::conf::file::write_file_private;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyConfig {
    pub bitcoind_address: String,
    pub bitcoind_port: u16,
    pub bind_address: String,
    pub bind_port: u16,
    pub cookie_file: String,
    pub tor_proxy: String,
    pub tor_only: bool,
}

impl ProxyConfig {
    pub fn to_toml(&self) -> Result<String, LaunchError> {
        Ok(toml::to_string(self)?)
    }

    /// Write the config readable by the owner only; it names the cookie file.
    pub fn write(&self, path: &Path) -> Result<(), LaunchError> {
        write_file_private(path, self.to_toml()?.as_bytes())?;
        tracing::debug!("Wrote RPC proxy config to {}", path.display());
        Ok(())
    }
}
