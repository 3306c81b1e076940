//! Structured node settings backed by `bitcoin.conf`
//!
//! [`NodeSettings`] is the form the host platform shows to the user. It is
//! rebuilt from the file on every read and turned back into key updates on
//! save; keys the form does not know about are never touched.

pub mod mempool;
pub mod read;
pub mod save;
pub mod validate;

use crate::conf::ConfError;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub use mempool::{read_mempool, write_mempool, MempoolSettings};
pub use read::{read_settings, settings_from_values, SETTINGS_KEYS};
pub use save::{save_settings, to_updates};
pub use validate::validate;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error(transparent)]
    Conf(#[from] ConfError),

    #[error("invalid {field}: {reason}")]
    Invalid { field: String, reason: String },
}

impl SettingsError {
    pub(crate) fn invalid(field: &str, reason: impl Into<String>) -> Self {
        Self::Invalid { field: field.to_string(), reason: reason.into() }
    }
}

pub const DEFAULT_RPC_USERNAME: &str = "bitcoin";
pub const DEFAULT_SERVERTIMEOUT: u32 = 30;
pub const DEFAULT_RPC_THREADS: u32 = 16;
pub const DEFAULT_WORKQUEUE: u32 = 128;
pub const DEFAULT_DISCARDFEE: f64 = 0.0001;
pub const DEFAULT_MAXMEMPOOL: u32 = 300;
pub const DEFAULT_MEMPOOLEXPIRY: u32 = 336;
pub const DEFAULT_PRUNE_SIZE: u32 = 550;

/// Complete node configuration form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeSettings {
    pub rpc: RpcSettings,
    #[serde(rename = "zmq-enabled")]
    pub zmq_enabled: bool,
    pub txindex: bool,
    pub wallet: WalletSettings,
    pub advanced: AdvancedSettings,
}

impl Default for NodeSettings {
    fn default() -> Self {
        Self {
            rpc: RpcSettings::default(),
            zmq_enabled: true,
            txindex: true,
            wallet: WalletSettings::default(),
            advanced: AdvancedSettings::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RpcSettings {
    /// Allow remote RPC requests.
    pub enable: bool,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    pub advanced: RpcAdvanced,
}

impl Default for RpcSettings {
    fn default() -> Self {
        Self {
            enable: true,
            username: DEFAULT_RPC_USERNAME.to_string(),
            password: None,
            advanced: RpcAdvanced::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SerialVersion {
    NonSegwit,
    #[default]
    Segwit,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RpcAdvanced {
    /// `rpcauth` entries of the form `<user>:<salt>$<hash>`.
    pub auth: Vec<String>,
    pub serialversion: SerialVersion,
    /// Seconds.
    pub servertimeout: u32,
    pub threads: u32,
    pub workqueue: u32,
}

impl Default for RpcAdvanced {
    fn default() -> Self {
        Self {
            auth: Vec::new(),
            serialversion: SerialVersion::Segwit,
            servertimeout: DEFAULT_SERVERTIMEOUT,
            threads: DEFAULT_RPC_THREADS,
            workqueue: DEFAULT_WORKQUEUE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WalletSettings {
    pub enable: bool,
    pub avoidpartialspends: bool,
    /// BTC/kB.
    pub discardfee: f64,
}

impl Default for WalletSettings {
    fn default() -> Self {
        Self { enable: true, avoidpartialspends: true, discardfee: DEFAULT_DISCARDFEE }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvancedSettings {
    pub mempool: MempoolPolicy,
    pub peers: PeerSettings,
    /// MiB; unset leaves the daemon default.
    pub dbcache: Option<u32>,
    pub pruning: Pruning,
    pub blockfilters: BlockFilters,
    pub bloomfilters: BloomFilters,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MempoolPolicy {
    pub mempoolfullrbf: bool,
    pub persistmempool: bool,
    /// MiB.
    pub maxmempool: u32,
    /// Hours.
    pub mempoolexpiry: u32,
}

impl Default for MempoolPolicy {
    fn default() -> Self {
        Self {
            mempoolfullrbf: false,
            persistmempool: true,
            maxmempool: DEFAULT_MAXMEMPOOL,
            mempoolexpiry: DEFAULT_MEMPOOLEXPIRY,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PeerSettings {
    /// Make the node reachable by other peers.
    pub listen: bool,
    /// Only connect to `addnode` peers (written as `connect=`).
    pub onlyconnect: bool,
    pub onlyonion: bool,
    pub addnode: Vec<Peer>,
}

impl Default for PeerSettings {
    fn default() -> Self {
        Self { listen: true, onlyconnect: false, onlyonion: false, addnode: Vec::new() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Peer {
    pub hostname: String,
    #[serde(default)]
    pub port: Option<u16>,
}

impl Peer {
    /// Split a `host[:port]` address. IPv6 hosts with a port use `[addr]:port`.
    pub fn parse(addr: &str) -> Self {
        if let Some(rest) = addr.strip_prefix('[') {
            if let Some((host, tail)) = rest.split_once(']') {
                let port = tail.strip_prefix(':').and_then(|p| p.parse().ok());
                return Self { hostname: host.to_string(), port };
            }
        }
        match addr.rsplit_once(':') {
            Some((host, port)) if !host.contains(':') => {
                Self { hostname: host.to_string(), port: port.parse().ok() }
            }
            _ => Self { hostname: addr.to_string(), port: None },
        }
    }
}

impl fmt::Display for Peer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.port {
            Some(port) if self.hostname.contains(':') => write!(f, "[{}]:{}", self.hostname, port),
            Some(port) => write!(f, "{}:{}", self.hostname, port),
            None => f.write_str(&self.hostname),
        }
    }
}

/// Block pruning mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum Pruning {
    #[default]
    Disabled,
    /// Keep at most `size` MiB of blocks.
    Automatic { size: u32 },
    /// Pruning only through the `pruneblockchain` RPC.
    Manual,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlockFilters {
    /// BIP158 filter index.
    pub blockfilterindex: bool,
    /// Serve BIP157 filters to peers.
    pub peerblockfilters: bool,
}

impl Default for BlockFilters {
    fn default() -> Self {
        Self { blockfilterindex: true, peerblockfilters: false }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BloomFilters {
    pub peerbloomfilters: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn peer_addresses_parse_and_render() {
        let v4 = Peer::parse("1.2.3.4:8333");
        assert_eq!(v4, Peer { hostname: "1.2.3.4".into(), port: Some(8333) });
        assert_eq!(v4.to_string(), "1.2.3.4:8333");

        let v6 = Peer::parse("[2001:db8::1]:8333");
        assert_eq!(v6.hostname, "2001:db8::1");
        assert_eq!(v6.to_string(), "[2001:db8::1]:8333");

        let bare = Peer::parse("2001:db8::1");
        assert_eq!(bare.port, None);
        assert_eq!(Peer::parse("node.example.com").to_string(), "node.example.com");
    }

    #[test]
    fn partial_json_fills_defaults() {
        let settings: NodeSettings =
            serde_json::from_str(r#"{"rpc":{"username":"satoshi"},"advanced":{"pruning":{"mode":"automatic","size":2000}}}"#)
                .expect("json");
        assert_eq!(settings.rpc.username, "satoshi");
        assert!(settings.rpc.enable);
        assert_eq!(settings.advanced.pruning, Pruning::Automatic { size: 2000 });
        assert_eq!(settings.advanced.mempool.maxmempool, DEFAULT_MAXMEMPOOL);
        assert!(settings.zmq_enabled);
    }
}
