//! Launch policy for bitcoind
//!
//! Decides the daemon arguments from disk capacity, the current config and
//! persisted reindex requests, adjusting `bitcoin.conf` where the policy
//! requires it (automatic pruning on small disks, onion `externalip`).

pub mod proxy;
pub mod store;

use crate::conf::{ConfError, ConfFile, ConfUpdates, ConfValues, ConfigKey};
use crate::config::WrapperConfig;
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub use proxy::ProxyConfig;
pub use store::{request_reindex, PackageStore, ReindexKind};

/// Placeholder the host writes until the onion address is known.
pub const EXTERNALIP_PLACEHOLDER: &str = "initial-setup";

#[derive(Debug, Error)]
pub enum LaunchError {
    #[error(transparent)]
    Conf(#[from] ConfError),

    #[error("invalid store file {}: {source}", path.display())]
    Store {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("I/O error accessing {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize proxy config: {0}")]
    Proxy(#[from] toml::ser::Error),
}

/// Facts about the host supplied by the platform.
#[derive(Debug, Clone)]
pub struct LaunchEnv<'a> {
    pub config: &'a WrapperConfig,
    /// Total capacity of the data disk in bytes.
    pub disk_total: u64,
    /// Host address that serves the Tor SOCKS proxy.
    pub os_ip: String,
    /// Public URLs of the peer interface.
    pub peer_urls: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LaunchPlan {
    pub args: Vec<String>,
    pub pruned: bool,
    /// Port health checks should query.
    pub rpc_port: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxy: Option<ProxyConfig>,
}

impl LaunchPlan {
    pub fn write_proxy_config(&self, path: &Path) -> Result<bool, LaunchError> {
        match &self.proxy {
            Some(proxy) => {
                proxy.write(path)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// Total size of the filesystem holding `path`.
pub fn disk_total(path: &Path) -> Result<u64, LaunchError> {
    fs2::total_space(path).map_err(|source| LaunchError::Io { path: path.to_path_buf(), source })
}

/// Whether `prune` is set to anything but `0`.
///
/// A value bitcoind may reject still counts as configured so the launch
/// policy never overwrites it.
fn prune_enabled(values: &ConfValues) -> bool {
    match values.first("prune").map(str::trim) {
        None => false,
        Some(v) => match v.parse::<u64>() {
            Ok(mib) => mib != 0,
            Err(_) => {
                tracing::warn!("prune={} is not a number; treating the node as pruned", v);
                true
            }
        },
    }
}

/// RPC port bitcoind listens on for the current config.
pub fn rpc_port(conf: &ConfFile, cfg: &WrapperConfig) -> Result<u16, LaunchError> {
    let values = conf.read_keys(&[ConfigKey::top("prune")])?;
    Ok(if prune_enabled(&values) { cfg.pruned_rpc_port } else { cfg.rpc_port })
}

/// `host[:port]` part of a URL such as `http://abc.onion:8333/`.
fn url_authority(url: &str) -> &str {
    let rest = url.split_once("://").map(|(_, r)| r).unwrap_or(url);
    rest.split('/').next().unwrap_or(rest)
}

pub fn plan_launch(
    conf: &ConfFile,
    store: &mut PackageStore,
    env: &LaunchEnv<'_>,
) -> Result<LaunchPlan, LaunchError> {
    let cfg = env.config;
    let keys = [ConfigKey::top("prune"), ConfigKey::top("externalip"), ConfigKey::top("onlynet")];
    let values = conf.read_keys(&keys)?;

    let mut pruned = prune_enabled(&values);

    if env.disk_total < cfg.archival_min_bytes && !pruned {
        tracing::info!(
            "Disk holds {} bytes, below the archival minimum of {}; enabling pruning",
            env.disk_total,
            cfg.archival_min_bytes
        );
        let mut updates = ConfUpdates::new();
        updates
            .set_one("prune", cfg.default_prune_mib.to_string())
            .set_one("rpcbind", format!("127.0.0.1:{}", cfg.pruned_rpc_port))
            .set_one("rpcallowip", "127.0.0.1/32");
        conf.merge(&updates)?;
        pruned = true;
    }

    let mut args = vec![
        format!("-onion={}:{}", env.os_ip, cfg.tor_port),
        format!("-datadir={}", cfg.data_dir.display()),
        format!("-conf={}", conf.path().display()),
    ];

    if values.first("externalip") == Some(EXTERNALIP_PLACEHOLDER) {
        let onion = env.peer_urls.iter().map(|u| url_authority(u)).find(|a| a.contains(".onion"));
        let mut updates = ConfUpdates::new();
        match onion {
            Some(addr) => {
                tracing::info!("Setting externalip to {}", addr);
                updates.set_one("externalip", addr);
            }
            None => {
                tracing::warn!("No onion address known yet; removing externalip placeholder");
                updates.unset("externalip");
            }
        }
        conf.merge(&updates)?;
    }

    let reindex_blockchain = store.take(ReindexKind::Blockchain);
    let reindex_chainstate = store.take(ReindexKind::Chainstate);
    if reindex_blockchain {
        // A full reindex rebuilds the chainstate as well.
        args.push("-reindex".to_string());
    } else if reindex_chainstate {
        args.push("-reindex-chainstate".to_string());
    }
    if reindex_blockchain || reindex_chainstate {
        store.save()?;
    }

    let rpc_port = if pruned { cfg.pruned_rpc_port } else { cfg.rpc_port };
    let proxy = pruned.then(|| ProxyConfig {
        bitcoind_address: "127.0.0.1".to_string(),
        bitcoind_port: cfg.pruned_rpc_port,
        bind_address: "0.0.0.0".to_string(),
        bind_port: cfg.rpc_port,
        cookie_file: cfg.cookie_file.display().to_string(),
        tor_proxy: format!("{}:{}", env.os_ip, cfg.tor_port),
        tor_only: !values.top("onlynet").is_empty(),
    });

    Ok(LaunchPlan { args, pruned, rpc_port, proxy })
}
