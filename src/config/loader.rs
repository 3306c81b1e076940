//! Config file loading

use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Toml, Yaml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const ENV_PREFIX: &str = "BITCOIND_WRAPPER_";

/// Settings of the wrapper process (not of bitcoind).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WrapperConfig {
    /// The managed `bitcoin.conf`.
    pub conf_path: PathBuf,
    pub data_dir: PathBuf,
    /// Persisted action flags (reindex requests).
    pub store_path: PathBuf,
    /// RPC proxy config written when the node is pruned.
    pub proxy_config_path: PathBuf,
    pub cookie_file: PathBuf,
    /// Mount point whose capacity decides automatic pruning.
    pub disk_path: PathBuf,
    /// Disks smaller than this get pruning turned on.
    pub archival_min_bytes: u64,
    /// MiB.
    pub default_prune_mib: u32,
    pub rpc_port: u16,
    /// Loopback RPC port bitcoind uses behind the proxy when pruned.
    pub pruned_rpc_port: u16,
    pub tor_port: u16,
    pub bitcoin_cli: String,
}

impl Default for WrapperConfig {
    fn default() -> Self {
        Self {
            conf_path: PathBuf::from("/data/bitcoin.conf"),
            data_dir: PathBuf::from("/data/"),
            store_path: PathBuf::from("/data/store.json"),
            proxy_config_path: PathBuf::from("/data/config.toml"),
            cookie_file: PathBuf::from("/data/.cookie"),
            disk_path: PathBuf::from("/"),
            archival_min_bytes: 900_000_000_000,
            default_prune_mib: 550,
            rpc_port: 8332,
            pruned_rpc_port: 18332,
            tor_port: 9050,
            bitcoin_cli: "bitcoin-cli".to_string(),
        }
    }
}

/// Load the wrapper config.
///
/// An explicit `config_path` must parse. An auto-discovered file that fails
/// to parse is reported and ignored.
pub fn load_config(search_dir: &Path, config_path: Option<&Path>) -> Result<WrapperConfig> {
    let config_path_provided = config_path.is_some();

    let discovered = match config_path {
        Some(path) => Some(path.to_path_buf()),
        None => discover_config(search_dir),
    };

    let base = Figment::from(Serialized::defaults(WrapperConfig::default()));
    let env = Env::prefixed(ENV_PREFIX);

    let Some(config_file) = discovered else {
        return extract(base.merge(env));
    };

    if config_path_provided && !config_file.exists() {
        anyhow::bail!("Config file not found: {}", config_file.display());
    }

    let ext = config_file.extension().and_then(|e| e.to_str()).unwrap_or("").to_ascii_lowercase();
    let with_file = match ext.as_str() {
        "toml" => base.clone().merge(Toml::file(&config_file)),
        "yaml" | "yml" => base.clone().merge(Yaml::file(&config_file)),
        other => {
            let err = anyhow::anyhow!(
                "Unsupported config extension '.{}' for file {}",
                other,
                config_file.display()
            );
            if config_path_provided {
                return Err(err);
            }
            tracing::warn!("{}", err);
            return extract(base.merge(env));
        }
    };

    match extract(with_file.merge(env.clone())) {
        Ok(cfg) => {
            tracing::debug!("Loaded wrapper config from {}", config_file.display());
            Ok(cfg)
        }
        Err(e) if config_path_provided => {
            Err(e.context(format!("Invalid config file: {}", config_file.display())))
        }
        Err(e) => {
            tracing::warn!(
                "Failed to parse auto-discovered config {}: {:#}",
                config_file.display(),
                e
            );
            extract(base.merge(env))
        }
    }
}

fn extract(figment: Figment) -> Result<WrapperConfig> {
    figment.extract().context("Failed to assemble wrapper config")
}

fn discover_config(search_dir: &Path) -> Option<PathBuf> {
    let candidates = [
        "bitcoind-wrapper.toml",
        ".bitcoind-wrapper.toml",
        "bitcoind-wrapper.yml",
        "bitcoind-wrapper.yaml",
    ];

    for candidate in candidates {
        let path = search_dir.join(candidate);
        if path.exists() {
            return Some(path);
        }
    }

    None
}
