//! Mempool policy action
//!
//! A narrower form than [`super::NodeSettings`] that edits only the relay
//! and mempool keys, including the data-carrier and bare-multisig policy.

use super::read::{flag, parse_logged};
use super::validate::check_range;
use super::{SettingsError, DEFAULT_MAXMEMPOOL, DEFAULT_MEMPOOLEXPIRY};
use crate::conf::{ConfFile, ConfUpdates, ConfValues, ConfigKey, Merged};
use serde::{Deserialize, Serialize};

pub const DEFAULT_DATACARRIERSIZE: u32 = 83;
const MAX_DATACARRIERSIZE: u32 = 10_000;

const MEMPOOL_KEYS: &[&str] = &[
    "persistmempool",
    "maxmempool",
    "mempoolexpiry",
    "mempoolfullrbf",
    "permitbaremultisig",
    "datacarrier",
    "datacarriersize",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MempoolSettings {
    pub persistmempool: bool,
    /// MiB; `None` writes the default.
    pub maxmempool: Option<u32>,
    /// Hours; `None` writes the default.
    pub mempoolexpiry: Option<u32>,
    pub mempoolfullrbf: bool,
    pub permitbaremultisig: bool,
    /// Relay OP_RETURN transactions.
    pub datacarrier: bool,
    /// Bytes; `None` writes the default.
    pub datacarriersize: Option<u32>,
}

impl Default for MempoolSettings {
    fn default() -> Self {
        Self {
            persistmempool: true,
            maxmempool: Some(DEFAULT_MAXMEMPOOL),
            mempoolexpiry: Some(DEFAULT_MEMPOOLEXPIRY),
            mempoolfullrbf: false,
            permitbaremultisig: true,
            datacarrier: true,
            datacarriersize: Some(DEFAULT_DATACARRIERSIZE),
        }
    }
}

impl MempoolSettings {
    /// Pre-fill from the file: toggles fall back to defaults, sizes stay
    /// unset when the file has none.
    pub fn from_values(conf: &ConfValues) -> Self {
        let defaults = Self::default();
        let size = |name: &str| conf.first(name).and_then(|v| parse_logged::<u32>(name, v));
        Self {
            persistmempool: flag(conf, "persistmempool", defaults.persistmempool),
            maxmempool: size("maxmempool"),
            mempoolexpiry: size("mempoolexpiry"),
            mempoolfullrbf: flag(conf, "mempoolfullrbf", defaults.mempoolfullrbf),
            permitbaremultisig: flag(conf, "permitbaremultisig", defaults.permitbaremultisig),
            datacarrier: flag(conf, "datacarrier", defaults.datacarrier),
            datacarriersize: size("datacarriersize"),
        }
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if let Some(v) = self.maxmempool {
            check_range("maxmempool", v, 1, None)?;
        }
        if let Some(v) = self.mempoolexpiry {
            check_range("mempoolexpiry", v, 1, None)?;
        }
        if let Some(v) = self.datacarriersize {
            check_range("datacarriersize", v, 0, Some(MAX_DATACARRIERSIZE))?;
        }
        Ok(())
    }

    pub fn to_updates(&self) -> ConfUpdates {
        let mut u = ConfUpdates::new();
        u.set_flag("mempoolfullrbf", self.mempoolfullrbf)
            .set_flag("persistmempool", self.persistmempool)
            .set_flag("datacarrier", self.datacarrier)
            .set_flag("permitbaremultisig", self.permitbaremultisig)
            .set_one("maxmempool", self.maxmempool.unwrap_or(DEFAULT_MAXMEMPOOL).to_string())
            .set_one(
                "mempoolexpiry",
                self.mempoolexpiry.unwrap_or(DEFAULT_MEMPOOLEXPIRY).to_string(),
            )
            .set_one(
                "datacarriersize",
                self.datacarriersize.unwrap_or(DEFAULT_DATACARRIERSIZE).to_string(),
            );
        u
    }
}

pub fn read_mempool(conf: &ConfFile) -> Result<MempoolSettings, SettingsError> {
    let keys: Vec<ConfigKey> = MEMPOOL_KEYS.iter().map(|k| ConfigKey::top(*k)).collect();
    Ok(MempoolSettings::from_values(&conf.read_keys(&keys)?))
}

pub fn write_mempool(conf: &ConfFile, settings: &MempoolSettings) -> Result<Merged, SettingsError> {
    settings.validate()?;
    Ok(conf.merge(&settings.to_updates())?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn read_prefills_toggles_but_not_sizes() {
        let tmp = TempDir::new().expect("tmp");
        let path = tmp.path().join("bitcoin.conf");
        fs::write(&path, "datacarrier=0\nmaxmempool=500\n").expect("write");

        let m = read_mempool(&ConfFile::new(&path)).expect("read");
        assert!(!m.datacarrier);
        assert!(m.persistmempool);
        assert!(m.permitbaremultisig);
        assert_eq!(m.maxmempool, Some(500));
        assert_eq!(m.mempoolexpiry, None);
        assert_eq!(m.datacarriersize, None);
    }

    #[test]
    fn write_fills_missing_sizes_with_defaults() {
        let tmp = TempDir::new().expect("tmp");
        let path = tmp.path().join("bitcoin.conf");
        fs::write(&path, "txindex=1\n").expect("write");
        let conf = ConfFile::new(&path);

        let m = MempoolSettings {
            maxmempool: None,
            mempoolexpiry: Some(72),
            datacarriersize: None,
            ..MempoolSettings::default()
        };
        write_mempool(&conf, &m).expect("write");

        let text = fs::read_to_string(&path).expect("read");
        assert!(text.starts_with("txindex=1\n"));
        assert!(text.contains("maxmempool=300\n"));
        assert!(text.contains("mempoolexpiry=72\n"));
        assert!(text.contains("datacarriersize=83\n"));
        assert!(text.contains("permitbaremultisig=1\n"));
    }

    #[test]
    fn rejects_oversized_data_carrier() {
        let m = MempoolSettings { datacarriersize: Some(20_000), ..MempoolSettings::default() };
        assert!(matches!(m.validate(), Err(SettingsError::Invalid { .. })));
    }
}
