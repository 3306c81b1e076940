//! Persisted package flags

use super::LaunchError;
use crate::conf::file::write_file_atomic;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Which database a reindex request rebuilds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReindexKind {
    /// Blocks and chainstate from genesis (`-reindex`).
    Blockchain,
    /// Chainstate only, from blocks on disk (`-reindex-chainstate`).
    Chainstate,
}

/// Flags that survive restarts, stored as JSON next to the node data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackageStore {
    pub reindex_blockchain: bool,
    pub reindex_chainstate: bool,
    #[serde(skip)]
    path: PathBuf,
}

impl PackageStore {
    /// Load the store, starting empty when the file does not exist yet.
    pub fn load(path: &Path) -> Result<Self, LaunchError> {
        let mut store = match fs::read_to_string(path) {
            Ok(text) => serde_json::from_str::<PackageStore>(&text)
                .map_err(|source| LaunchError::Store { path: path.to_path_buf(), source })?,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!("No store at {}, using defaults", path.display());
                PackageStore::default()
            }
            Err(e) => return Err(LaunchError::Io { path: path.to_path_buf(), source: e }),
        };
        store.path = path.to_path_buf();
        Ok(store)
    }

    pub fn save(&self) -> Result<(), LaunchError> {
        let text = serde_json::to_string_pretty(self)
            .map_err(|source| LaunchError::Store { path: self.path.clone(), source })?;
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .map_err(|source| LaunchError::Io { path: parent.to_path_buf(), source })?;
        }
        write_file_atomic(&self.path, text.as_bytes())?;
        Ok(())
    }

    pub fn request(&mut self, kind: ReindexKind) {
        match kind {
            ReindexKind::Blockchain => self.reindex_blockchain = true,
            ReindexKind::Chainstate => self.reindex_chainstate = true,
        }
    }

    /// Clear a pending request, returning whether one was set.
    pub fn take(&mut self, kind: ReindexKind) -> bool {
        let flag = match kind {
            ReindexKind::Blockchain => &mut self.reindex_blockchain,
            ReindexKind::Chainstate => &mut self.reindex_chainstate,
        };
        std::mem::take(flag)
    }
}

/// Record a reindex request and describe when it takes effect.
pub fn request_reindex(
    store_path: &Path,
    kind: ReindexKind,
    stopped: bool,
) -> Result<String, LaunchError> {
    let mut store = PackageStore::load(store_path)?;
    store.request(kind);
    store.save()?;
    tracing::info!("Reindex ({:?}) requested", kind);

    let message = if stopped {
        "Bitcoin Core will reindex the next time the service is started."
    } else {
        "Bitcoin Core is restarting in reindex mode."
    };
    Ok(message.to_string())
}
