//! File-backed config handle

use super::document::{ConfDocument, ConfValues, Merged};
use super::error::ConfError;
use super::key::ConfigKey;
use super::updates::ConfUpdates;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// A `bitcoin.conf` on disk.
///
/// Each call reads the whole file again; nothing is cached between calls.
/// Callers must not run merges against the same file concurrently.
#[derive(Debug, Clone)]
pub struct ConfFile {
    path: PathBuf,
}

impl ConfFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parse the current file contents.
    pub fn read_all(&self) -> Result<ConfDocument, ConfError> {
        let text = fs::read_to_string(&self.path).map_err(|e| ConfError::io(&self.path, e))?;
        tracing::debug!("Read {} ({} bytes)", self.path.display(), text.len());
        Ok(ConfDocument::parse(&text))
    }

    pub fn read_keys<'a, I>(&self, keys: I) -> Result<ConfValues, ConfError>
    where
        I: IntoIterator<Item = &'a ConfigKey>,
    {
        Ok(self.read_all()?.read_selected(keys))
    }

    /// Apply `updates` and store the result.
    ///
    /// The new text is computed in full before anything is written, and the
    /// file is only replaced when some key actually changed.
    pub fn merge(&self, updates: &ConfUpdates) -> Result<Merged, ConfError> {
        let merged = self.read_all()?.merge(updates)?;
        if !merged.is_changed() {
            tracing::debug!("No changes for {}", self.path.display());
            return Ok(merged);
        }

        let changed: Vec<String> = merged.changed.iter().map(ToString::to_string).collect();
        tracing::info!("Updating {}: {}", self.path.display(), changed.join(", "));
        write_file_atomic(&self.path, merged.text.as_bytes())?;
        Ok(merged)
    }
}

/// Write through a sibling temp file so readers never see a partial file.
///
/// An existing file keeps its permissions. A new file is created owner-only.
pub(crate) fn write_file_atomic(path: &Path, bytes: &[u8]) -> Result<(), ConfError> {
    let permissions = fs::metadata(path).ok().map(|m| m.permissions());
    write_atomic(path, bytes, permissions)
}

/// Like [`write_file_atomic`], but the result is always owner-only.
#[cfg(unix)]
pub(crate) fn write_file_private(path: &Path, bytes: &[u8]) -> Result<(), ConfError> {
    use std::os::unix::fs::PermissionsExt;
    write_atomic(path, bytes, Some(fs::Permissions::from_mode(0o600)))
}

#[cfg(not(unix))]
pub(crate) fn write_file_private(path: &Path, bytes: &[u8]) -> Result<(), ConfError> {
    write_atomic(path, bytes, None)
}

fn write_atomic(
    path: &Path,
    bytes: &[u8],
    permissions: Option<fs::Permissions>,
) -> Result<(), ConfError> {
    let file_name = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
    let tmp = path.with_file_name(format!(".{}.tmp", file_name));

    let result = write_temp(&tmp, bytes, permissions).and_then(|()| {
        fs::rename(&tmp, path).map_err(|e| ConfError::io(path, e))
    });
    if result.is_err() {
        let _ = fs::remove_file(&tmp);
    }
    result
}

/// The temp file never has wider permissions than the file it replaces.
fn write_temp(
    tmp: &Path,
    bytes: &[u8],
    permissions: Option<fs::Permissions>,
) -> Result<(), ConfError> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(tmp).map_err(|e| ConfError::io(tmp, e))?;
    if let Some(permissions) = permissions {
        file.set_permissions(permissions).map_err(|e| ConfError::io(tmp, e))?;
    }
    file.write_all(bytes).map_err(|e| ConfError::io(tmp, e))?;
    file.sync_all().map_err(|e| ConfError::io(tmp, e))
}
