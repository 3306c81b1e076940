//! Errors raised by config file operations

use std::path::PathBuf;
use thiserror::Error;

/// Error type for `bitcoin.conf` reads and merges.
///
/// Malformed lines are never an error: anything the parser does not
/// recognise is treated as inert text and preserved.
#[derive(Debug, Error)]
pub enum ConfError {
    /// The file could not be read, or the rewritten file could not be stored.
    #[error("I/O error accessing {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A key name that cannot be written as a `key=value` line.
    #[error("invalid config key '{0}'")]
    InvalidKey(String),

    /// A value that would split into several lines when written.
    #[error("value for '{key}' contains a line break")]
    MultilineValue { key: String },

    /// Trailing whitespace would be lost when the line is read back.
    #[error("value for '{key}' ends with whitespace")]
    TrailingWhitespace { key: String },
}

impl ConfError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }
}
