//! Sectioned `bitcoin.conf` reading and merging
//!
//! The file is a flat list of `key=value` lines, optionally split into
//! `[main]`, `[test]`, `[signet]` and `[regtest]` sections. Reads extract the
//! values of selected keys; merges rewrite those keys in place while every
//! other line (comments, blank lines, unknown content) is copied through.

pub mod document;
pub mod error;
pub mod file;
pub mod key;
pub mod updates;

pub use document::{ConfDocument, ConfValues, Merged};
pub use error::ConfError;
pub use file::ConfFile;
pub use key::{ConfigKey, Section};
pub use updates::ConfUpdates;
