//! Section names and qualified config keys

use super::error::ConfError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A recognised `bitcoin.conf` network section.
///
/// Any other bracketed header is not a section and is preserved as inert text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Main,
    Test,
    Signet,
    Regtest,
}

impl Section {
    pub const ALL: [Section; 4] = [Section::Main, Section::Test, Section::Signet, Section::Regtest];

    pub fn as_str(self) -> &'static str {
        match self {
            Section::Main => "main",
            Section::Test => "test",
            Section::Signet => "signet",
            Section::Regtest => "regtest",
        }
    }

    /// Exact, case-sensitive lookup.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == name)
    }

    pub fn header(self) -> String {
        format!("[{}]", self.as_str())
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A key addressed by its section and bare name.
///
/// `rpcport` and `test.rpcport` are different keys.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConfigKey {
    pub section: Option<Section>,
    pub name: String,
}

impl ConfigKey {
    /// Key in the implicit top-level section.
    pub fn top(name: impl Into<String>) -> Self {
        Self { section: None, name: name.into() }
    }

    pub fn in_section(section: Section, name: impl Into<String>) -> Self {
        Self { section: Some(section), name: name.into() }
    }

    pub(crate) fn validate_name(name: &str) -> Result<(), ConfError> {
        let bad = name.is_empty()
            || name.trim() != name
            || name.contains(['=', '#', '\n', '\r']);
        if bad {
            return Err(ConfError::InvalidKey(name.to_string()));
        }
        Ok(())
    }
}

impl FromStr for ConfigKey {
    type Err = ConfError;

    /// Parse the `section.name` convention used on the command line.
    ///
    /// A prefix that is not a known section is part of the bare name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = match s.split_once('.') {
            Some((prefix, rest)) if !rest.is_empty() => match Section::from_name(prefix) {
                Some(section) => ConfigKey::in_section(section, rest),
                None => ConfigKey::top(s),
            },
            _ => ConfigKey::top(s),
        };
        Self::validate_name(&key.name)?;
        Ok(key)
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.section {
            Some(section) => write!(f, "{}.{}", section, self.name),
            None => f.write_str(&self.name),
        }
    }
}
