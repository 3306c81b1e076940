//! Ordered key → values update sets

use super::key::ConfigKey;

/// The desired final values for a set of keys.
///
/// Insertion order is kept so that keys appended to a section come out in
/// the order they were set. Setting a key twice replaces its values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfUpdates {
    entries: Vec<(ConfigKey, Vec<String>)>,
}

impl ConfUpdates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the complete value list for `key`. An empty list removes the key.
    pub fn set<I, S>(&mut self, key: ConfigKey, values: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values: Vec<String> = values.into_iter().map(Into::into).collect();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = values,
            None => self.entries.push((key, values)),
        }
        self
    }

    /// Set a top-level key to a single value.
    pub fn set_one(&mut self, name: &str, value: impl Into<String>) -> &mut Self {
        self.set(ConfigKey::top(name), [value.into()])
    }

    /// Set a top-level boolean as `1`/`0`.
    pub fn set_flag(&mut self, name: &str, on: bool) -> &mut Self {
        self.set_one(name, if on { "1" } else { "0" })
    }

    /// Remove every occurrence of a top-level key.
    pub fn unset(&mut self, name: &str) -> &mut Self {
        self.set(ConfigKey::top(name), Vec::<String>::new())
    }

    pub fn get(&self, key: &ConfigKey) -> Option<&[String]> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ConfigKey, &[String])> {
        self.entries.iter().map(|(k, v)| (k, v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setting_twice_replaces_and_keeps_position() {
        let mut updates = ConfUpdates::new();
        updates.set_one("a", "1").set_one("b", "2").set(ConfigKey::top("a"), ["3", "4"]);

        let keys: Vec<String> = updates.iter().map(|(k, _)| k.to_string()).collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(updates.get(&ConfigKey::top("a")), Some(&["3".to_string(), "4".to_string()][..]));
    }

    #[test]
    fn unset_records_empty_values() {
        let mut updates = ConfUpdates::new();
        updates.unset("prune");
        assert!(updates.get(&ConfigKey::top("prune")).is_some_and(|v| v.is_empty()));
    }
}
