//! Line-level model of a config file and the read/merge transforms over it

use super::error::ConfError;
use super::key::{ConfigKey, Section};
use super::updates::ConfUpdates;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeMap, HashMap, HashSet};

static SECTION_HEADER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\[(main|test|signet|regtest)\]$").expect("valid regex"));

static ASSIGNMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([^=#]+)=(.*)$").expect("valid regex"));

#[derive(Debug, Clone, PartialEq, Eq)]
enum LineKind {
    Header(Section),
    Assignment { name: String, value: String },
    Inert,
}

#[derive(Debug, Clone)]
struct ConfLine {
    /// Exact original text, without the terminating `\n`.
    raw: String,
    kind: LineKind,
    /// Section the line belongs to. Headers carry the section they open.
    section: Option<Section>,
}

fn classify(raw: &str) -> LineKind {
    let line = raw.trim();
    if let Some(caps) = SECTION_HEADER.captures(line) {
        if let Some(section) = Section::from_name(&caps[1]) {
            return LineKind::Header(section);
        }
    }
    if let Some(caps) = ASSIGNMENT.captures(line) {
        return LineKind::Assignment {
            name: caps[1].trim().to_string(),
            value: caps[2].to_string(),
        };
    }
    LineKind::Inert
}

/// A parsed config file, alive for one read or merge.
#[derive(Debug, Clone, Default)]
pub struct ConfDocument {
    lines: Vec<ConfLine>,
}

/// Result of [`ConfDocument::merge`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Merged {
    pub text: String,
    /// Keys whose lines were actually rewritten, added or removed.
    pub changed: Vec<ConfigKey>,
}

impl Merged {
    pub fn is_changed(&self) -> bool {
        !self.changed.is_empty()
    }
}

impl ConfDocument {
    pub fn parse(text: &str) -> Self {
        let mut raws: Vec<&str> = text.split('\n').collect();
        if raws.last() == Some(&"") {
            raws.pop();
        }

        let mut section = None;
        let lines = raws
            .into_iter()
            .map(|raw| {
                let kind = classify(raw);
                if let LineKind::Header(s) = kind {
                    section = Some(s);
                }
                ConfLine { raw: raw.to_string(), kind, section }
            })
            .collect();

        Self { lines }
    }

    pub fn raw_lines(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(|l| l.raw.as_str())
    }

    /// Every assignment in file order, as `(key, value)`.
    pub fn assignments(&self) -> impl Iterator<Item = (ConfigKey, &str)> {
        self.lines.iter().filter_map(|line| match &line.kind {
            LineKind::Assignment { name, value } => Some((
                ConfigKey { section: line.section, name: name.clone() },
                value.as_str(),
            )),
            _ => None,
        })
    }

    /// The document text with a normalised trailing newline.
    pub fn render(&self) -> String {
        join_lines(self.raw_lines())
    }

    /// Collect the values of `keys` in file order.
    ///
    /// Every requested key is present in the result, with an empty list when
    /// the file does not set it.
    pub fn read_selected<'a, I>(&self, keys: I) -> ConfValues
    where
        I: IntoIterator<Item = &'a ConfigKey>,
    {
        let mut values: BTreeMap<ConfigKey, Vec<String>> =
            keys.into_iter().map(|k| (k.clone(), Vec::new())).collect();

        for (key, value) in self.assignments() {
            if let Some(found) = values.get_mut(&key) {
                found.push(value.to_string());
            }
        }

        ConfValues { values }
    }

    /// Rewrite the targeted keys and return the new file text.
    ///
    /// A key whose values already match the file is left byte-for-byte alone.
    /// Otherwise its first occurrence in the section is replaced by the new
    /// lines and later occurrences are dropped. Keys not in the file are
    /// appended at the end of their section, which is created at the end of
    /// the file if missing. Blocks of a repeated section header count as one
    /// section: appends go to the end of the last block.
    pub fn merge(&self, updates: &ConfUpdates) -> Result<Merged, ConfError> {
        for (key, values) in updates.iter() {
            ConfigKey::validate_name(&key.name)?;
            if values.iter().any(|v| v.contains(['\n', '\r'])) {
                return Err(ConfError::MultilineValue { key: key.to_string() });
            }
            if values.iter().any(|v| v.trim_end() != v) {
                return Err(ConfError::TrailingWhitespace { key: key.to_string() });
            }
        }

        let section_end = self.section_ends();

        let mut replace_at: HashMap<usize, Vec<String>> = HashMap::new();
        let mut dropped: HashSet<usize> = HashSet::new();
        let mut append_at: BTreeMap<usize, Vec<String>> = BTreeMap::new();
        let mut new_sections: BTreeMap<Section, Vec<String>> = BTreeMap::new();
        let mut changed = Vec::new();

        for (key, values) in updates.iter() {
            let occurrences: Vec<(usize, &str)> = self.occurrences(key).collect();
            let unchanged = occurrences.len() == values.len()
                && occurrences.iter().zip(values).all(|((_, old), new)| *old == new.as_str());
            if unchanged {
                continue;
            }

            let rendered: Vec<String> =
                values.iter().map(|v| format!("{}={}", key.name, v)).collect();

            if let Some((&(first, _), rest)) = occurrences.split_first() {
                replace_at.insert(first, rendered);
                dropped.extend(rest.iter().map(|(idx, _)| *idx));
            } else {
                match (section_end.get(&key.section), key.section) {
                    (Some(&pos), _) => append_at.entry(pos).or_default().extend(rendered),
                    (None, Some(section)) => {
                        new_sections.entry(section).or_default().extend(rendered)
                    }
                    (None, None) => append_at.entry(self.lines.len()).or_default().extend(rendered),
                }
            }
            changed.push(key.clone());
        }

        let mut out: Vec<String> = Vec::with_capacity(self.lines.len() + 8);
        for (idx, line) in self.lines.iter().enumerate() {
            if let Some(extra) = append_at.remove(&idx) {
                out.extend(extra);
            }
            if let Some(replacement) = replace_at.remove(&idx) {
                out.extend(replacement);
                continue;
            }
            if dropped.contains(&idx) {
                continue;
            }
            out.push(line.raw.clone());
        }
        if let Some(extra) = append_at.remove(&self.lines.len()) {
            out.extend(extra);
        }
        for (section, lines) in new_sections {
            if lines.is_empty() {
                continue;
            }
            out.push(section.header());
            out.extend(lines);
        }

        Ok(Merged { text: join_lines(out.iter().map(String::as_str)), changed })
    }

    fn occurrences<'a>(&'a self, key: &'a ConfigKey) -> impl Iterator<Item = (usize, &'a str)> + 'a {
        self.lines.iter().enumerate().filter_map(move |(idx, line)| match &line.kind {
            LineKind::Assignment { name, value } if line.section == key.section && *name == key.name => {
                Some((idx, value.as_str()))
            }
            _ => None,
        })
    }

    /// Insert position (exclusive end) of the last block of each section.
    ///
    /// The top-level section always has an entry; bracketed sections only
    /// when their header appears.
    fn section_ends(&self) -> HashMap<Option<Section>, usize> {
        let mut ends = HashMap::new();
        let mut current = None;
        for (idx, line) in self.lines.iter().enumerate() {
            if let LineKind::Header(section) = line.kind {
                ends.insert(current, idx);
                current = Some(section);
            }
        }
        ends.insert(current, self.lines.len());
        ends
    }
}

fn join_lines<'a>(lines: impl Iterator<Item = &'a str>) -> String {
    let mut text = String::new();
    for line in lines {
        text.push_str(line);
        text.push('\n');
    }
    text
}

/// Values extracted by [`ConfDocument::read_selected`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfValues {
    values: BTreeMap<ConfigKey, Vec<String>>,
}

impl ConfValues {
    /// Values for `key`; empty when absent or not requested.
    pub fn values(&self, key: &ConfigKey) -> &[String] {
        self.values.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Values of a top-level key.
    pub fn top(&self, name: &str) -> &[String] {
        self.values(&ConfigKey::top(name))
    }

    /// First value of a top-level key.
    pub fn first(&self, name: &str) -> Option<&str> {
        self.top(name).first().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ConfigKey, &[String])> {
        self.values.iter().map(|(k, v)| (k, v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
