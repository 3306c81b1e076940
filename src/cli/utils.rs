//! Shared CLI utilities.

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::Serialize;
use std::io::Read;
use std::path::Path;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Read a whole input, where `None` or `-` means stdin.
pub fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(p) if p != Path::new("-") => std::fs::read_to_string(p)
            .with_context(|| format!("Failed to read {}", p.display())),
        _ => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf).context("Failed to read stdin")?;
            Ok(buf)
        }
    }
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Report a merge on stderr, keeping stdout for data.
pub fn report_merge(merged: &crate::conf::Merged, path: &Path) {
    if merged.is_changed() {
        let keys: Vec<String> = merged.changed.iter().map(|k| k.to_string()).collect();
        eprintln!("Updated {}: {}", path.display(), keys.join(", "));
    } else {
        eprintln!("No changes to {}", path.display());
    }
}
