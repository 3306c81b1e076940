//! Raw key access: `get` and `set`

use anyhow::{Context, Result};
use clap::Args;
use serde_json::{Map, Value};

use super::utils::{print_json, report_merge, OutputFormat};
use crate::conf::{ConfFile, ConfUpdates, ConfigKey};
use crate::config::WrapperConfig;

#[derive(Args)]
pub struct GetArgs {
    /// Keys to read, `name` or `section.name` (e.g. `test.rpcport`)
    #[arg(value_name = "KEYS", required = true)]
    pub keys: Vec<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Args)]
pub struct SetArgs {
    /// Assignments; repeating a key sets several values
    #[arg(value_name = "KEY=VALUE")]
    pub assignments: Vec<String>,

    /// Remove every line of a key (repeatable)
    #[arg(long, value_name = "KEY")]
    pub unset: Vec<String>,
}

fn parse_keys(raw: &[String]) -> Result<Vec<ConfigKey>> {
    raw.iter()
        .map(|k| k.parse::<ConfigKey>().with_context(|| format!("Invalid key '{}'", k)))
        .collect()
}

pub fn get(args: GetArgs, cfg: &WrapperConfig) -> Result<()> {
    let keys = parse_keys(&args.keys)?;
    let values = ConfFile::new(&cfg.conf_path).read_keys(&keys)?;

    match args.format {
        OutputFormat::Text => {
            for key in &keys {
                for value in values.values(key) {
                    println!("{}={}", key, value);
                }
            }
            Ok(())
        }
        OutputFormat::Json => {
            let map: Map<String, Value> = keys
                .iter()
                .map(|k| (k.to_string(), Value::from(values.values(k).to_vec())))
                .collect();
            print_json(&map)
        }
    }
}

/// Group `KEY=VALUE` pairs by key, keeping first-seen key order and value order.
fn collect_updates(assignments: &[String], unset: &[String]) -> Result<ConfUpdates> {
    let mut grouped: Vec<(ConfigKey, Vec<String>)> = Vec::new();
    for assignment in assignments {
        let (raw_key, value) = assignment
            .split_once('=')
            .with_context(|| format!("Expected KEY=VALUE, got '{}'", assignment))?;
        let key: ConfigKey =
            raw_key.parse().with_context(|| format!("Invalid key '{}'", raw_key))?;
        match grouped.iter_mut().find(|(k, _)| *k == key) {
            Some((_, values)) => values.push(value.to_string()),
            None => grouped.push((key, vec![value.to_string()])),
        }
    }

    let mut updates = ConfUpdates::new();
    for (key, values) in grouped {
        updates.set(key, values);
    }
    for key in parse_keys(unset)? {
        if updates.get(&key).is_some() {
            anyhow::bail!("Key '{}' is both set and unset", key);
        }
        updates.set(key, Vec::<String>::new());
    }
    Ok(updates)
}

pub fn set(args: SetArgs, cfg: &WrapperConfig) -> Result<()> {
    let updates = collect_updates(&args.assignments, &args.unset)?;
    if updates.is_empty() {
        anyhow::bail!("Nothing to do: pass KEY=VALUE assignments or --unset KEY");
    }
    let merged = ConfFile::new(&cfg.conf_path).merge(&updates)?;
    report_merge(&merged, &cfg.conf_path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conf::Section;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn repeated_keys_accumulate_in_order() {
        let updates = collect_updates(
            &strings(&["addnode=a", "test.rpcport=18332", "addnode=b"]),
            &[],
        )
        .expect("updates");

        assert_eq!(updates.len(), 2);
        assert_eq!(updates.get(&ConfigKey::top("addnode")), Some(&strings(&["a", "b"])[..]));
        assert!(updates.get(&ConfigKey::in_section(Section::Test, "rpcport")).is_some());
    }

    #[test]
    fn value_may_contain_equals() {
        let updates = collect_updates(&strings(&["rpcauth=u:salt$hash=="]), &[]).expect("updates");
        assert_eq!(
            updates.get(&ConfigKey::top("rpcauth")),
            Some(&strings(&["u:salt$hash=="])[..])
        );
    }

    #[test]
    fn unset_becomes_empty_values() {
        let updates = collect_updates(&[], &strings(&["prune"])).expect("updates");
        assert!(updates.get(&ConfigKey::top("prune")).is_some_and(|v| v.is_empty()));
    }

    #[test]
    fn conflicting_set_and_unset_is_rejected() {
        assert!(collect_updates(&strings(&["prune=1"]), &strings(&["prune"])).is_err());
    }

    #[test]
    fn missing_equals_is_rejected() {
        assert!(collect_updates(&strings(&["prune"]), &[]).is_err());
    }
}
