//! Health checks against a running bitcoind
//!
//! `bitcoin-cli` is run once per check; its output is interpreted into a
//! [`HealthCheck`] the platform can display.

use crate::config::WrapperConfig;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::process::Command;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthResult {
    Success,
    Loading,
    Starting,
    Failure,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthCheck {
    pub result: HealthResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl HealthCheck {
    fn new(result: HealthResult, message: impl Into<String>) -> Self {
        Self { result, message: Some(message.into()) }
    }
}

/// Subset of `getblockchaininfo`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BlockchainInfo {
    pub initialblockdownload: bool,
    pub verificationprogress: f64,
    #[serde(default)]
    pub chain: Option<String>,
    #[serde(default)]
    pub blocks: Option<u64>,
    #[serde(default)]
    pub headers: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
}

pub fn sync_progress(output: &CommandOutput) -> HealthCheck {
    let stdout = output.stdout.trim();
    if stdout.is_empty() {
        return if output.stderr.trim().is_empty() {
            HealthCheck::new(HealthResult::Failure, "bitcoin-cli returned no output")
        } else {
            HealthCheck::new(HealthResult::Starting, "Bitcoin Core is starting")
        };
    }

    match serde_json::from_str::<BlockchainInfo>(stdout) {
        Ok(info) if info.initialblockdownload => {
            let percent = info.verificationprogress * 100.0;
            HealthCheck::new(HealthResult::Loading, format!("Syncing blocks...{:.2}%", percent))
        }
        Ok(_) => HealthCheck::new(HealthResult::Success, "Bitcoin is fully synced"),
        Err(e) => HealthCheck::new(
            HealthResult::Failure,
            format!("Unexpected getblockchaininfo output: {}", e),
        ),
    }
}

pub fn rpc_ready(output: &CommandOutput) -> HealthCheck {
    if output.stderr.trim().is_empty() {
        HealthCheck::new(HealthResult::Success, "The Bitcoin RPC Interface is ready")
    } else {
        HealthCheck::new(HealthResult::Starting, "The Bitcoin RPC Interface is not ready")
    }
}

/// Run `bitcoin-cli <method>` once against the local node.
pub fn run_cli(cfg: &WrapperConfig, rpc_port: u16, method: &str) -> Result<CommandOutput> {
    let output = Command::new(&cfg.bitcoin_cli)
        .arg(format!("-conf={}", cfg.conf_path.display()))
        .arg(format!("-rpccookiefile={}", cfg.cookie_file.display()))
        .arg(format!("-rpcport={}", rpc_port))
        .arg(method)
        .output()
        .with_context(|| format!("Failed to run {}", cfg.bitcoin_cli))?;

    tracing::debug!("{} {} exited with {}", cfg.bitcoin_cli, method, output.status);
    Ok(CommandOutput {
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn out(stdout: &str, stderr: &str) -> CommandOutput {
        CommandOutput { stdout: stdout.to_string(), stderr: stderr.to_string() }
    }

    #[test]
    fn ibd_reports_percentage() {
        let check = sync_progress(&out(
            r#"{"chain":"main","blocks":100,"headers":800000,"initialblockdownload":true,"verificationprogress":0.123456}"#,
            "",
        ));
        assert_eq!(check.result, HealthResult::Loading);
        assert_eq!(check.message.as_deref(), Some("Syncing blocks...12.35%"));
    }

    #[test]
    fn synced_node_is_success() {
        let check = sync_progress(&out(
            r#"{"initialblockdownload":false,"verificationprogress":0.99999}"#,
            "",
        ));
        assert_eq!(check.result, HealthResult::Success);
        assert_eq!(check.message.as_deref(), Some("Bitcoin is fully synced"));
    }

    #[test]
    fn empty_stdout_depends_on_stderr() {
        assert_eq!(
            sync_progress(&out("", "error: Loading block index...")).result,
            HealthResult::Starting
        );
        assert_eq!(sync_progress(&out("  \n", "")).result, HealthResult::Failure);
    }

    #[test]
    fn garbage_json_is_failure() {
        let check = sync_progress(&out("not json", ""));
        assert_eq!(check.result, HealthResult::Failure);
        assert!(check.message.expect("message").contains("getblockchaininfo"));
    }

    #[test]
    fn rpc_readiness_follows_stderr() {
        assert_eq!(rpc_ready(&out("{}", "")).result, HealthResult::Success);
        let check = rpc_ready(&out("", "error: couldn't connect to server"));
        assert_eq!(check.result, HealthResult::Starting);
        assert_eq!(check.message.as_deref(), Some("The Bitcoin RPC Interface is not ready"));
    }

    #[test]
    fn serializes_result_lowercase() {
        let json = serde_json::to_string(&HealthCheck::new(HealthResult::Loading, "x")).expect("json");
        assert_eq!(json, r#"{"result":"loading","message":"x"}"#);
    }

    #[test]
    fn missing_binary_is_an_error() {
        let cfg = WrapperConfig {
            bitcoin_cli: "/nonexistent/bitcoin-cli".to_string(),
            ..WrapperConfig::default()
        };
        assert!(run_cli(&cfg, 8332, "getblockchaininfo").is_err());
    }
}
