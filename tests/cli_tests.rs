//! Integration tests for CLI

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const SAMPLE: &str = "\
# managed by hand
server=1
rpcbind=0.0.0.0:8332
addnode=a.example
addnode=b.example

[test]
rpcport=18332
";

/// A command running inside `dir` with wrapper paths pointed into it.
fn wrapper(dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("bitcoind-wrapper"));
    cmd.current_dir(dir)
        .env_remove("RUST_LOG")
        .env("BITCOIND_WRAPPER_CONF_PATH", dir.join("bitcoin.conf"))
        .env("BITCOIND_WRAPPER_DATA_DIR", dir)
        .env("BITCOIND_WRAPPER_STORE_PATH", dir.join("store.json"))
        .env("BITCOIND_WRAPPER_PROXY_CONFIG_PATH", dir.join("config.toml"));
    cmd
}

fn with_conf(text: &str) -> TempDir {
    let tmp = TempDir::new().expect("tmp");
    fs::write(tmp.path().join("bitcoin.conf"), text).expect("write conf");
    tmp
}

fn read_conf(dir: &Path) -> String {
    fs::read_to_string(dir.join("bitcoin.conf")).expect("read conf")
}

#[test]
fn test_cli_version() {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("bitcoind-wrapper"));
    cmd.arg("--version");
    cmd.assert().success().stdout(predicate::str::contains("bitcoind-wrapper"));
}

#[test]
fn test_cli_help() {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("bitcoind-wrapper"));
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("get"))
        .stdout(predicate::str::contains("set"))
        .stdout(predicate::str::contains("launch"))
        .stdout(predicate::str::contains("health"));
}

#[test]
fn test_get_prints_values_in_order() {
    let tmp = with_conf(SAMPLE);
    wrapper(tmp.path())
        .args(["get", "addnode", "test.rpcport", "prune"])
        .assert()
        .success()
        .stdout("addnode=a.example\naddnode=b.example\ntest.rpcport=18332\n");
}

#[test]
fn test_get_json_lists_absent_keys_empty() {
    let tmp = with_conf(SAMPLE);
    let out = wrapper(tmp.path())
        .args(["get", "server", "prune", "--format", "json"])
        .output()
        .expect("run");
    assert!(out.status.success());
    let json: serde_json::Value = serde_json::from_slice(&out.stdout).expect("json");
    assert_eq!(json["server"], serde_json::json!(["1"]));
    assert_eq!(json["prune"], serde_json::json!([]));
}

#[test]
fn test_get_missing_conf_fails() {
    let tmp = TempDir::new().expect("tmp");
    wrapper(tmp.path())
        .args(["get", "server"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("bitcoin.conf"));
}

#[test]
fn test_set_preserves_unrelated_lines() {
    let tmp = with_conf(SAMPLE);
    wrapper(tmp.path())
        .args(["set", "addnode=c.example", "test.rpcport=18444", "txindex=1", "--unset", "server"])
        .assert()
        .success();

    assert_eq!(
        read_conf(tmp.path()),
        "\
# managed by hand
rpcbind=0.0.0.0:8332
addnode=c.example

txindex=1
[test]
rpcport=18444
"
    );
}

#[test]
fn test_set_same_values_is_noop() {
    let tmp = with_conf("server=1\nrpcbind=0.0.0.0:8332");
    wrapper(tmp.path())
        .args(["set", "server=1"])
        .assert()
        .success()
        .stderr(predicate::str::contains("No changes"));
    assert_eq!(read_conf(tmp.path()), "server=1\nrpcbind=0.0.0.0:8332");
}

#[test]
fn test_set_rejects_multiline_value() {
    let tmp = with_conf(SAMPLE);
    wrapper(tmp.path()).args(["set", "uacomment=a\nb"]).assert().failure();
    assert_eq!(read_conf(tmp.path()), SAMPLE);
}

#[test]
fn test_conf_flag_overrides_config() {
    let tmp = with_conf("server=1\n");
    let other = tmp.path().join("other.conf");
    fs::write(&other, "server=0\n").expect("write");
    wrapper(tmp.path())
        .args(["--conf", other.to_str().expect("utf8 path"), "get", "server"])
        .assert()
        .success()
        .stdout("server=0\n");
}

#[test]
fn test_show_then_save_round_trips() {
    let tmp = with_conf("");
    let out = wrapper(tmp.path()).arg("show").output().expect("run");
    assert!(out.status.success());
    let mut settings: serde_json::Value = serde_json::from_slice(&out.stdout).expect("json");
    settings["txindex"] = serde_json::json!(true);

    wrapper(tmp.path())
        .args(["save", "-"])
        .write_stdin(settings.to_string())
        .assert()
        .success();

    wrapper(tmp.path()).args(["get", "txindex"]).assert().success().stdout("txindex=1\n");
}

#[test]
fn test_save_rejects_invalid_settings() {
    let tmp = with_conf(SAMPLE);
    let input = tmp.path().join("settings.json");
    fs::write(&input, r#"{"rpc":{"username":"bad user"}}"#).expect("write");

    wrapper(tmp.path())
        .args(["save", input.to_str().expect("utf8 path")])
        .assert()
        .failure()
        .stderr(predicate::str::contains("username"));
    assert_eq!(read_conf(tmp.path()), SAMPLE);
}

#[test]
fn test_mempool_set_writes_policy() {
    let tmp = with_conf("server=1\n");
    wrapper(tmp.path())
        .args(["mempool", "set"])
        .write_stdin(r#"{"datacarrier":true,"datacarriersize":200}"#)
        .assert()
        .success();
    wrapper(tmp.path())
        .args(["get", "datacarriersize", "server"])
        .assert()
        .success()
        .stdout("datacarriersize=200\nserver=1\n");
}

#[test]
fn test_reindex_then_launch_consumes_flag() {
    let tmp = with_conf("server=1\n");
    wrapper(tmp.path())
        .args(["reindex", "--chainstate", "--stopped"])
        .assert()
        .success()
        .stdout(predicate::str::contains("next time the service is started"));

    wrapper(tmp.path())
        .args(["launch", "--os-ip", "10.0.3.1", "--disk-total", "2000000000000"])
        .assert()
        .success()
        .stdout(predicate::str::contains("-onion=10.0.3.1:9050"))
        .stdout(predicate::str::contains("-reindex-chainstate"));

    wrapper(tmp.path())
        .args(["launch", "--os-ip", "10.0.3.1", "--disk-total", "2000000000000"])
        .assert()
        .success()
        .stdout(predicate::str::contains("-reindex").not());
}

#[test]
fn test_launch_small_disk_prunes_and_writes_proxy() {
    let tmp = with_conf("server=1\nexternalip=initial-setup\n");
    let out = wrapper(tmp.path())
        .args([
            "launch",
            "--os-ip",
            "10.0.3.1",
            "--onion-url",
            "http://abcdefghijklmnop.onion:8333",
            "--disk-total",
            "100000000000",
            "--format",
            "json",
        ])
        .output()
        .expect("run");
    assert!(out.status.success());
    let plan: serde_json::Value = serde_json::from_slice(&out.stdout).expect("json");
    assert_eq!(plan["pruned"], serde_json::json!(true));
    assert_eq!(plan["rpc_port"], serde_json::json!(18332));

    let conf = read_conf(tmp.path());
    assert!(conf.contains("prune=550\n"));
    assert!(conf.contains("externalip=abcdefghijklmnop.onion:8333\n"));
    assert!(conf.contains("rpcbind=127.0.0.1:18332\n"));

    let proxy = fs::read_to_string(tmp.path().join("config.toml")).expect("proxy config");
    assert!(proxy.contains("bitcoind_port = 18332"));
}

#[test]
fn test_health_without_bitcoin_cli_fails() {
    let tmp = with_conf("server=1\n");
    wrapper(tmp.path())
        .env("BITCOIND_WRAPPER_BITCOIN_CLI", "/nonexistent/bitcoin-cli")
        .args(["health", "rpc"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to run"));
}

#[test]
fn test_health_sync_with_empty_output_fails() {
    let tmp = with_conf("server=1\n");
    wrapper(tmp.path())
        .env("BITCOIND_WRAPPER_BITCOIN_CLI", "true")
        .args(["health", "sync"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("failure"))
        .stderr(predicate::str::contains("Health check failed"));
}

#[test]
fn test_health_rpc_ready_when_cli_is_quiet() {
    let tmp = with_conf("server=1\n");
    wrapper(tmp.path())
        .env("BITCOIND_WRAPPER_BITCOIN_CLI", "true")
        .args(["health", "rpc", "--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"result\": \"success\""));
}
