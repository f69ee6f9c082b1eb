//! End-to-end tests for the `kvdns` binary.

use assert_cmd::Command;
use kvdns_core::RecordType;
use kvdns_srv::{ManagementApi, Store};
use predicates::prelude::*;
use std::sync::Arc;
use tempfile::TempDir;

/// A scratch directory holding an empty config file and a database path.
struct Fixture {
    dir: TempDir,
}

impl Fixture {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("kvdns.toml"), "").unwrap();
        Self { dir }
    }

    fn kvdns(&self) -> Command {
        let mut cmd = Command::cargo_bin("kvdns").unwrap();
        cmd.env_remove("RUST_LOG")
            .env_remove("KVDNS_DATABASE")
            .env_remove("KVDNS_SERVER")
            .arg("--config")
            .arg(self.dir.path().join("kvdns.toml"))
            .arg("--database")
            .arg(self.dir.path().join("records.redb"))
            .arg("--no-color");
        cmd
    }
}

#[test]
fn test_set_then_get() {
    let fx = Fixture::new();
    fx.kvdns()
        .args(["set", "MX", "Example.COM.", "10", "mail.example.com"])
        .assert()
        .success();

    fx.kvdns()
        .args(["get", "mx", "example.com"])
        .assert()
        .success()
        .stdout(predicate::str::contains("10 mail.example.com"));
}

#[test]
fn test_get_json_output() {
    let fx = Fixture::new();
    fx.kvdns()
        .args(["set", "A", "host.example.com", "203.0.113.5"])
        .assert()
        .success();

    let output = fx
        .kvdns()
        .args(["--output", "json", "get", "A", "host.example.com"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let body: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(body["name"], "host.example.com");
    assert_eq!(body["type"], "A");
    assert_eq!(body["data"]["address"], "203.0.113.5");
    assert_eq!(body["presentation"], "203.0.113.5");
}

#[test]
fn test_set_from_json_body() {
    let fx = Fixture::new();
    fx.kvdns()
        .args([
            "set",
            "SRV",
            "_sip._udp.example.com",
            "--json",
            r#"{"priority": 1, "weight": 2, "port": 5060, "target": "sip.example.com"}"#,
        ])
        .assert()
        .success();

    fx.kvdns()
        .args(["get", "SRV", "_sip._udp.example.com"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 2 5060 sip.example.com"));
}

#[test]
fn test_loc_round_trip_through_presentation() {
    let fx = Fixture::new();
    fx.kvdns()
        .args(["set", "LOC", "geo.example.com", "42", "21", "54", "N", "71", "06", "18", "W", "-24m", "30m"])
        .assert()
        .success();

    fx.kvdns()
        .args(["get", "LOC", "geo.example.com"])
        .assert()
        .success()
        .stdout(predicate::str::contains("42 21 54.000 N 71 06 18.000 W -24m 30m"));
}

#[test]
fn test_invalid_loc_is_rejected_and_not_stored() {
    let fx = Fixture::new();
    fx.kvdns()
        .args(["set", "LOC", "geo.example.com", "91", "N", "10", "E", "0m"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("LOC"));

    fx.kvdns()
        .args(["get", "LOC", "geo.example.com"])
        .assert()
        .failure();
}

#[test]
fn test_missing_record_fails() {
    let fx = Fixture::new();
    fx.kvdns()
        .args(["get", "TXT", "nothing.example.com"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no TXT record for nothing.example.com"));
}

#[test]
fn test_delete_removes_record() {
    let fx = Fixture::new();
    fx.kvdns()
        .args(["set", "CAA", "example.com", "0", "issue", "ca.example"])
        .assert()
        .success();

    fx.kvdns()
        .args(["delete", "CAA", "example.com"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted"));

    fx.kvdns()
        .args(["get", "CAA", "example.com"])
        .assert()
        .failure();

    fx.kvdns()
        .args(["delete", "CAA", "example.com"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No CAA record"));
}

#[test]
fn test_list_groups_names_by_type() {
    let fx = Fixture::new();
    for (rtype, name, value) in [
        ("A", "a.example.com", "192.0.2.1"),
        ("A", "b.example.com", "192.0.2.2"),
        ("TXT", "a.example.com", "hello"),
    ] {
        fx.kvdns().args(["set", rtype, name, value]).assert().success();
    }

    let output = fx.kvdns().args(["-o", "json", "list"]).output().unwrap();
    assert!(output.status.success());
    let listing: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(
        listing["A"],
        serde_json::json!(["a.example.com", "b.example.com"])
    );
    assert_eq!(listing["TXT"], serde_json::json!(["a.example.com"]));
    assert_eq!(listing["MX"], serde_json::json!([]));

    fx.kvdns()
        .args(["list", "txt"])
        .assert()
        .success()
        .stdout(predicate::str::contains("a.example.com"))
        .stdout(predicate::str::contains("b.example.com").not());
}

#[test]
fn test_unknown_type_is_a_usage_error() {
    let fx = Fixture::new();
    fx.kvdns()
        .args(["get", "SOA", "example.com"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("SOA"));
}

#[test]
fn test_explicit_missing_config_fails() {
    Command::cargo_bin("kvdns")
        .unwrap()
        .args(["--config", "/nonexistent/kvdns.toml", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("config file not found"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_record_commands_reach_a_running_server() {
    let fx = Fixture::new();
    let store = Arc::new(Store::open(fx.dir.path().join("records.redb")).unwrap());
    let api = ManagementApi::bind("127.0.0.1:0".parse().unwrap(), Arc::clone(&store))
        .await
        .unwrap();
    let url = format!("http://{}", api.local_addr());
    tokio::spawn(api.run());

    // The assert_cmd calls block, so run them off the runtime serving the API.
    let fx = tokio::task::spawn_blocking(move || {
        fx.kvdns()
            .args(["get", "A", "host.example.com"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("--server"));

        fx.kvdns()
            .args(["--server", &url, "set", "A", "Host.Example.com", "198.51.100.7"])
            .assert()
            .success()
            .stdout(predicate::str::contains("host.example.com"));
        fx.kvdns()
            .args(["--server", &url, "get", "A", "host.example.com"])
            .assert()
            .success()
            .stdout(predicate::str::contains("198.51.100.7"));
        fx.kvdns()
            .args(["--server", &url, "list", "A"])
            .assert()
            .success()
            .stdout(predicate::str::contains("host.example.com"));
        fx
    })
    .await
    .unwrap();

    assert!(store.get(RecordType::A, "host.example.com").unwrap().is_some());
    drop(fx);
}
