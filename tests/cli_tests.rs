//! Integration tests for the riakcfg binary

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn riakcfg() -> Command {
    let mut cmd = Command::cargo_bin("riakcfg").unwrap();
    for key in [
        "RIAK_URL",
        "RIAK_SCHEME",
        "RIAK_HOST",
        "RIAK_PORT",
        "RIAK_PATH",
        "RIAK_MAPRED_PATH",
        "RIAK_TIMEOUT_MS",
        "RIAK_MAX_CONNECTIONS",
    ] {
        cmd.env_remove(key);
    }
    cmd
}

fn stdout_json(cmd: &mut Command) -> serde_json::Value {
    let output = cmd.assert().success().get_output().stdout.clone();
    serde_json::from_slice(&output).unwrap()
}

#[test]
fn test_cli_help() {
    riakcfg()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("resolve"))
        .stdout(predicate::str::contains("filter"));
}

#[test]
fn test_resolve_defaults() {
    let json = stdout_json(riakcfg().arg("resolve"));

    assert_eq!(json["url"], "http://127.0.0.1:8098/riak");
    assert_eq!(json["mapreduce_path"], "/mapred");
    assert_eq!(json["mapreduce_url"], "http://127.0.0.1:8098/mapred");
    assert!(json.get("timeout_ms").is_none());
}

#[test]
fn test_resolve_flags() {
    let json = stdout_json(riakcfg().args([
        "resolve",
        "--scheme",
        "https",
        "--host",
        "riak.local",
        "--port",
        "8443",
        "--riak-path",
        "riak",
        "--timeout-ms",
        "1500",
    ]));

    assert_eq!(json["url"], "https://riak.local:8443/riak");
    assert_eq!(json["timeout_ms"], 1500);
}

#[test]
fn test_resolve_precedence_file_env_flags() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("riak.toml");
    fs::write(&path, "host = \"file-host\"\nport = 1111\nmax_connections = 3\n").unwrap();

    let json = stdout_json(
        riakcfg()
            .env("RIAK_PORT", "2222")
            .arg("-c")
            .arg(&path)
            .args(["resolve", "--host", "flag-host"]),
    );

    assert_eq!(json["url"], "http://flag-host:2222/riak");
    assert_eq!(json["max_connections"], 3);
}

#[test]
fn test_resolve_host_flag_overrides_part_of_file_url() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("riak.toml");
    fs::write(&path, "url = \"http://file-host:1111/riak\"\n").unwrap();

    let json = stdout_json(
        riakcfg()
            .arg("-c")
            .arg(&path)
            .args(["resolve", "--host", "flag-host"]),
    );

    assert_eq!(json["url"], "http://flag-host:1111/riak");
}

#[test]
fn test_resolve_no_env() {
    let json = stdout_json(
        riakcfg()
            .env("RIAK_HOST", "env-host")
            .args(["resolve", "--no-env"]),
    );
    assert_eq!(json["url"], "http://127.0.0.1:8098/riak");
}

#[test]
fn test_resolve_invalid_url() {
    riakcfg()
        .args(["resolve", "--url", "not a url"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid client configuration"));
}

#[test]
fn test_resolve_bad_env_port() {
    riakcfg()
        .env("RIAK_PORT", "abc")
        .arg("resolve")
        .assert()
        .failure()
        .stderr(predicate::str::contains("RIAK_PORT"));
}

#[test]
fn test_filter_output() {
    riakcfg()
        .args(["filter", "tokenize:-:1", "string_to_int", "greater_than_eq:5"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            r#"[["tokenize","-",1],["string_to_int"],["greater_than_eq",5]]"#,
        ));
}

#[test]
fn test_filter_unknown_operator() {
    riakcfg()
        .args(["filter", "bogus:1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("bogus"));
}
