//! CLI end-to-end tests.

use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::process::Command;
use tempfile::tempdir;

#[allow(deprecated)]
fn inneapp_cmd() -> Command {
    Command::cargo_bin("inneapp").unwrap()
}

/// Write a config pointing the database into `dir`.
fn write_config(dir: &std::path::Path) -> std::path::PathBuf {
    let config_path = dir.join("inneapp.json");
    let db_path = dir.join("inneapp.db");
    fs::write(
        &config_path,
        serde_json::json!({ "database": { "path": db_path } }).to_string(),
    )
    .unwrap();
    config_path
}

#[test]
fn test_cli_help_flag() {
    inneapp_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("inneapp"))
        .stdout(predicate::str::contains("Usage"));
}

#[test]
fn test_cli_version_command() {
    inneapp_cmd()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_cli_start_help() {
    inneapp_cmd()
        .args(["start", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Start the web application"));
}

#[test]
fn test_cli_validate_defaults() {
    inneapp_cmd()
        .arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("using defaults"))
        .stdout(predicate::str::contains("127.0.0.1:5000"));
}

#[test]
fn test_cli_validate_reports_warnings() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bad.json");
    fs::write(&path, r#"{"database": {"pool_size": 0}}"#).unwrap();

    inneapp_cmd()
        .arg("validate")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("pool_size"));
}

#[test]
fn test_cli_validate_rejects_malformed_json() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("broken.json");
    fs::write(&path, "{not json").unwrap();

    inneapp_cmd().arg("validate").arg(&path).assert().failure();
}

#[test]
fn test_cli_status_does_not_create_database() {
    let dir = tempdir().unwrap();
    let config = write_config(dir.path());

    inneapp_cmd()
        .arg("--config")
        .arg(&config)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("No database"));

    assert!(!dir.path().join("inneapp.db").exists());
}

#[test]
fn test_cli_migrate_then_status() {
    let dir = tempdir().unwrap();
    let config = write_config(dir.path());
    fs::write(dir.path().join("inneapp.db"), b"").unwrap();

    inneapp_cmd()
        .arg("--config")
        .arg(&config)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("(pending)"))
        .stdout(predicate::str::contains("Schema not created"));

    inneapp_cmd()
        .arg("--config")
        .arg(&config)
        .arg("migrate")
        .assert()
        .success()
        .stdout(predicate::str::contains("Applied V1"))
        .stdout(predicate::str::contains("Current version: 2"));

    inneapp_cmd()
        .arg("--config")
        .arg(&config)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("sessions"))
        .stdout(predicate::str::contains("(pending)").not());
}

#[test]
fn test_cli_migrate_down_to() {
    let dir = tempdir().unwrap();
    let config = write_config(dir.path());

    inneapp_cmd()
        .arg("--config")
        .arg(&config)
        .arg("migrate")
        .assert()
        .success();

    inneapp_cmd()
        .arg("--config")
        .arg(&config)
        .args(["migrate", "--down-to", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Reverted V2"))
        .stdout(predicate::str::contains("Current version: 1"));

    inneapp_cmd()
        .arg("--config")
        .arg(&config)
        .args(["migrate", "--down-to", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Nothing to roll back"));
}
