use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn ortomat(base: &Path) -> Command {
    let mut cmd = Command::cargo_bin("ortomat").unwrap();
    cmd.env("ORTOMAT_DATA_DIR", base)
        .env_remove("ORTOMAT_OPERATOR")
        .env_remove("RUST_LOG");
    cmd
}

fn backups(base: &Path) -> Vec<PathBuf> {
    let dir = base.join("backups");
    if !dir.exists() {
        return Vec::new();
    }
    fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().path())
        .filter(|p| p.extension().map_or(false, |ext| ext == "json"))
        .collect()
}

fn write_cheap_hashing(base: &Path) {
    fs::create_dir_all(base).unwrap();
    fs::write(
        base.join("config.json"),
        r#"{"hashing": {"memory_cost": 1024, "time_cost": 1, "parallelism": 1}}"#,
    )
    .unwrap();
}

#[test]
fn export_on_empty_store_writes_snapshot() {
    let temp = TempDir::new().unwrap();

    ortomat(temp.path())
        .args(["backup", "export"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Backup created: backup-"));

    let files = backups(temp.path());
    assert_eq!(files.len(), 1);
    let doc: serde_json::Value = serde_json::from_str(&fs::read_to_string(&files[0]).unwrap()).unwrap();
    assert_eq!(doc["version"], "1.0");
    assert!(doc["data"].is_object());
}

#[test]
fn restore_rejects_document_without_data() {
    let temp = TempDir::new().unwrap();
    let bad = temp.path().join("bad.json");
    fs::write(&bad, r#"{"timestamp": "2026-10-18T10:00:00Z", "version": "1.0"}"#).unwrap();

    ortomat(temp.path())
        .args(["backup", "restore", bad.to_str().unwrap(), "--force"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing data"));

    ortomat(temp.path())
        .args(["backup", "history"])
        .assert()
        .success()
        .stdout(predicate::str::contains("RESTORE REJECTED"));
}

#[test]
fn restore_without_force_changes_nothing() {
    let temp = TempDir::new().unwrap();
    let snapshot = temp.path().join("snap.json");
    fs::write(
        &snapshot,
        r#"{"timestamp": "2026-10-18T10:00:00Z", "version": "1.0",
            "data": {"machines": [{"id": "m-1", "name": "Lobby"}]}}"#,
    )
    .unwrap();

    ortomat(temp.path())
        .args(["backup", "restore", snapshot.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("WARNING"));

    assert!(!temp.path().join("data").join("machines.json").exists());
}

#[test]
fn forced_restore_replaces_store_and_reports_counts() {
    let temp = TempDir::new().unwrap();
    write_cheap_hashing(temp.path());
    let snapshot = temp.path().join("snap.json");
    fs::write(
        &snapshot,
        r#"{"timestamp": "2026-10-18T10:00:00Z", "version": "1.0",
            "data": {
                "accounts": [{"id": "u-1", "email": "admin@x.com", "role": "ADMIN"}],
                "machines": [{"id": "m-1", "name": "Lobby"}],
                "cells": [{"id": "c-1", "machineId": "m-1", "cellNumber": 1}]
            }}"#,
    )
    .unwrap();

    ortomat(temp.path())
        .args(["backup", "restore", snapshot.to_str().unwrap(), "--force"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Restore complete!"))
        .stdout(predicate::str::contains("temporary password"));

    let accounts = fs::read_to_string(temp.path().join("data").join("accounts.json")).unwrap();
    assert!(accounts.contains("$argon2id$"));

    // Accounts exist now, so an operator is required
    ortomat(temp.path())
        .args(["backup", "export"])
        .assert()
        .failure();

    ortomat(temp.path())
        .args(["backup", "export", "--operator", "admin@x.com"])
        .assert()
        .success();

    ortomat(temp.path())
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Total").and(predicate::str::contains("3")));
}

#[test]
fn list_reports_no_backups() {
    let temp = TempDir::new().unwrap();

    ortomat(temp.path())
        .args(["backup", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No backups found."));
}
