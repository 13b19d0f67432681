//! ABOUTME: End-to-end integration tests for the docbro CLI binary

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

fn sandboxed_cmd(xdg_home: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("docbro").unwrap();
    cmd.env("XDG_CONFIG_HOME", xdg_home.join("config"))
        .env("XDG_DATA_HOME", xdg_home.join("data"))
        .env("XDG_CACHE_HOME", xdg_home.join("cache"));
    cmd
}

#[test]
fn cli_help_lists_top_level_commands() {
    let mut cmd = Command::cargo_bin("docbro").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("shelf"))
        .stdout(predicate::str::contains("fill"))
        .stdout(predicate::str::contains("serve"));
}

#[test]
fn cli_version_reports_name() {
    let mut cmd = Command::cargo_bin("docbro").unwrap();
    cmd.arg("--version").assert().success().stdout(predicate::str::contains("docbro"));
}

#[test]
fn shelf_lifecycle_create_list_delete() {
    let dir = tempdir().unwrap();

    sandboxed_cmd(dir.path())
        .args(["shelf", "create", "docs", "--type", "rag"])
        .assert()
        .success()
        .stdout(predicate::str::contains("created shelf 'docs'"));

    sandboxed_cmd(dir.path())
        .args(["shelf", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("docs"));

    sandboxed_cmd(dir.path())
        .args(["shelf", "delete", "docs"])
        .assert()
        .failure()
        .code(2);

    sandboxed_cmd(dir.path())
        .args(["shelf", "delete", "docs", "--force"])
        .assert()
        .success()
        .stdout(predicate::str::contains("deleted shelf 'docs'"));
}

#[test]
fn box_create_without_shelf_reports_not_found() {
    let dir = tempdir().unwrap();

    sandboxed_cmd(dir.path())
        .args(["box", "create", "py-docs", "drag", "--shelf", "nonexistent"])
        .assert()
        .failure()
        .code(3);
}

#[test]
fn fill_on_rag_box_is_rejected() {
    let dir = tempdir().unwrap();

    sandboxed_cmd(dir.path())
        .args(["shelf", "create", "docs", "--type", "rag"])
        .assert()
        .success();
    sandboxed_cmd(dir.path())
        .args(["box", "create", "notes", "rag", "--shelf", "docs"])
        .assert()
        .success();

    sandboxed_cmd(dir.path())
        .args(["fill", "notes"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("drag"));
}

#[test]
fn health_with_no_flags_checks_everything() {
    let dir = tempdir().unwrap();

    sandboxed_cmd(dir.path())
        .args(["health"])
        .assert()
        .success()
        .stdout(predicate::str::contains("system:"))
        .stdout(predicate::str::contains("services:"))
        .stdout(predicate::str::contains("config:"))
        .stdout(predicate::str::contains("projects:"));
}

#[test]
fn health_json_output_is_valid() {
    let dir = tempdir().unwrap();

    let output = sandboxed_cmd(dir.path()).args(["--output", "json", "health", "--system"]).output().unwrap();
    assert!(output.status.success());
    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(parsed["success"], serde_json::json!(true));
    assert!(parsed["data"]["system"].is_object());
}
