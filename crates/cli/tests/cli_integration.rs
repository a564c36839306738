//! CLI integration tests for the `structure` and `check` subcommands.
//!
//! Uses `assert_cmd` to spawn the `orgchart` binary and verify exit codes,
//! stdout content, and stderr content. Input documents are written to a
//! temporary directory per test.

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

const SINGLE_ROOT: &str =
    r#"{"Pete": "Nick", "Barbara": "Nick", "Nick": "Sophie", "Sophie": "Jonas"}"#;

const WITH_LOOP: &str = r#"{"Pete": "Nick", "Barbara": "Nick", "Nick": "Sophie", "Sophie": "Jonas", "Barbara": "Nick", "Nick": "Sophie"}"#;

const MULTIPLE_ROOTS: &str = r#"{"Pete": "Nick", "Barbara": "Nick", "Nick": "Sophie", "Sophie": "Jonas", "Jane": "Reenah"}"#;

fn orgchart() -> Command {
    cargo_bin_cmd!("orgchart")
}

/// Write `content` to a file inside `dir` and return its path.
fn fixture(dir: &TempDir, content: impl AsRef<[u8]>) -> PathBuf {
    let path = dir.path().join("employees.json");
    fs::write(&path, content).expect("write fixture");
    path
}

// ──────────────────────────────────────────────
// 1. Help and version
// ──────────────────────────────────────────────

#[test]
fn help_exits_0_with_description() {
    orgchart()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Employee hierarchy structuring toolkit"));
}

#[test]
fn version_exits_0() {
    orgchart()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("orgchart"));
}

// ──────────────────────────────────────────────
// 2. Structure subcommand
// ──────────────────────────────────────────────

#[test]
fn structure_prints_hierarchy_and_numbers() {
    let dir = TempDir::new().unwrap();
    let path = fixture(&dir, SINGLE_ROOT);

    let output = orgchart().arg("structure").arg(&path).output().unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).expect("valid JSON");
    assert_eq!(
        json["hierarchy"],
        serde_json::json!({"Jonas": {"Sophie": {"Nick": {"Pete": {}, "Barbara": {}}}}})
    );
    assert_eq!(json["nested_set"]["Jonas"]["lft"], 1);
    assert_eq!(json["nested_set"]["Jonas"]["rgt"], 10);
    assert_eq!(json["nested_set"]["Barbara"]["lft"], 6);
    assert_eq!(json["nested_set"]["Barbara"]["rgt"], 7);
    assert_eq!(
        json["nested_set"]["Sophie"]["supervisor_id"],
        json["nested_set"]["Jonas"]["id"]
    );
}

#[test]
fn structure_reads_stdin() {
    orgchart()
        .args(["structure", "-"])
        .write_stdin(r#"{"Ham": "Peter"}"#)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"Peter\""));
}

#[test]
fn structure_duplicate_keys_exits_1() {
    let dir = TempDir::new().unwrap();
    let path = fixture(&dir, WITH_LOOP);

    orgchart()
        .arg("structure")
        .arg(&path)
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Barbara, Nick"));
}

#[test]
fn structure_multiple_roots_json_error() {
    let dir = TempDir::new().unwrap();
    let path = fixture(&dir, MULTIPLE_ROOTS);

    let output = orgchart()
        .args(["--output", "json", "structure"])
        .arg(&path)
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));

    let err: serde_json::Value = serde_json::from_slice(&output.stderr).expect("JSON on stderr");
    assert_eq!(err["error"], "multiple_roots");
    assert_eq!(err["names"], serde_json::json!(["Jonas", "Reenah"]));
}

#[test]
fn structure_malformed_exits_1() {
    let dir = TempDir::new().unwrap();
    let path = fixture(&dir, r#"{"Pete": "Nick""#);

    orgchart()
        .arg("structure")
        .arg(&path)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("invalid JSON"));
}

#[test]
fn structure_invalid_utf8_is_malformed_input() {
    let dir = TempDir::new().unwrap();
    let path = fixture(&dir, b"{\"Pete\": \"Ni\xffck\"}");

    let output = orgchart()
        .args(["--output", "json", "structure"])
        .arg(&path)
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());

    let err: serde_json::Value = serde_json::from_slice(&output.stderr).expect("JSON on stderr");
    assert_eq!(err["error"], "malformed_input");
}

#[test]
fn check_invalid_utf8_on_stdin_exits_1() {
    orgchart()
        .args(["check", "-"])
        .write_stdin(b"{\"Pete\": \"Ni\xffck\"}".to_vec())
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("invalid JSON"));
}

#[test]
fn structure_missing_file_exits_1() {
    orgchart()
        .args(["structure", "does/not/exist.json"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("error reading file"));
}

// ──────────────────────────────────────────────
// 3. Check subcommand
// ──────────────────────────────────────────────

#[test]
fn check_valid_file_reports_root() {
    let dir = TempDir::new().unwrap();
    let path = fixture(&dir, SINGLE_ROOT);

    orgchart()
        .arg("check")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("5 employees under Jonas"));
}

#[test]
fn check_json_output() {
    let dir = TempDir::new().unwrap();
    let path = fixture(&dir, SINGLE_ROOT);

    let output = orgchart()
        .args(["--output", "json", "check"])
        .arg(&path)
        .output()
        .unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["valid"], true);
    assert_eq!(json["root"], "Jonas");
    assert_eq!(json["employees"], 5);
}

#[test]
fn check_empty_object_exits_1() {
    let dir = TempDir::new().unwrap();
    let path = fixture(&dir, "{}");

    orgchart()
        .arg("check")
        .arg(&path)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("no employees"));
}

#[test]
fn check_cycle_exits_1() {
    let dir = TempDir::new().unwrap();
    let path = fixture(&dir, r#"{"A": "B", "B": "C", "C": "A"}"#);

    orgchart()
        .arg("check")
        .arg(&path)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("cycle"));
}

#[test]
fn quiet_suppresses_errors() {
    let dir = TempDir::new().unwrap();
    let path = fixture(&dir, WITH_LOOP);

    orgchart()
        .args(["--quiet", "check"])
        .arg(&path)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::is_empty());
}
