//! Integration tests for the rule-engine-cli binary.

use std::io::Write;

use assert_cmd::{Command, cargo::cargo_bin_cmd};
use predicates::prelude::*;
use tempfile::NamedTempFile;

fn cmd() -> Command {
    cargo_bin_cmd!("rule-engine-cli")
}

fn write_rules(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "{}", contents).unwrap();
    file
}

fn write_table(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "{}", contents).unwrap();
    file
}

const SIMPLE_DOCUMENT: &str = r#"
schema_version: "1.0.0"
marketplace: acme
version: "1.0.0"
rules:
  - id: title_required
    field: title
    type: assert
    condition:
      operator: not_empty
    severity: error
    message: "Title is required"
"#;

#[test]
fn compile_success() {
    let document = write_rules(SIMPLE_DOCUMENT);

    cmd()
        .args(["compile", document.path().to_str().unwrap(), "--no-color"])
        .assert()
        .success()
        .stdout(predicate::str::contains("total rules"));
}

#[test]
fn compile_json_format() {
    let document = write_rules(SIMPLE_DOCUMENT);

    cmd()
        .args([
            "compile",
            document.path().to_str().unwrap(),
            "-f",
            "json",
            "--no-color"
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"total_rules\""));
}

#[test]
fn compile_file_not_found() {
    cmd()
        .args(["compile", "/nonexistent/rules.yaml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn compile_invalid_document_fails() {
    let document = write_rules("schema_version: \"1.0.0\"\nmarketplace: acme\nversion: not-a-semver\nrules: []\n");

    cmd()
        .args(["compile", document.path().to_str().unwrap()])
        .assert()
        .failure();
}

#[test]
fn run_reports_violations() {
    let document = write_rules(SIMPLE_DOCUMENT);
    let table = write_table("title\nWidget\n\n");

    cmd()
        .args([
            "run",
            document.path().to_str().unwrap(),
            table.path().to_str().unwrap(),
            "--no-color"
        ])
        .assert()
        .failure()
        .code(2)
        .stdout(predicate::str::contains("title_required"));
}

#[test]
fn run_yaml_format() {
    let document = write_rules(SIMPLE_DOCUMENT);
    let table = write_table("title\nWidget\n");

    cmd()
        .args([
            "run",
            document.path().to_str().unwrap(),
            table.path().to_str().unwrap(),
            "-f",
            "yaml",
            "--no-color"
        ])
        .assert()
        .success();
}

#[test]
fn help() {
    cmd().arg("--help").assert().success();
}

#[test]
fn version() {
    cmd().arg("--version").assert().success();
}
