#![allow(deprecated)]
use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn catalyst(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("catalyst").unwrap();
    cmd.current_dir(dir.path())
        .env("CATALYST_CONFIG_HOME", dir.path().join("cfg"))
        .env_remove("CATALYST_ROOT")
        .env_remove("CATALYST_THOUGHTS_CLI");
    cmd
}

fn write_json(path: &Path, value: &Value) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, serde_json::to_string_pretty(value).unwrap()).unwrap();
}

/// Lay out a fully set-up workspace by hand; returns the project dir.
fn provision(dir: &TempDir) -> PathBuf {
    let org_root = dir.path().join("acme");
    let project = org_root.join("api");
    let thoughts = org_root.join("thoughts");
    for d in [
        project.join(".git"),
        thoughts.join("repos"),
        thoughts.join("global"),
        org_root.join("api-worktrees"),
    ] {
        std::fs::create_dir_all(d).unwrap();
    }
    std::os::unix::fs::symlink(&thoughts, project.join("thoughts")).unwrap();
    write_json(
        &project.join(".project/config.json"),
        &json!({"catalyst": {
            "projectKey": "acme",
            "repository": {"org": "acme", "name": "api"},
            "project": {"ticketPrefix": "ENG", "name": "api"},
            "thoughts": {"user": null}
        }}),
    );
    write_json(
        &dir.path().join("cfg/humanlayer/config-acme.json"),
        &json!({"thoughts": {
            "thoughtsRepo": thoughts,
            "user": "Sam",
            "reposDir": "repos",
            "globalDir": "global"
        }}),
    );
    write_json(
        &dir.path().join("cfg/catalyst/config-acme.json"),
        &json!({"catalyst": {"linear": {"apiToken": "lin_api_secret9876", "teamKey": "ENG"}}}),
    );
    project
}

// ---------------------------------------------------------------------------
// catalyst validate
// ---------------------------------------------------------------------------

#[test]
fn validate_passes_on_provisioned_workspace() {
    let dir = TempDir::new().unwrap();
    let project = provision(&dir);
    catalyst(&dir)
        .arg("validate")
        .arg("--root")
        .arg(&project)
        .assert()
        .success()
        .stdout(predicate::str::contains("All required checks passed"));
}

#[test]
fn validate_from_subdirectory_finds_project() {
    let dir = TempDir::new().unwrap();
    let project = provision(&dir);
    let sub = project.join("src/deep");
    std::fs::create_dir_all(&sub).unwrap();
    catalyst(&dir)
        .args(["validate", "--root"])
        .arg(&sub)
        .assert()
        .success();
}

#[test]
fn validate_flags_deleted_project_config_only() {
    let dir = TempDir::new().unwrap();
    let project = provision(&dir);
    std::fs::remove_file(project.join(".project/config.json")).unwrap();

    let output = catalyst(&dir)
        .args(["validate", "--json", "--project-key", "acme", "--root"])
        .arg(&project)
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert_eq!(output.status.code(), Some(1));

    let report: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["passed"], false);
    let failed: Vec<&str> = report["items"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|i| i["passed"] == false)
        .map(|i| i["name"].as_str().unwrap())
        .collect();
    assert_eq!(failed, vec!["project config"]);
}

#[test]
fn validate_warns_but_passes_without_worktrees() {
    let dir = TempDir::new().unwrap();
    let project = provision(&dir);
    std::fs::remove_dir_all(dir.path().join("acme/api-worktrees")).unwrap();
    catalyst(&dir)
        .args(["validate", "--root"])
        .arg(&project)
        .assert()
        .success()
        .stdout(predicate::str::contains("warn"));
}

#[test]
fn validate_rejects_plain_thoughts_directory() {
    let dir = TempDir::new().unwrap();
    let project = provision(&dir);
    std::fs::remove_file(project.join("thoughts")).unwrap();
    std::fs::create_dir_all(project.join("thoughts")).unwrap();
    catalyst(&dir)
        .args(["validate", "--root"])
        .arg(&project)
        .assert()
        .failure()
        .stdout(predicate::str::contains("not a symlink"));
}

#[test]
fn debug_logging_follows_rust_log() {
    let dir = TempDir::new().unwrap();
    let project = provision(&dir);
    catalyst(&dir)
        .env("RUST_LOG", "debug")
        .args(["validate", "--root"])
        .arg(&project)
        .assert()
        .success()
        .stderr(predicate::str::contains("validation finished"));
    catalyst(&dir)
        .env_remove("RUST_LOG")
        .args(["validate", "--root"])
        .arg(&project)
        .assert()
        .success()
        .stderr(predicate::str::contains("validation finished").not());
}

#[test]
fn validate_unknown_project_asks_for_key() {
    let dir = TempDir::new().unwrap();
    let loose = dir.path().join("loose");
    std::fs::create_dir_all(&loose).unwrap();
    catalyst(&dir)
        .args(["validate", "--root"])
        .arg(&loose)
        .assert()
        .failure()
        .stderr(predicate::str::contains("--project-key"));
}

#[test]
fn validate_empty_checkout_fails() {
    let dir = TempDir::new().unwrap();
    let project = dir.path().join("acme/api");
    std::fs::create_dir_all(project.join(".git")).unwrap();
    catalyst(&dir)
        .args(["validate", "--project-key", "acme", "--root"])
        .arg(&project)
        .assert()
        .failure()
        .stdout(predicate::str::contains("FAIL"))
        .stderr(predicate::str::contains("validation failed"));
}

// ---------------------------------------------------------------------------
// catalyst config
// ---------------------------------------------------------------------------

#[test]
fn config_path_lists_three_files() {
    let dir = TempDir::new().unwrap();
    let project = provision(&dir);
    catalyst(&dir)
        .args(["config", "path", "--root"])
        .arg(&project)
        .assert()
        .success()
        .stdout(predicate::str::contains(".project/config.json"))
        .stdout(predicate::str::contains("humanlayer/config-acme.json"))
        .stdout(predicate::str::contains("catalyst/config-acme.json"));
}

#[test]
fn config_show_masks_credentials() {
    let dir = TempDir::new().unwrap();
    let project = provision(&dir);
    let output = catalyst(&dir)
        .args(["config", "show", "--json", "--root"])
        .arg(&project)
        .output()
        .unwrap();
    assert!(output.status.success());
    let doc: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(doc["projectKey"], "acme");
    assert_eq!(
        doc["configs"]["secrets"]["catalyst"]["linear"]["apiToken"],
        "\u{2026}9876"
    );
    assert_eq!(doc["configs"]["secrets"]["catalyst"]["linear"]["teamKey"], "ENG");
    assert_eq!(doc["configs"]["host"]["thoughts"]["user"], "Sam");
    let raw = String::from_utf8(output.stdout).unwrap();
    assert!(!raw.contains("lin_api_secret9876"));
}

#[test]
fn config_show_reports_missing_files() {
    let dir = TempDir::new().unwrap();
    let project = dir.path().join("acme/api");
    std::fs::create_dir_all(project.join(".git")).unwrap();
    catalyst(&dir)
        .args(["config", "show", "--project-key", "acme", "--root"])
        .arg(&project)
        .assert()
        .success()
        .stdout(predicate::str::contains("(missing)"));
}

// ---------------------------------------------------------------------------
// catalyst check / setup
// ---------------------------------------------------------------------------

#[test]
fn check_json_lists_every_tool() {
    let dir = TempDir::new().unwrap();
    let output = catalyst(&dir).args(["check", "--json"]).output().unwrap();
    let tools: Value = serde_json::from_slice(&output.stdout).unwrap();
    let names: Vec<&str> = tools
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["program"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["git", "humanlayer", "gh"]);
}

#[test]
fn check_honours_thoughts_cli_override() {
    let dir = TempDir::new().unwrap();
    let output = catalyst(&dir)
        .args(["check", "--json", "--thoughts-cli", "my-thoughts sub"])
        .output()
        .unwrap();
    let tools: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(tools[1]["program"], "my-thoughts");
    assert_eq!(tools[1]["present"], false);
    assert!(!output.status.success());
}

#[test]
fn setup_help_lists_yes_flag() {
    let dir = TempDir::new().unwrap();
    catalyst(&dir)
        .args(["setup", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--yes"));
}
