//! Re-read everything setup should have produced and report per item.

use crate::identity::WorkspaceIdentity;
use crate::paths;
use crate::settings::Settings;
use serde::Serialize;
use serde_json::Value;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize)]
pub struct CheckItem {
    pub name: String,
    /// Optional items only warn when they fail.
    pub required: bool,
    pub passed: bool,
    pub detail: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    pub items: Vec<CheckItem>,
}

impl ValidationReport {
    /// True when every required item passed.
    pub fn passed(&self) -> bool {
        self.items.iter().all(|i| i.passed || !i.required)
    }

    pub fn failures(&self) -> impl Iterator<Item = &CheckItem> {
        self.items.iter().filter(|i| !i.passed && i.required)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &CheckItem> {
        self.items.iter().filter(|i| !i.passed && !i.required)
    }

    pub fn item(&self, name: &str) -> Option<&CheckItem> {
        self.items.iter().find(|i| i.name == name)
    }

    /// Process exit code: 0 when all required checks pass, 1 otherwise.
    pub fn exit_code(&self) -> i32 {
        if self.passed() {
            0
        } else {
            1
        }
    }

    fn push(&mut self, name: &str, required: bool, result: std::result::Result<String, String>) {
        let (passed, detail) = match result {
            Ok(d) => (true, d),
            Err(d) => (false, d),
        };
        self.items.push(CheckItem {
            name: name.to_string(),
            required,
            passed,
            detail,
        });
    }
}

pub const CHECK_PROJECT_CONFIG: &str = "project config";
pub const CHECK_HOST_CONFIG: &str = "host config";
pub const CHECK_SECRETS_CONFIG: &str = "secrets config";
pub const CHECK_THOUGHTS_LINK: &str = "thoughts link";
pub const CHECK_WORKTREES: &str = "worktree directory";

/// Everything the validator needs to find the artifacts.
#[derive(Debug, Clone)]
pub struct ValidationTarget {
    pub project_dir: PathBuf,
    pub project_key: String,
    pub config_home: PathBuf,
    pub worktrees_dir: PathBuf,
}

impl ValidationTarget {
    pub fn new(identity: &WorkspaceIdentity, settings: &Settings) -> Self {
        Self {
            project_dir: identity.project_dir.clone(),
            project_key: identity.project_key.clone(),
            config_home: settings.config_home.clone(),
            worktrees_dir: paths::worktrees_dir(&identity.org_root, &identity.repo),
        }
    }
}

fn read_value(path: &Path) -> std::result::Result<Value, String> {
    let data = std::fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => format!("missing: {}", path.display()),
        _ => format!("unreadable: {} ({e})", path.display()),
    })?;
    serde_json::from_str(&data).map_err(|e| format!("invalid JSON in {}: {e}", path.display()))
}

fn check_project_config(project_dir: &Path) -> std::result::Result<String, String> {
    let path = paths::project_config_path(project_dir);
    let doc = read_value(&path)?;
    match doc.pointer("/catalyst/projectKey").and_then(Value::as_str) {
        Some(key) if !key.trim().is_empty() => Ok(format!("projectKey '{key}'")),
        _ => Err(format!("catalyst.projectKey missing in {}", path.display())),
    }
}

fn check_host_config(config_home: &Path, key: &str) -> std::result::Result<String, String> {
    let path = paths::host_config_path(config_home, key);
    let doc = read_value(&path)?;
    let repo = doc
        .pointer("/thoughts/thoughtsRepo")
        .and_then(Value::as_str)
        .ok_or_else(|| format!("thoughts.thoughtsRepo missing in {}", path.display()))?;
    if Path::new(repo).is_dir() {
        Ok(format!("thoughts at {repo}"))
    } else {
        Err(format!("thoughts repository {repo} does not exist"))
    }
}

fn check_secrets_config(config_home: &Path, key: &str) -> std::result::Result<String, String> {
    let path = paths::secrets_config_path(config_home, key);
    let doc = read_value(&path)?;
    if !doc.is_object() {
        return Err(format!("{} is not a JSON object", path.display()));
    }
    let configured = crate::secrets::configured_integrations(&doc);
    if configured.is_empty() {
        Ok("no integrations configured".to_string())
    } else {
        Ok(format!("integrations: {}", configured.join(", ")))
    }
}

fn check_thoughts_link(project_dir: &Path) -> std::result::Result<String, String> {
    let link = paths::thoughts_link_path(project_dir);
    match link.symlink_metadata() {
        Ok(meta) if meta.file_type().is_symlink() => Ok(format!(
            "{} -> {}",
            link.display(),
            std::fs::read_link(&link)
                .map(|t| t.display().to_string())
                .unwrap_or_default()
        )),
        Ok(_) => Err(format!("not a symlink: {}", link.display())),
        Err(_) => Err(format!("missing: {}", link.display())),
    }
}

fn check_worktrees(dir: &Path) -> std::result::Result<String, String> {
    if dir.is_dir() {
        Ok(dir.display().to_string())
    } else {
        Err(format!("missing: {}", dir.display()))
    }
}

pub fn validate(target: &ValidationTarget) -> ValidationReport {
    let mut report = ValidationReport::default();
    report.push(
        CHECK_PROJECT_CONFIG,
        true,
        check_project_config(&target.project_dir),
    );
    report.push(
        CHECK_HOST_CONFIG,
        true,
        check_host_config(&target.config_home, &target.project_key),
    );
    report.push(
        CHECK_SECRETS_CONFIG,
        true,
        check_secrets_config(&target.config_home, &target.project_key),
    );
    report.push(
        CHECK_THOUGHTS_LINK,
        true,
        check_thoughts_link(&target.project_dir),
    );
    report.push(CHECK_WORKTREES, false, check_worktrees(&target.worktrees_dir));
    tracing::debug!(passed = report.passed(), "validation finished");
    report
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
