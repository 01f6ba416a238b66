//! User/Host Configuration: binds a person to a thoughts repository on this
//! machine, one file per project key.

use crate::error::Result;
use crate::io;
use crate::paths;
use crate::workflow::{StepContext, WorkflowState};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostConfigFile {
    pub thoughts: HostThoughts,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostThoughts {
    pub thoughts_repo: PathBuf,
    pub user: String,
    #[serde(default = "default_repos_dir")]
    pub repos_dir: String,
    #[serde(default = "default_global_dir")]
    pub global_dir: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_repos_dir() -> String {
    paths::THOUGHTS_REPOS_DIR.to_string()
}

fn default_global_dir() -> String {
    paths::THOUGHTS_GLOBAL_DIR.to_string()
}

impl HostConfigFile {
    pub fn new(thoughts_repo: &Path, user: &str) -> Self {
        Self {
            thoughts: HostThoughts {
                thoughts_repo: thoughts_repo.to_path_buf(),
                user: user.to_string(),
                repos_dir: default_repos_dir(),
                global_dir: default_global_dir(),
                extra: Map::new(),
            },
            extra: Map::new(),
        }
    }
}

pub fn load(config_home: &Path, project_key: &str) -> Result<Option<HostConfigFile>> {
    io::read_json(&paths::host_config_path(config_home, project_key))
}

pub fn save(config_home: &Path, project_key: &str, file: &HostConfigFile) -> Result<()> {
    io::write_json(&paths::host_config_path(config_home, project_key), file)
}

/// Login name of the current user, used as the default display name.
pub fn machine_username() -> String {
    ["USER", "USERNAME"]
        .iter()
        .filter_map(|k| std::env::var(k).ok())
        .find(|v| !v.trim().is_empty())
        .unwrap_or_else(|| "developer".to_string())
}

fn same_path(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(x), Ok(y)) => x == y,
        _ => false,
    }
}

// ---------------------------------------------------------------------------
// Decision layer
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostDecision {
    CreateFresh,
    UpToDate,
    PathConflict { existing_repo: PathBuf },
}

pub fn decide(existing: Option<&HostConfigFile>, resolved_repo: &Path) -> HostDecision {
    match existing {
        None => HostDecision::CreateFresh,
        Some(f) if same_path(&f.thoughts.thoughts_repo, resolved_repo) => HostDecision::UpToDate,
        Some(f) => HostDecision::PathConflict {
            existing_repo: f.thoughts.thoughts_repo.clone(),
        },
    }
}

// ---------------------------------------------------------------------------
// Step
// ---------------------------------------------------------------------------

/// Create or reconcile the host config.
///
/// When the file points at a different thoughts repository and the operator
/// declines to repoint it, the existing path wins for the rest of the run.
pub fn write_host_config(
    mut state: WorkflowState,
    cx: &mut StepContext<'_>,
) -> Result<WorkflowState> {
    let key = state.identity.project_key.clone();
    let config_home = cx.settings.config_home.clone();
    let path = paths::host_config_path(&config_home, &key);
    let existing = load(&config_home, &key)?;
    let decision = decide(existing.as_ref(), &state.thoughts_repo);
    tracing::debug!(?decision, "host config");

    match (decision, existing) {
        (HostDecision::UpToDate, Some(file)) => {
            cx.prompter.say(&format!("  exists:  {}", path.display()));
            state.user = Some(file.thoughts.user);
        }
        (HostDecision::PathConflict { existing_repo }, Some(mut file)) => {
            let question = format!(
                "{} points at thoughts repository {}. Update it to {}?",
                path.display(),
                existing_repo.display(),
                state.thoughts_repo.display()
            );
            if cx.prompter.confirm(&question, false)? {
                file.thoughts.thoughts_repo = state.thoughts_repo.clone();
                save(&config_home, &key, &file)?;
                tracing::info!(repo = %state.thoughts_repo.display(), "host config repointed");
                cx.prompter.say(&format!("  updated: {}", path.display()));
            } else {
                state.warnings.push(format!(
                    "using previously configured thoughts repository {} instead of {}",
                    existing_repo.display(),
                    state.thoughts_repo.display()
                ));
                cx.prompter.say(&format!(
                    "  kept:    {} (thoughts at {})",
                    path.display(),
                    existing_repo.display()
                ));
                state.thoughts_repo = existing_repo;
            }
            state.user = Some(file.thoughts.user);
        }
        _ => {
            let default_user = machine_username();
            let user = cx
                .prompter
                .input("Your name for thoughts notes", Some(default_user.as_str()))?;
            save(&config_home, &key, &HostConfigFile::new(&state.thoughts_repo, &user))?;
            tracing::info!(path = %path.display(), "host config written");
            cx.prompter.say(&format!("  created: {}", path.display()));
            state.user = Some(user);
        }
    }
    Ok(state)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
