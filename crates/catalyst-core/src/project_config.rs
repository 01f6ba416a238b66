//! Project Configuration: `<projectDir>/.project/config.json`.

use crate::error::Result;
use crate::identity::WorkspaceIdentity;
use crate::io;
use crate::paths;
use crate::workflow::{StepContext, WorkflowState};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;

/// Stand-in ticket prefix for projects that have not chosen one.
pub const TICKET_PREFIX_PLACEHOLDER: &str = "PROJ";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectConfigFile {
    pub catalyst: ProjectConfig,
    /// Sections owned by other tools, preserved on rewrite.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectConfig {
    pub project_key: String,
    pub repository: RepositoryRef,
    pub project: ProjectInfo,
    #[serde(default)]
    pub thoughts: ThoughtsRef,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepositoryRef {
    pub org: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectInfo {
    pub ticket_prefix: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThoughtsRef {
    pub user: Option<String>,
}

impl ProjectConfig {
    pub fn new(identity: &WorkspaceIdentity, ticket_prefix: &str, display_name: &str) -> Self {
        Self {
            project_key: identity.project_key.clone(),
            repository: RepositoryRef {
                org: identity.org.clone(),
                name: identity.repo.clone(),
            },
            project: ProjectInfo {
                ticket_prefix: ticket_prefix.to_string(),
                name: display_name.to_string(),
            },
            thoughts: ThoughtsRef::default(),
            extra: Map::new(),
        }
    }

    /// The ticket prefix, unless it is still the placeholder.
    pub fn real_ticket_prefix(&self) -> Option<&str> {
        let prefix = self.project.ticket_prefix.trim();
        if prefix.is_empty() || prefix == TICKET_PREFIX_PLACEHOLDER {
            None
        } else {
            Some(prefix)
        }
    }
}

pub fn load(project_dir: &Path) -> Result<Option<ProjectConfigFile>> {
    io::read_json(&paths::project_config_path(project_dir))
}

pub fn save(project_dir: &Path, file: &ProjectConfigFile) -> Result<()> {
    io::write_json(&paths::project_config_path(project_dir), file)
}

// ---------------------------------------------------------------------------
// Decision layer
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum ProjectConfigDecision {
    /// No file yet: ask for the free-text fields and write it.
    WriteFresh,
    /// File present with the detected key: leave it alone.
    Matches,
    /// File present with a different key: the operator picks the winner.
    KeyConflict { existing_key: String },
}

pub fn decide(existing: Option<&ProjectConfigFile>, detected_key: &str) -> ProjectConfigDecision {
    match existing {
        None => ProjectConfigDecision::WriteFresh,
        Some(f) if f.catalyst.project_key == detected_key => ProjectConfigDecision::Matches,
        Some(f) => ProjectConfigDecision::KeyConflict {
            existing_key: f.catalyst.project_key.clone(),
        },
    }
}

// ---------------------------------------------------------------------------
// Step
// ---------------------------------------------------------------------------

pub fn write_project_config(
    mut state: WorkflowState,
    cx: &mut StepContext<'_>,
) -> Result<WorkflowState> {
    let project_dir = state.identity.project_dir.clone();
    let existing = load(&project_dir)?;
    let decision = decide(existing.as_ref(), &state.identity.project_key);
    tracing::debug!(?decision, "project config");

    match (decision, existing) {
        (ProjectConfigDecision::Matches, Some(file)) => {
            cx.prompter.say(&format!("  exists:  {}", paths::PROJECT_CONFIG_FILE));
            state.ticket_prefix = file.catalyst.real_ticket_prefix().map(str::to_string);
        }
        (ProjectConfigDecision::KeyConflict { existing_key }, Some(mut file)) => {
            let detected = state.identity.project_key.clone();
            let question = format!(
                "Project config uses key '{existing_key}' but '{detected}' was detected. Switch to '{detected}'?"
            );
            if cx.prompter.confirm(&question, false)? {
                file.catalyst.project_key = detected;
                file.catalyst.repository = RepositoryRef {
                    org: state.identity.org.clone(),
                    name: state.identity.repo.clone(),
                };
                save(&project_dir, &file)?;
                tracing::info!(key = %file.catalyst.project_key, "project key updated");
                cx.prompter
                    .say(&format!("  updated: {} (projectKey)", paths::PROJECT_CONFIG_FILE));
            } else {
                cx.prompter.say(&format!(
                    "  kept:    {} (projectKey '{existing_key}')",
                    paths::PROJECT_CONFIG_FILE
                ));
                state.identity.project_key = existing_key;
            }
            state.ticket_prefix = file.catalyst.real_ticket_prefix().map(str::to_string);
        }
        _ => {
            let ticket_prefix = cx
                .prompter
                .input("Ticket prefix (e.g. ENG)", Some(TICKET_PREFIX_PLACEHOLDER))?;
            let display_name = cx
                .prompter
                .input("Project display name", Some(state.identity.repo.as_str()))?;
            let config = ProjectConfig::new(&state.identity, &ticket_prefix, &display_name);
            state.ticket_prefix = config.real_ticket_prefix().map(str::to_string);
            save(
                &project_dir,
                &ProjectConfigFile {
                    catalyst: config,
                    extra: Map::new(),
                },
            )?;
            tracing::info!(key = %state.identity.project_key, "project config written");
            cx.prompter
                .say(&format!("  created: {}", paths::PROJECT_CONFIG_FILE));
        }
    }
    Ok(state)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::{Answer, ScriptedPrompter};
    use crate::settings::Settings;
    use crate::testing::FakeToolchain;
    use serde_json::json;
    use tempfile::TempDir;

    fn state(dir: &TempDir) -> WorkflowState {
        WorkflowState::new(WorkspaceIdentity::new(
            "acme",
            "api",
            dir.path().join("acme/api"),
        ))
    }

    fn run(dir: &TempDir, answers: Vec<Answer>) -> (WorkflowState, ScriptedPrompter) {
        let settings = Settings::sandboxed(dir.path());
        let tc = FakeToolchain::complete();
        let mut p = ScriptedPrompter::new(answers);
        let mut cx = StepContext::new(&settings, &tc, &mut p);
        let state = write_project_config(state(dir), &mut cx).unwrap();
        (state, p)
    }

    #[test]
    fn fresh_write_has_expected_shape() {
        let dir = TempDir::new().unwrap();
        let (state, _) = run(&dir, vec![Answer::text("ENG"), Answer::Default]);
        let raw: Value = serde_json::from_str(
            &std::fs::read_to_string(dir.path().join("acme/api/.project/config.json")).unwrap(),
        )
        .unwrap();
        assert_eq!(
            raw,
            json!({"catalyst": {
                "projectKey": "acme",
                "repository": {"org": "acme", "name": "api"},
                "project": {"ticketPrefix": "ENG", "name": "api"},
                "thoughts": {"user": null}
            }})
        );
        assert_eq!(state.ticket_prefix.as_deref(), Some("ENG"));
    }

    #[test]
    fn placeholder_prefix_is_not_real() {
        let dir = TempDir::new().unwrap();
        let (state, _) = run(&dir, vec![Answer::Default, Answer::Default]);
        assert_eq!(state.ticket_prefix, None);
    }

    #[test]
    fn matching_key_short_circuits() {
        let dir = TempDir::new().unwrap();
        run(&dir, vec![Answer::text("ENG"), Answer::text("API")]);
        let path = dir.path().join("acme/api/.project/config.json");
        let before = std::fs::read(&path).unwrap();
        let (state, p) = run(&dir, vec![]);
        assert!(p.asked.is_empty());
        assert_eq!(before, std::fs::read(&path).unwrap());
        assert_eq!(state.ticket_prefix.as_deref(), Some("ENG"));
    }

    fn seed_with_key(dir: &TempDir, key: &str) {
        let mut id = WorkspaceIdentity::new("acme", "api", dir.path().join("acme/api"));
        id.project_key = key.to_string();
        let mut file = ProjectConfigFile {
            catalyst: ProjectConfig::new(&id, "OPS", "API"),
            extra: Map::new(),
        };
        file.extra.insert("other".into(), json!({"keep": true}));
        save(&id.project_dir, &file).unwrap();
    }

    #[test]
    fn declined_conflict_keeps_existing_key() {
        let dir = TempDir::new().unwrap();
        seed_with_key(&dir, "legacy");
        let (state, _) = run(&dir, vec![Answer::No]);
        assert_eq!(state.identity.project_key, "legacy");
        let file = load(&dir.path().join("acme/api")).unwrap().unwrap();
        assert_eq!(file.catalyst.project_key, "legacy");
    }

    #[test]
    fn accepted_conflict_rewrites_preserving_other_sections() {
        let dir = TempDir::new().unwrap();
        seed_with_key(&dir, "legacy");
        let (state, _) = run(&dir, vec![Answer::Yes]);
        assert_eq!(state.identity.project_key, "acme");
        let file = load(&dir.path().join("acme/api")).unwrap().unwrap();
        assert_eq!(file.catalyst.project_key, "acme");
        assert_eq!(file.catalyst.project.ticket_prefix, "OPS");
        assert_eq!(file.extra["other"], json!({"keep": true}));
    }

    #[test]
    fn decide_table() {
        let id = WorkspaceIdentity::new("acme", "api", "/x/acme/api".into());
        let file = ProjectConfigFile {
            catalyst: ProjectConfig::new(&id, "ENG", "api"),
            extra: Map::new(),
        };
        assert_eq!(decide(None, "acme"), ProjectConfigDecision::WriteFresh);
        assert_eq!(decide(Some(&file), "acme"), ProjectConfigDecision::Matches);
        assert_eq!(
            decide(Some(&file), "other"),
            ProjectConfigDecision::KeyConflict {
                existing_key: "acme".into()
            }
        );
    }
}
