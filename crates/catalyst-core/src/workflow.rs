//! The provisioning workflow: prerequisites, locate, then a fixed sequence
//! of idempotent steps, then validation.
//!
//! Each step takes the [`WorkflowState`] by value and returns the updated
//! state. Re-running the whole workflow is the repair procedure, so every
//! step detects existing state before creating anything.

use crate::error::Result;
use crate::identity::{self, Located, WorkspaceIdentity};
use crate::prompt::Prompter;
use crate::settings::Settings;
use crate::toolchain::Toolchain;
use crate::validate::{self, ValidationReport, ValidationTarget};
use crate::{host_config, paths, prereq, project_config, secrets, thoughts, worktrees};
use std::path::{Path, PathBuf};

/// Collaborators shared by every step.
pub struct StepContext<'a> {
    pub settings: &'a Settings,
    pub toolchain: &'a dyn Toolchain,
    pub prompter: &'a mut dyn Prompter,
}

impl<'a> StepContext<'a> {
    pub fn new(
        settings: &'a Settings,
        toolchain: &'a dyn Toolchain,
        prompter: &'a mut dyn Prompter,
    ) -> Self {
        Self {
            settings,
            toolchain,
            prompter,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowState {
    pub identity: WorkspaceIdentity,
    /// Thoughts repository used for the rest of the run. Starts as
    /// `<orgRoot>/thoughts`; the host config step may redirect it.
    pub thoughts_repo: PathBuf,
    pub user: Option<String>,
    /// Real (non-placeholder) ticket prefix from the project config.
    pub ticket_prefix: Option<String>,
    /// Recoverable problems, reported after validation.
    pub warnings: Vec<String>,
}

impl WorkflowState {
    pub fn new(identity: WorkspaceIdentity) -> Self {
        Self {
            thoughts_repo: paths::thoughts_repo_path(&identity.org_root),
            identity,
            user: None,
            ticket_prefix: None,
            warnings: Vec::new(),
        }
    }
}

type Step = fn(WorkflowState, &mut StepContext<'_>) -> Result<WorkflowState>;

const STEPS: &[(&str, Step)] = &[
    ("Thoughts repository", thoughts::ensure_thoughts_repo),
    ("Worktree directory", worktrees::ensure_worktrees_dir),
    ("Project config", project_config::write_project_config),
    ("Host config", host_config::write_host_config),
    ("Integrations", secrets::write_secrets_config),
    ("Thoughts link", thoughts::link_thoughts),
];

#[derive(Debug)]
pub enum SetupOutcome {
    /// The operator backed out before anything was changed.
    Cancelled,
    Completed {
        state: WorkflowState,
        report: ValidationReport,
    },
}

impl SetupOutcome {
    pub fn exit_code(&self) -> i32 {
        match self {
            SetupOutcome::Cancelled => 0,
            SetupOutcome::Completed { report, .. } => report.exit_code(),
        }
    }
}

/// Run the whole workflow from `start`.
///
/// Fatal conditions come back as `Err`; everything else ends in a
/// validation report.
pub fn run_setup(start: &Path, cx: &mut StepContext<'_>) -> Result<SetupOutcome> {
    cx.prompter.say("Prerequisites:");
    let warnings = prereq::ensure_prerequisites(cx.toolchain, cx.settings, &mut *cx.prompter)?;

    cx.prompter.say("\nRepository:");
    let identity = match identity::locate(start, cx)? {
        Located::Found(identity) => identity,
        Located::Cancelled => return Ok(SetupOutcome::Cancelled),
    };
    tracing::info!(org = %identity.org, repo = %identity.repo, "setting up");

    let mut state = WorkflowState::new(identity);
    state.warnings = warnings;
    for (title, step) in STEPS {
        cx.prompter.say(&format!("\n{title}:"));
        state = step(state, cx)?;
    }

    let report = validate::validate(&ValidationTarget::new(&state.identity, cx.settings));
    Ok(SetupOutcome::Completed { state, report })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
