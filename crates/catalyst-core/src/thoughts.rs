//! The shared "thoughts" repository: one per organization root, holding
//! `repos/` (per-project notes) and `global/` (cross-project notes).

use crate::error::{CatalystError, Result};
use crate::io;
use crate::paths;
use crate::toolchain::ExternalOutcome;
use crate::workflow::{StepContext, WorkflowState};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Missing {
    ReposDir,
    GlobalDir,
    VersionControl,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThoughtsRepoState {
    Absent,
    Malformed { missing: Vec<Missing> },
    Valid,
}

/// Classify the directory at `path` without touching it.
pub fn inspect(path: &Path) -> ThoughtsRepoState {
    if !path.is_dir() {
        return ThoughtsRepoState::Absent;
    }
    let mut missing = Vec::new();
    if !path.join(paths::THOUGHTS_REPOS_DIR).is_dir() {
        missing.push(Missing::ReposDir);
    }
    if !path.join(paths::THOUGHTS_GLOBAL_DIR).is_dir() {
        missing.push(Missing::GlobalDir);
    }
    if !path.join(paths::GIT_DIR).exists() {
        missing.push(Missing::VersionControl);
    }
    if missing.is_empty() {
        ThoughtsRepoState::Valid
    } else {
        ThoughtsRepoState::Malformed { missing }
    }
}

/// Ensure the thoughts repository exists and is well formed.
///
/// Creation needs the operator's consent and declining is fatal. Repair is
/// additive: missing pieces are created, nothing is removed.
pub fn ensure_thoughts_repo(
    mut state: WorkflowState,
    cx: &mut StepContext<'_>,
) -> Result<WorkflowState> {
    let repo = state.thoughts_repo.clone();
    match inspect(&repo) {
        ThoughtsRepoState::Valid => {
            cx.prompter.say(&format!("  exists:  {}", repo.display()));
        }
        ThoughtsRepoState::Malformed { missing } => {
            tracing::info!(path = %repo.display(), ?missing, "repairing thoughts repository");
            create_missing(&repo, &missing, &mut state, cx)?;
            cx.prompter.say(&format!("  repaired: {}", repo.display()));
        }
        ThoughtsRepoState::Absent => {
            let question = format!(
                "Create the shared thoughts repository at {}?",
                repo.display()
            );
            if !cx.prompter.confirm(&question, true)? {
                return Err(CatalystError::ThoughtsRepoDeclined(
                    repo.display().to_string(),
                ));
            }
            let all = [Missing::ReposDir, Missing::GlobalDir, Missing::VersionControl];
            create_missing(&repo, &all, &mut state, cx)?;
            cx.prompter.say(&format!("  created: {}", repo.display()));
            offer_remote_backup(&repo, &mut state, cx)?;
        }
    }
    Ok(state)
}

fn create_missing(
    repo: &Path,
    missing: &[Missing],
    state: &mut WorkflowState,
    cx: &mut StepContext<'_>,
) -> Result<()> {
    io::ensure_dir(repo)?;
    for piece in missing {
        match piece {
            Missing::ReposDir => io::ensure_dir(&repo.join(paths::THOUGHTS_REPOS_DIR))?,
            Missing::GlobalDir => io::ensure_dir(&repo.join(paths::THOUGHTS_GLOBAL_DIR))?,
            Missing::VersionControl => {
                if let ExternalOutcome::Failure {
                    reason,
                    manual_command,
                } = cx.toolchain.git_init(repo)
                {
                    cx.prompter
                        .say(&format!("  failed:  git init ({reason}); run: {manual_command}"));
                    state
                        .warnings
                        .push(format!("thoughts repository is not under git: {manual_command}"));
                }
            }
        }
    }
    Ok(())
}

const BACKUP_CREATE: usize = 0;
const BACKUP_LINK: usize = 1;
const BACKUP_SKIP: usize = 2;

/// Best effort: failures are reported and recorded as warnings.
fn offer_remote_backup(
    repo: &Path,
    state: &mut WorkflowState,
    cx: &mut StepContext<'_>,
) -> Result<()> {
    let choice = cx.prompter.select(
        "Back up the thoughts repository to a remote?",
        &[
            "Create a new private remote",
            "Link an existing remote",
            "Skip",
        ],
        BACKUP_SKIP,
    )?;
    let outcome = match choice {
        BACKUP_CREATE => {
            let name = format!("{}/{}", state.identity.org, paths::THOUGHTS_DIR);
            cx.toolchain.create_private_remote(repo, &name)
        }
        BACKUP_LINK => {
            let url = cx.prompter.input("Remote URL", None)?;
            cx.toolchain.git_add_remote(repo, &url)
        }
        _ => {
            cx.prompter.say("  skipped: remote backup");
            return Ok(());
        }
    };
    match outcome {
        ExternalOutcome::Success { .. } => cx.prompter.say("  linked:  thoughts remote"),
        ExternalOutcome::Failure {
            reason,
            manual_command,
        } => {
            cx.prompter
                .say(&format!("  failed:  remote backup ({reason}); run: {manual_command}"));
            state
                .warnings
                .push(format!("thoughts remote backup failed: {reason}"));
        }
    }
    Ok(())
}

/// Link the thoughts repository into the project and build its index.
///
/// Command failures print a retry command and become warnings; the run
/// carries on to validation.
pub fn link_thoughts(mut state: WorkflowState, cx: &mut StepContext<'_>) -> Result<WorkflowState> {
    let id = &state.identity;
    let project_dir = id.project_dir.clone();
    let host_config = paths::host_config_path(&cx.settings.config_home, &id.project_key);
    let link = paths::thoughts_link_path(&project_dir);

    match link.symlink_metadata() {
        Ok(meta) if meta.file_type().is_symlink() => {
            cx.prompter.say(&format!("  exists:  {}", link.display()));
        }
        Ok(_) => {
            // A real directory would shadow the link; leave it for the operator.
            tracing::warn!(path = %link.display(), "thoughts path is not a symlink");
            cx.prompter.say(&format!("  blocked: {} is not a symlink", link.display()));
            state.warnings.push(format!(
                "{} is not a symlink; move it aside and re-run setup to link the thoughts repository",
                link.display()
            ));
            return Ok(state);
        }
        Err(_) => {
            let repo_name = id.repo.clone();
            let outcome = cx.toolchain.thoughts(
                &project_dir,
                &["init", "--directory", &repo_name],
                &host_config,
            );
            report_thoughts_outcome("thoughts init", outcome, &mut state, cx);
        }
    }

    let outcome = cx.toolchain.thoughts(&project_dir, &["sync"], &host_config);
    report_thoughts_outcome("thoughts sync", outcome, &mut state, cx);
    Ok(state)
}

fn report_thoughts_outcome(
    label: &str,
    outcome: ExternalOutcome,
    state: &mut WorkflowState,
    cx: &mut StepContext<'_>,
) {
    match outcome {
        ExternalOutcome::Success { .. } => cx.prompter.say(&format!("  ran:     {label}")),
        ExternalOutcome::Failure {
            reason,
            manual_command,
        } => {
            tracing::warn!(%reason, "{label} failed");
            cx.prompter
                .say(&format!("  failed:  {label} ({reason})\n  retry with: {manual_command}"));
            state
                .warnings
                .push(format!("{label} failed; retry with: {manual_command}"));
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
