use crate::error::Result;
use crate::io;
use crate::paths;
use crate::workflow::{StepContext, WorkflowState};

/// Ensure `<orgRoot>/<repo>-worktrees/` exists. Declining is not an error;
/// it is carried as a warning into the final report.
pub fn ensure_worktrees_dir(
    mut state: WorkflowState,
    cx: &mut StepContext<'_>,
) -> Result<WorkflowState> {
    let dir = paths::worktrees_dir(&state.identity.org_root, &state.identity.repo);
    if dir.is_dir() {
        cx.prompter.say(&format!("  exists:  {}", dir.display()));
        return Ok(state);
    }
    let question = format!("Create worktree directory {}?", dir.display());
    if cx.prompter.confirm(&question, true)? {
        io::ensure_dir(&dir)?;
        tracing::info!(path = %dir.display(), "created worktree directory");
        cx.prompter.say(&format!("  created: {}", dir.display()));
    } else {
        cx.prompter.say(&format!("  skipped: {}", dir.display()));
        state
            .warnings
            .push(format!("worktree directory not created: {}", dir.display()));
    }
    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::WorkspaceIdentity;
    use crate::prompt::{Answer, ScriptedPrompter};
    use crate::settings::Settings;
    use crate::testing::FakeToolchain;
    use tempfile::TempDir;

    fn run(dir: &TempDir, answers: Vec<Answer>) -> (WorkflowState, ScriptedPrompter) {
        let settings = Settings::sandboxed(dir.path());
        let tc = FakeToolchain::complete();
        let mut p = ScriptedPrompter::new(answers);
        let state = WorkflowState::new(WorkspaceIdentity::new(
            "acme",
            "api",
            dir.path().join("acme/api"),
        ));
        let mut cx = StepContext::new(&settings, &tc, &mut p);
        let state = ensure_worktrees_dir(state, &mut cx).unwrap();
        (state, p)
    }

    #[test]
    fn creates_when_confirmed() {
        let dir = TempDir::new().unwrap();
        let (state, _) = run(&dir, vec![Answer::Yes]);
        assert!(dir.path().join("acme/api-worktrees").is_dir());
        assert!(state.warnings.is_empty());
    }

    #[test]
    fn decline_is_a_warning() {
        let dir = TempDir::new().unwrap();
        let (state, _) = run(&dir, vec![Answer::No]);
        assert!(!dir.path().join("acme/api-worktrees").exists());
        assert_eq!(state.warnings.len(), 1);
    }

    #[test]
    fn existing_dir_asks_nothing() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("acme/api-worktrees")).unwrap();
        let (_, p) = run(&dir, vec![]);
        assert!(p.asked.is_empty());
    }
}
