//! Repository locator: which project are we setting up, and where does its
//! organization live on disk.

use crate::error::{CatalystError, Result};
use crate::paths;
use crate::project_config;
use crate::toolchain::{ExternalOutcome, Toolchain};
use crate::workflow::StepContext;
use regex::Regex;
use serde::Serialize;
use std::path::{Component, Path, PathBuf};
use std::sync::OnceLock;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceIdentity {
    pub org: String,
    pub repo: String,
    /// Join key across the project, host and secrets configs.
    pub project_key: String,
    pub org_root: PathBuf,
    pub project_dir: PathBuf,
}

impl WorkspaceIdentity {
    /// Identity for a checkout at `project_dir`. The project key starts out
    /// as the org name; an existing project config may override it later.
    pub fn new(org: impl Into<String>, repo: impl Into<String>, project_dir: PathBuf) -> Self {
        let org = org.into();
        let org_root = project_dir
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| project_dir.clone());
        Self {
            project_key: org.clone(),
            org,
            repo: repo.into(),
            org_root,
            project_dir,
        }
    }
}

/// Outcome of the locator. Cancelling happens before anything is mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Located {
    Found(WorkspaceIdentity),
    Cancelled,
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

static REMOTE_RE: OnceLock<Regex> = OnceLock::new();
static SPEC_RE: OnceLock<Regex> = OnceLock::new();

fn remote_re() -> &'static Regex {
    REMOTE_RE.get_or_init(|| {
        Regex::new(r"github\.com[:/]([A-Za-z0-9_.-]+)/([A-Za-z0-9_.-]+?)(?:\.git)?/?$").unwrap()
    })
}

fn spec_re() -> &'static Regex {
    SPEC_RE.get_or_init(|| Regex::new(r"^([A-Za-z0-9_.-]+)/([A-Za-z0-9_.-]+)$").unwrap())
}

/// Extract `(org, repo)` from an SSH or HTTPS GitHub remote URL.
pub fn parse_remote_url(url: &str) -> Option<(String, String)> {
    let caps = remote_re().captures(url.trim())?;
    Some((caps[1].to_string(), caps[2].to_string()))
}

/// Extract `(org, repo)` from a path shaped like `.../github/<org>/<repo>/...`.
pub fn parse_github_path(path: &Path) -> Option<(String, String)> {
    let parts: Vec<String> = path
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    let idx = parts.iter().rposition(|p| p == "github")?;
    let org = parts.get(idx + 1)?;
    let repo = parts.get(idx + 2)?;
    Some((org.clone(), repo.clone()))
}

/// Validate manual `org/repo` input.
pub fn parse_repo_spec(input: &str) -> Result<(String, String)> {
    let trimmed = input.trim();
    let caps = spec_re()
        .captures(trimmed)
        .ok_or_else(|| CatalystError::MalformedRepoSpec(trimmed.to_string()))?;
    let org = &caps[1];
    let repo = caps[2].trim_end_matches(".git");
    if repo.is_empty() || org.chars().all(|c| c == '.') || repo.chars().all(|c| c == '.') {
        return Err(CatalystError::MalformedRepoSpec(trimmed.to_string()));
    }
    Ok((org.to_string(), repo.to_string()))
}

fn expand_home(input: &str) -> PathBuf {
    match (input.strip_prefix("~/"), home::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(input),
    }
}

// ---------------------------------------------------------------------------
// Locator
// ---------------------------------------------------------------------------

const CHOICE_EXISTING: usize = 0;
const CHOICE_CLONE: usize = 1;
const CHOICE_CANCEL: usize = 2;

/// Determine the project being set up, starting from `start`.
pub fn locate(start: &Path, cx: &mut StepContext<'_>) -> Result<Located> {
    if let Some(root) = paths::find_checkout_root(start) {
        return identify_checkout(&root, cx).map(Located::Found);
    }

    cx.prompter
        .say(&format!("{} is not inside a git checkout.", start.display()));
    let choice = cx.prompter.select(
        "How do you want to continue?",
        &[
            "Use an existing local checkout",
            "Clone a repository",
            "Cancel",
        ],
        CHOICE_CANCEL,
    )?;
    match choice {
        CHOICE_EXISTING => {
            let answer = cx.prompter.input("Path to the checkout", None)?;
            let path = expand_home(&answer);
            let root = paths::find_checkout_root(&path)
                .ok_or_else(|| CatalystError::NotACheckout(path.display().to_string()))?;
            identify_checkout(&root, cx).map(Located::Found)
        }
        CHOICE_CLONE => clone_fresh(cx).map(Located::Found),
        _ => {
            tracing::info!("setup cancelled before any changes");
            Ok(Located::Cancelled)
        }
    }
}

/// Identify an existing checkout: remote URL, then path layout, then ask.
fn identify_checkout(root: &Path, cx: &mut StepContext<'_>) -> Result<WorkspaceIdentity> {
    let detected = cx
        .toolchain
        .remote_url(root)
        .and_then(|url| parse_remote_url(&url))
        .or_else(|| parse_github_path(root));

    let (org, repo) = match detected {
        Some(pair) => pair,
        None => {
            tracing::debug!(root = %root.display(), "could not infer org/repo");
            let answer = cx
                .prompter
                .input("Repository identity (org/repo)", None)?;
            parse_repo_spec(&answer)?
        }
    };
    cx.prompter.say(&format!(
        "  project: {org}/{repo} at {}",
        root.display()
    ));
    Ok(WorkspaceIdentity::new(org, repo, root.to_path_buf()))
}

fn clone_fresh(cx: &mut StepContext<'_>) -> Result<WorkspaceIdentity> {
    let answer = cx.prompter.input("Repository to clone (org/repo)", None)?;
    let (org, repo) = parse_repo_spec(&answer)?;
    let default_base = cx.settings.clone_base.display().to_string();
    let base = expand_home(&cx.prompter.input("Clone under", Some(&default_base))?);
    let dest = base.join(&org).join(&repo);

    if dest.join(paths::GIT_DIR).exists() {
        cx.prompter
            .say(&format!("  exists:  {}", dest.display()));
    } else {
        let url = format!("https://github.com/{org}/{repo}.git");
        match cx.toolchain.git_clone(&url, &dest) {
            ExternalOutcome::Success { .. } => {
                tracing::info!(dest = %dest.display(), "cloned");
                cx.prompter.say(&format!("  cloned:  {}", dest.display()));
            }
            ExternalOutcome::Failure { reason, .. } => {
                return Err(CatalystError::CloneFailed { url, reason });
            }
        }
    }
    Ok(WorkspaceIdentity::new(org, repo, dest))
}

/// Identity of an already set-up project, without asking anything.
///
/// Org and repo come from the project config, then the checkout's remote or
/// path. The key comes from `key_override`, then the project config, then
/// the org. A corrupt project config is ignored here so the validator can
/// still report on everything else.
pub fn resolve_existing(
    project_dir: &Path,
    key_override: Option<&str>,
    toolchain: &dyn Toolchain,
) -> Result<WorkspaceIdentity> {
    let config = match project_config::load(project_dir) {
        Ok(c) => c.map(|f| f.catalyst),
        Err(e) => {
            tracing::warn!(error = %e, "ignoring unreadable project config");
            None
        }
    };
    let detected = || {
        toolchain
            .remote_url(project_dir)
            .and_then(|url| parse_remote_url(&url))
            .or_else(|| parse_github_path(project_dir))
    };
    let dir_name = || {
        project_dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
    };

    let (org, repo) = match (&config, key_override) {
        (Some(c), _) => (c.repository.org.clone(), c.repository.name.clone()),
        (None, key) => match (detected(), key, dir_name()) {
            (Some(pair), _, _) => pair,
            (None, Some(key), Some(name)) => (key.to_string(), name),
            _ => {
                return Err(CatalystError::UnknownProject(
                    project_dir.display().to_string(),
                ))
            }
        },
    };

    let mut identity = WorkspaceIdentity::new(org, repo, project_dir.to_path_buf());
    if let Some(key) = key_override {
        identity.project_key = key.to_string();
    } else if let Some(c) = &config {
        identity.project_key = c.project_key.clone();
    }
    Ok(identity)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
