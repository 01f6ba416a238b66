use thiserror::Error;

/// Conditions that abort a setup run.
///
/// Anything recoverable (a declined worktree, a skipped integration, a failed
/// remote backup) is recorded as a warning on the workflow state instead.
#[derive(Debug, Error)]
pub enum CatalystError {
    #[error("required tool '{tool}' is not installed: {hint}")]
    MissingTool { tool: String, hint: String },

    #[error("invalid repository '{0}': expected <org>/<repo>")]
    MalformedRepoSpec(String),

    #[error("the thoughts repository is required: declined to create {0}")]
    ThoughtsRepoDeclined(String),

    #[error("not a git checkout: {0}")]
    NotACheckout(String),

    #[error("cannot determine the project at {0}: pass --project-key")]
    UnknownProject(String),

    #[error("failed to clone {url}: {reason}")]
    CloneFailed { url: String, reason: String },

    #[error("invalid config file {path}: {reason}")]
    InvalidConfig { path: String, reason: String },

    #[error("prompt failed: {0}")]
    Prompt(String),

    #[error("home directory not found: set HOME environment variable")]
    HomeNotFound,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CatalystError>;
