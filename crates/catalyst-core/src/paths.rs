use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const THOUGHTS_DIR: &str = "thoughts";
pub const THOUGHTS_REPOS_DIR: &str = "repos";
pub const THOUGHTS_GLOBAL_DIR: &str = "global";
pub const WORKTREES_SUFFIX: &str = "-worktrees";

pub const PROJECT_DIR: &str = ".project";
pub const PROJECT_CONFIG_FILE: &str = ".project/config.json";

/// Directory under the config home read by the thoughts CLI.
pub const HOST_CONFIG_DIR: &str = "humanlayer";
/// Directory under the config home holding integration credentials.
pub const SECRETS_CONFIG_DIR: &str = "catalyst";

pub const GIT_DIR: &str = ".git";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn project_config_path(project_dir: &Path) -> PathBuf {
    project_dir.join(PROJECT_CONFIG_FILE)
}

pub fn thoughts_repo_path(org_root: &Path) -> PathBuf {
    org_root.join(THOUGHTS_DIR)
}

/// The symlink the thoughts CLI places inside a project checkout.
pub fn thoughts_link_path(project_dir: &Path) -> PathBuf {
    project_dir.join(THOUGHTS_DIR)
}

pub fn worktrees_dir(org_root: &Path, repo_name: &str) -> PathBuf {
    org_root.join(format!("{repo_name}{WORKTREES_SUFFIX}"))
}

fn keyed_config_file(project_key: &str) -> String {
    format!("config-{project_key}.json")
}

pub fn host_config_path(config_home: &Path, project_key: &str) -> PathBuf {
    config_home
        .join(HOST_CONFIG_DIR)
        .join(keyed_config_file(project_key))
}

pub fn secrets_config_path(config_home: &Path, project_key: &str) -> PathBuf {
    config_home
        .join(SECRETS_CONFIG_DIR)
        .join(keyed_config_file(project_key))
}

/// Walk upward from `start` looking for a `.git` entry (directory, or file
/// for linked worktrees). Returns the checkout root.
pub fn find_checkout_root(start: &Path) -> Option<PathBuf> {
    let mut dir = start.to_path_buf();
    loop {
        if dir.join(GIT_DIR).exists() {
            return Some(dir);
        }
        match dir.parent() {
            Some(p) => dir = p.to_path_buf(),
            None => return None,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
