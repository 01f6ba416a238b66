//! Run-wide settings resolved once by the binary and passed by reference.

use crate::error::{CatalystError, Result};
use std::path::{Path, PathBuf};

pub const DEFAULT_THOUGHTS_CLI: &str = "humanlayer thoughts";
/// Environment variable the thoughts CLI reads to locate its config file.
pub const THOUGHTS_CONFIG_ENV: &str = "HUMANLAYER_CONFIG";
/// Environment variable naming the base directory for fresh clones.
pub const CLONE_BASE_ENV: &str = "GITHUB_SOURCE_ROOT";
pub const DEFAULT_CLONE_BASE: &str = "code/github";

#[derive(Debug, Clone)]
pub struct Settings {
    /// Root of per-machine config files (`~/.config` by default).
    pub config_home: PathBuf,
    /// Program and leading arguments of the thoughts CLI.
    pub thoughts_cli: Vec<String>,
    /// Suggested base directory for the clone flow.
    pub clone_base: PathBuf,
}

impl Settings {
    /// Build settings from optional overrides, falling back to the home
    /// directory for anything unset.
    pub fn resolve(
        config_home: Option<&Path>,
        thoughts_cli: Option<&str>,
        clone_base: Option<&Path>,
    ) -> Result<Self> {
        let home = home::home_dir();
        let config_home = match config_home {
            Some(p) => p.to_path_buf(),
            None => home
                .as_ref()
                .ok_or(CatalystError::HomeNotFound)?
                .join(".config"),
        };
        let clone_base = match clone_base {
            Some(p) => p.to_path_buf(),
            None => home
                .as_ref()
                .map(|h| h.join(DEFAULT_CLONE_BASE))
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CLONE_BASE)),
        };
        Ok(Self {
            config_home,
            thoughts_cli: split_command(thoughts_cli.unwrap_or(DEFAULT_THOUGHTS_CLI)),
            clone_base,
        })
    }

    /// Settings rooted entirely inside `dir`. Used by tests and sandboxes.
    pub fn sandboxed(dir: &Path) -> Self {
        Self {
            config_home: dir.join(".config"),
            thoughts_cli: split_command(DEFAULT_THOUGHTS_CLI),
            clone_base: dir.join(DEFAULT_CLONE_BASE),
        }
    }

    /// Binary name of the thoughts CLI, used for prerequisite checks.
    pub fn thoughts_program(&self) -> &str {
        self.thoughts_cli
            .first()
            .map(String::as_str)
            .unwrap_or("humanlayer")
    }
}

fn split_command(cmd: &str) -> Vec<String> {
    cmd.split_whitespace().map(str::to_string).collect()
}
