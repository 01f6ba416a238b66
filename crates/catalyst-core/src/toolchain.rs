//! External collaborators: git, the code-hosting CLI, the thoughts CLI.
//!
//! Every invocation returns an [`ExternalOutcome`] instead of raw process
//! output, so workflow steps branch on a typed result and can print a
//! manual retry command without parsing text.

use crate::settings::THOUGHTS_CONFIG_ENV;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExternalOutcome {
    Success {
        artifact: Option<PathBuf>,
    },
    Failure {
        reason: String,
        manual_command: String,
    },
}

impl ExternalOutcome {
    pub fn success() -> Self {
        ExternalOutcome::Success { artifact: None }
    }

    pub fn produced(artifact: impl Into<PathBuf>) -> Self {
        ExternalOutcome::Success {
            artifact: Some(artifact.into()),
        }
    }

    pub fn failure(reason: impl Into<String>, manual_command: impl Into<String>) -> Self {
        ExternalOutcome::Failure {
            reason: reason.into(),
            manual_command: manual_command.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ExternalOutcome::Success { .. })
    }
}

pub trait Toolchain {
    /// Whether `program` resolves on PATH.
    fn has_tool(&self, program: &str) -> bool;

    /// Run a shell install command such as `npm install -g humanlayer`.
    fn run_install(&self, command: &str) -> ExternalOutcome;

    /// URL of the checkout's `origin` remote, if any.
    fn remote_url(&self, checkout: &Path) -> Option<String>;

    fn git_init(&self, dir: &Path) -> ExternalOutcome;

    fn git_clone(&self, url: &str, dest: &Path) -> ExternalOutcome;

    fn git_add_remote(&self, repo: &Path, url: &str) -> ExternalOutcome;

    /// Create a private hosted repository named `name` from `repo` and push.
    fn create_private_remote(&self, repo: &Path, name: &str) -> ExternalOutcome;

    /// Run the thoughts CLI with `args` inside `project_dir`, pointing it at
    /// `host_config` through its config environment variable.
    fn thoughts(&self, project_dir: &Path, args: &[&str], host_config: &Path) -> ExternalOutcome;
}

// ---------------------------------------------------------------------------
// System implementation
// ---------------------------------------------------------------------------

/// Runs the real binaries found on PATH.
#[derive(Debug, Clone)]
pub struct SystemToolchain {
    thoughts_cli: Vec<String>,
}

impl SystemToolchain {
    pub fn new(thoughts_cli: Vec<String>) -> Self {
        Self { thoughts_cli }
    }
}

fn display_command(dir: Option<&Path>, env: Option<(&str, &Path)>, argv: &[&str]) -> String {
    let mut out = String::new();
    if let Some(d) = dir {
        out.push_str(&format!("cd {} && ", quote(&d.display().to_string())));
    }
    if let Some((k, v)) = env {
        out.push_str(&format!("{k}={} ", quote(&v.display().to_string())));
    }
    let args: Vec<String> = argv.iter().map(|a| quote(a)).collect();
    out.push_str(&args.join(" "));
    out
}

fn quote(s: &str) -> String {
    if s.is_empty() || s.contains(|c: char| c.is_whitespace() || c == '\'' || c == '"') {
        format!("'{}'", s.replace('\'', r"'\''"))
    } else {
        s.to_string()
    }
}

/// Run a command with captured output, mapping spawn errors and non-zero
/// exits to a failure carrying `manual`.
fn run_captured(cmd: &mut Command, manual: String) -> ExternalOutcome {
    tracing::debug!(command = %manual, "running");
    match cmd.stdin(Stdio::null()).output() {
        Ok(out) if out.status.success() => ExternalOutcome::success(),
        Ok(out) => {
            let stderr = String::from_utf8_lossy(&out.stderr).trim().to_string();
            let reason = if stderr.is_empty() {
                format!("exited with {}", out.status)
            } else {
                stderr
            };
            ExternalOutcome::failure(reason, manual)
        }
        Err(e) => ExternalOutcome::failure(e.to_string(), manual),
    }
}

impl Toolchain for SystemToolchain {
    fn has_tool(&self, program: &str) -> bool {
        which::which(program).is_ok()
    }

    fn run_install(&self, command: &str) -> ExternalOutcome {
        tracing::info!(command, "installing");
        match Command::new("sh").args(["-c", command]).status() {
            Ok(status) if status.success() => ExternalOutcome::success(),
            Ok(status) => ExternalOutcome::failure(format!("exited with {status}"), command),
            Err(e) => ExternalOutcome::failure(e.to_string(), command),
        }
    }

    fn remote_url(&self, checkout: &Path) -> Option<String> {
        let output = Command::new("git")
            .args(["remote", "get-url", "origin"])
            .current_dir(checkout)
            .output()
            .ok()?;
        if !output.status.success() {
            return None;
        }
        let url = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if url.is_empty() {
            None
        } else {
            Some(url)
        }
    }

    fn git_init(&self, dir: &Path) -> ExternalOutcome {
        let manual = display_command(Some(dir), None, &["git", "init"]);
        match run_captured(Command::new("git").arg("init").current_dir(dir), manual) {
            ExternalOutcome::Success { .. } => ExternalOutcome::produced(dir.join(".git")),
            failure => failure,
        }
    }

    fn git_clone(&self, url: &str, dest: &Path) -> ExternalOutcome {
        let dest_str = dest.display().to_string();
        let manual = display_command(None, None, &["git", "clone", url, &dest_str]);
        match run_captured(Command::new("git").args(["clone", url, &dest_str]), manual) {
            ExternalOutcome::Success { .. } => ExternalOutcome::produced(dest),
            failure => failure,
        }
    }

    fn git_add_remote(&self, repo: &Path, url: &str) -> ExternalOutcome {
        let argv = ["git", "remote", "add", "origin", url];
        let manual = display_command(Some(repo), None, &argv);
        run_captured(
            Command::new("git").args(&argv[1..]).current_dir(repo),
            manual,
        )
    }

    fn create_private_remote(&self, repo: &Path, name: &str) -> ExternalOutcome {
        let argv = [
            "gh", "repo", "create", name, "--private", "--source", ".", "--push",
        ];
        let manual = display_command(Some(repo), None, &argv);
        if !self.has_tool("gh") {
            return ExternalOutcome::failure("gh is not installed", manual);
        }
        run_captured(Command::new("gh").args(&argv[1..]).current_dir(repo), manual)
    }

    fn thoughts(&self, project_dir: &Path, args: &[&str], host_config: &Path) -> ExternalOutcome {
        let mut argv: Vec<&str> = self.thoughts_cli.iter().map(String::as_str).collect();
        argv.extend_from_slice(args);
        let manual = display_command(
            Some(project_dir),
            Some((THOUGHTS_CONFIG_ENV, host_config)),
            &argv,
        );
        let Some((program, rest)) = argv.split_first() else {
            return ExternalOutcome::failure("no thoughts CLI configured", manual);
        };
        tracing::debug!(command = %manual, "running");
        // The thoughts CLI may ask its own questions, so it gets the terminal.
        let status = Command::new(program)
            .args(rest)
            .current_dir(project_dir)
            .env(THOUGHTS_CONFIG_ENV, host_config)
            .status();
        match status {
            Ok(s) if s.success() => ExternalOutcome::success(),
            Ok(s) => ExternalOutcome::failure(format!("exited with {s}"), manual),
            Err(e) => ExternalOutcome::failure(e.to_string(), manual),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_command_quotes_spaces() {
        let cmd = display_command(
            Some(Path::new("/src/my org/api")),
            Some((THOUGHTS_CONFIG_ENV, Path::new("/cfg/config-acme.json"))),
            &["humanlayer", "thoughts", "sync"],
        );
        assert_eq!(
            cmd,
            "cd '/src/my org/api' && HUMANLAYER_CONFIG=/cfg/config-acme.json humanlayer thoughts sync"
        );
    }

    #[test]
    fn outcome_helpers() {
        assert!(ExternalOutcome::success().is_success());
        assert!(ExternalOutcome::produced("/x").is_success());
        assert!(!ExternalOutcome::failure("boom", "retry").is_success());
    }

    #[test]
    fn missing_binary_is_a_failure_not_a_panic() {
        let tc = SystemToolchain::new(vec!["definitely-not-a-real-binary-xyz".into()]);
        let dir = tempfile::TempDir::new().unwrap();
        let outcome = tc.thoughts(dir.path(), &["sync"], &dir.path().join("cfg.json"));
        match outcome {
            ExternalOutcome::Failure { manual_command, .. } => {
                assert!(manual_command.contains("definitely-not-a-real-binary-xyz sync"));
            }
            other => panic!("expected failure, got {other:?}"),
        }
    }
}
