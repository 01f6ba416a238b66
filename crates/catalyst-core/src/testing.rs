//! In-memory stand-ins for external tools, shared by unit tests.

use crate::toolchain::{ExternalOutcome, Toolchain};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

#[derive(Debug, Default)]
pub struct FakeToolchain {
    pub tools: RefCell<HashSet<String>>,
    pub remotes: RefCell<HashMap<PathBuf, String>>,
    /// Operation names that fail: `git_init`, `clone`, `add_remote`,
    /// `create_remote`, `install`, `thoughts init`, `thoughts sync`.
    pub failing: HashSet<String>,
    /// Tool made available by a successful install.
    pub installs: Option<String>,
    pub calls: RefCell<Vec<String>>,
}

impl FakeToolchain {
    /// All prerequisite tools present.
    pub fn complete() -> Self {
        Self::with_tools(&["git", "humanlayer", "gh"])
    }

    pub fn with_tools(tools: &[&str]) -> Self {
        Self {
            tools: RefCell::new(tools.iter().map(|t| t.to_string()).collect()),
            ..Default::default()
        }
    }

    pub fn failing(mut self, op: &str) -> Self {
        self.failing.insert(op.to_string());
        self
    }

    pub fn with_remote(self, checkout: &Path, url: &str) -> Self {
        self.remotes
            .borrow_mut()
            .insert(checkout.to_path_buf(), url.to_string());
        self
    }

    pub fn called(&self, prefix: &str) -> bool {
        self.calls.borrow().iter().any(|c| c.starts_with(prefix))
    }

    fn record(&self, op: &str) -> Option<ExternalOutcome> {
        self.calls.borrow_mut().push(op.to_string());
        let name = op.split(' ').take(2).collect::<Vec<_>>().join(" ");
        let first = op.split(' ').next().unwrap_or_default();
        if self.failing.contains(&name) || self.failing.contains(first) {
            Some(ExternalOutcome::failure(format!("{op} failed"), format!("retry {op}")))
        } else {
            None
        }
    }
}

impl Toolchain for FakeToolchain {
    fn has_tool(&self, program: &str) -> bool {
        self.tools.borrow().contains(program)
    }

    fn run_install(&self, command: &str) -> ExternalOutcome {
        if let Some(failure) = self.record(&format!("install {command}")) {
            return failure;
        }
        if let Some(tool) = &self.installs {
            self.tools.borrow_mut().insert(tool.clone());
        }
        ExternalOutcome::success()
    }

    fn remote_url(&self, checkout: &Path) -> Option<String> {
        self.remotes.borrow().get(checkout).cloned()
    }

    fn git_init(&self, dir: &Path) -> ExternalOutcome {
        if let Some(failure) = self.record(&format!("git_init {}", dir.display())) {
            return failure;
        }
        std::fs::create_dir_all(dir.join(".git")).unwrap();
        ExternalOutcome::produced(dir.join(".git"))
    }

    fn git_clone(&self, url: &str, dest: &Path) -> ExternalOutcome {
        if let Some(failure) = self.record(&format!("clone {url}")) {
            return failure;
        }
        std::fs::create_dir_all(dest.join(".git")).unwrap();
        self.remotes
            .borrow_mut()
            .insert(dest.to_path_buf(), url.to_string());
        ExternalOutcome::produced(dest)
    }

    fn git_add_remote(&self, repo: &Path, url: &str) -> ExternalOutcome {
        if let Some(failure) = self.record(&format!("add_remote {url}")) {
            return failure;
        }
        self.remotes
            .borrow_mut()
            .insert(repo.to_path_buf(), url.to_string());
        ExternalOutcome::success()
    }

    fn create_private_remote(&self, _repo: &Path, name: &str) -> ExternalOutcome {
        if let Some(failure) = self.record(&format!("create_remote {name}")) {
            return failure;
        }
        ExternalOutcome::success()
    }

    fn thoughts(&self, project_dir: &Path, args: &[&str], host_config: &Path) -> ExternalOutcome {
        let op = format!("thoughts {}", args.join(" "));
        if let Some(failure) = self.record(&op) {
            return failure;
        }
        if args.first() == Some(&"init") {
            let doc: serde_json::Value =
                serde_json::from_str(&std::fs::read_to_string(host_config).unwrap()).unwrap();
            let target = PathBuf::from(doc["thoughts"]["thoughtsRepo"].as_str().unwrap());
            let link = project_dir.join("thoughts");
            std::os::unix::fs::symlink(&target, &link).unwrap();
            return ExternalOutcome::produced(link);
        }
        ExternalOutcome::success()
    }
}
