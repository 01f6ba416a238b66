//! Prerequisite checker: which external tools are present, and what to do
//! about the missing ones.

use crate::error::{CatalystError, Result};
use crate::prompt::Prompter;
use crate::settings::Settings;
use crate::toolchain::{ExternalOutcome, Toolchain};
use serde::Serialize;

#[derive(Debug, Clone)]
pub struct ToolRequirement {
    pub program: String,
    pub critical: bool,
    pub purpose: &'static str,
    /// Shell command offered to the operator when the tool is missing.
    pub install: Option<&'static str>,
    /// Shown when there is no install command, or it was declined.
    pub hint: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct ToolStatus {
    pub program: String,
    pub critical: bool,
    pub present: bool,
    pub purpose: String,
    pub hint: String,
}

pub fn requirements(settings: &Settings) -> Vec<ToolRequirement> {
    vec![
        ToolRequirement {
            program: "git".to_string(),
            critical: true,
            purpose: "version control for the project and thoughts repositories",
            install: None,
            hint: "install git with your platform package manager",
        },
        ToolRequirement {
            program: settings.thoughts_program().to_string(),
            critical: true,
            purpose: "links the thoughts repository and builds its search index",
            install: Some("npm install -g humanlayer"),
            hint: "npm install -g humanlayer",
        },
        ToolRequirement {
            program: "gh".to_string(),
            critical: false,
            purpose: "creates a private remote for the thoughts repository",
            install: None,
            hint: "see https://cli.github.com",
        },
    ]
}

/// Check every requirement without prompting.
pub fn survey(toolchain: &dyn Toolchain, settings: &Settings) -> Vec<ToolStatus> {
    requirements(settings)
        .into_iter()
        .map(|req| ToolStatus {
            present: toolchain.has_tool(&req.program),
            program: req.program,
            critical: req.critical,
            purpose: req.purpose.to_string(),
            hint: req.hint.to_string(),
        })
        .collect()
}

/// Verify prerequisites, offering installs for missing critical tools.
///
/// Returns warnings for missing optional tools. A critical tool that is
/// still missing after the install offer aborts the run.
pub fn ensure_prerequisites(
    toolchain: &dyn Toolchain,
    settings: &Settings,
    prompter: &mut dyn Prompter,
) -> Result<Vec<String>> {
    let mut warnings = Vec::new();
    for req in requirements(settings) {
        if toolchain.has_tool(&req.program) {
            tracing::debug!(tool = %req.program, "present");
            continue;
        }
        if !req.critical {
            prompter.say(&format!("  missing: {} (optional, {})", req.program, req.hint));
            warnings.push(format!(
                "optional tool '{}' not installed ({})",
                req.program, req.hint
            ));
            continue;
        }

        prompter.say(&format!("  missing: {} ({})", req.program, req.purpose));
        if let Some(install) = req.install {
            if prompter.confirm(&format!("Install {} now with `{install}`?", req.program), true)? {
                match toolchain.run_install(install) {
                    ExternalOutcome::Success { .. } => {}
                    ExternalOutcome::Failure { reason, .. } => {
                        prompter.say(&format!("  install failed: {reason}"));
                    }
                }
            }
        }
        if !toolchain.has_tool(&req.program) {
            return Err(CatalystError::MissingTool {
                tool: req.program,
                hint: req.hint.to_string(),
            });
        }
        prompter.say(&format!("  installed: {}", req.program));
    }
    Ok(warnings)
}
