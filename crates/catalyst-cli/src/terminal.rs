//! Prompters that talk to a real terminal.

use catalyst_core::prompt::Prompter;
use catalyst_core::{CatalystError, Result};
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input, Select};

fn prompt_error(e: dialoguer::Error) -> CatalystError {
    CatalystError::Prompt(e.to_string())
}

/// Informational lines go to stdout, or to stderr when stdout carries JSON.
fn emit(to_stderr: bool, message: &str) {
    if to_stderr {
        eprintln!("{message}");
    } else {
        println!("{message}");
    }
}

/// Interactive prompts via dialoguer.
pub struct TerminalPrompter {
    theme: ColorfulTheme,
    to_stderr: bool,
}

impl TerminalPrompter {
    pub fn new(to_stderr: bool) -> Self {
        Self {
            theme: ColorfulTheme::default(),
            to_stderr,
        }
    }
}

impl Prompter for TerminalPrompter {
    fn confirm(&mut self, question: &str, default: bool) -> Result<bool> {
        Confirm::with_theme(&self.theme)
            .with_prompt(question)
            .default(default)
            .interact()
            .map_err(prompt_error)
    }

    fn input(&mut self, question: &str, default: Option<&str>) -> Result<String> {
        let mut input = Input::<String>::with_theme(&self.theme)
            .with_prompt(question)
            .allow_empty(true);
        if let Some(d) = default {
            input = input.default(d.to_string());
        }
        input
            .interact_text()
            .map(|s| s.trim().to_string())
            .map_err(prompt_error)
    }

    fn select(&mut self, question: &str, options: &[&str], default: usize) -> Result<usize> {
        Select::with_theme(&self.theme)
            .with_prompt(question)
            .items(options)
            .default(default)
            .interact()
            .map_err(prompt_error)
    }

    fn say(&mut self, message: &str) {
        emit(self.to_stderr, message);
    }
}

/// Non-interactive: every question takes its default, echoed for the log.
/// Questions without a default are an error.
pub struct DefaultsPrompter {
    to_stderr: bool,
}

impl DefaultsPrompter {
    pub fn new(to_stderr: bool) -> Self {
        Self { to_stderr }
    }
}

impl Prompter for DefaultsPrompter {
    fn confirm(&mut self, question: &str, default: bool) -> Result<bool> {
        let answer = if default { "yes" } else { "no" };
        emit(self.to_stderr, &format!("? {question} {answer}"));
        Ok(default)
    }

    fn input(&mut self, question: &str, default: Option<&str>) -> Result<String> {
        let answer = default.ok_or_else(|| {
            CatalystError::Prompt(format!("'{question}' has no default; run without --yes"))
        })?;
        emit(self.to_stderr, &format!("? {question} {answer}"));
        Ok(answer.to_string())
    }

    fn select(&mut self, question: &str, options: &[&str], default: usize) -> Result<usize> {
        let answer = options.get(default).copied().unwrap_or_default();
        emit(self.to_stderr, &format!("? {question} {answer}"));
        Ok(default)
    }

    fn say(&mut self, message: &str) {
        emit(self.to_stderr, message);
    }
}
