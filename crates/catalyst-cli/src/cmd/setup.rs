use crate::cmd::validate::print_report;
use crate::terminal::{DefaultsPrompter, TerminalPrompter};
use anyhow::Context;
use catalyst_core::prompt::Prompter;
use catalyst_core::settings::Settings;
use catalyst_core::toolchain::SystemToolchain;
use catalyst_core::workflow::{self, SetupOutcome, StepContext};
use std::path::Path;

pub fn run(start: &Path, settings: &Settings, yes: bool, json: bool) -> anyhow::Result<()> {
    let toolchain = SystemToolchain::new(settings.thoughts_cli.clone());
    let mut terminal = TerminalPrompter::new(json);
    let mut defaults = DefaultsPrompter::new(json);
    let prompter: &mut dyn Prompter = if yes { &mut defaults } else { &mut terminal };

    let outcome = {
        let mut cx = StepContext::new(settings, &toolchain, prompter);
        workflow::run_setup(start, &mut cx).context("setup aborted")?
    };

    let exit_code = outcome.exit_code();
    match outcome {
        SetupOutcome::Cancelled => {
            if json {
                crate::output::print_json(&serde_json::json!({ "cancelled": true }))?;
            } else {
                println!("Setup cancelled. Nothing was changed.");
            }
            Ok(())
        }
        SetupOutcome::Completed { state, report } => {
            if !json {
                println!("\nValidation:");
            }
            print_report(&report, &state.warnings, json)?;
            if exit_code != 0 {
                anyhow::bail!("validation failed; re-run `catalyst setup` to repair");
            }
            if !json {
                println!("\nWorkspace ready for {}/{}.", state.identity.org, state.identity.repo);
                println!("Thoughts: {}", state.thoughts_repo.display());
            }
            Ok(())
        }
    }
}
