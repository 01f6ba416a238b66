mod cmd;
mod output;
mod root;
mod terminal;

use anyhow::Context;
use catalyst_core::settings::Settings;
use clap::{Parser, Subcommand};
use cmd::config::ConfigSubcommand;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "catalyst",
    about = "Set up a developer workspace: thoughts repository, worktrees, and layered config",
    version,
    propagate_version = true
)]
struct Cli {
    /// Starting directory (default: current directory)
    #[arg(long, global = true, env = "CATALYST_ROOT")]
    root: Option<PathBuf>,

    /// Directory holding per-machine config files (default: ~/.config)
    #[arg(long, global = true, env = "CATALYST_CONFIG_HOME")]
    config_home: Option<PathBuf>,

    /// Thoughts CLI command, program followed by any leading arguments
    #[arg(long, global = true, env = "CATALYST_THOUGHTS_CLI")]
    thoughts_cli: Option<String>,

    /// Base directory for fresh clones (default: ~/code/github)
    #[arg(long, global = true, env = "GITHUB_SOURCE_ROOT")]
    clone_base: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Provision the workspace for the current project (safe to re-run)
    Setup {
        /// Accept every default without prompting
        #[arg(long, short = 'y')]
        yes: bool,
    },

    /// Check the artifacts setup produces and report pass/fail per item
    Validate {
        /// Project key (default: from the project config, else the org name)
        #[arg(long)]
        project_key: Option<String>,
    },

    /// Check that required and optional tools are installed
    Check,

    /// Inspect the project, host, and secrets config files
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = Settings::resolve(
        cli.config_home.as_deref(),
        cli.thoughts_cli.as_deref(),
        cli.clone_base.as_deref(),
    )
    .context("failed to resolve settings")
    .and_then(|settings| {
        tracing::debug!(config_home = %settings.config_home.display(), "settings resolved");
        let start = root::resolve_start(cli.root.as_deref());
        match cli.command {
            Commands::Setup { yes } => cmd::setup::run(&start, &settings, yes, cli.json),
            Commands::Validate { project_key } => {
                cmd::validate::run(&start, &settings, project_key.as_deref(), cli.json)
            }
            Commands::Check => cmd::check::run(&settings, cli.json),
            Commands::Config { subcommand } => {
                cmd::config::run(&start, &settings, subcommand, cli.json)
            }
        }
    });

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
