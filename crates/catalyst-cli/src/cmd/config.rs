use crate::output::print_json;
use crate::root;
use catalyst_core::identity::{self, WorkspaceIdentity};
use catalyst_core::settings::Settings;
use catalyst_core::toolchain::SystemToolchain;
use catalyst_core::{paths, secrets};
use clap::Subcommand;
use serde_json::Value;
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Subcommand types
// ---------------------------------------------------------------------------

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Print the project, host, and secrets config (secrets masked)
    Show {
        /// Project key (default: from the project config, else the org name)
        #[arg(long)]
        project_key: Option<String>,
    },

    /// Print where each config file lives
    Path {
        /// Project key (default: from the project config, else the org name)
        #[arg(long)]
        project_key: Option<String>,
    },
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub fn run(
    start: &Path,
    settings: &Settings,
    subcmd: ConfigSubcommand,
    json: bool,
) -> anyhow::Result<()> {
    match subcmd {
        ConfigSubcommand::Show { project_key } => {
            let id = resolve(start, settings, project_key.as_deref())?;
            show(&id, settings, json)
        }
        ConfigSubcommand::Path { project_key } => {
            let id = resolve(start, settings, project_key.as_deref())?;
            path(&id, settings, json)
        }
    }
}

fn resolve(
    start: &Path,
    settings: &Settings,
    project_key: Option<&str>,
) -> anyhow::Result<WorkspaceIdentity> {
    let project_dir = root::find_project_dir(start);
    let toolchain = SystemToolchain::new(settings.thoughts_cli.clone());
    Ok(identity::resolve_existing(
        &project_dir,
        project_key,
        &toolchain,
    )?)
}

fn config_paths(id: &WorkspaceIdentity, settings: &Settings) -> [(&'static str, PathBuf); 3] {
    [
        ("project", paths::project_config_path(&id.project_dir)),
        (
            "host",
            paths::host_config_path(&settings.config_home, &id.project_key),
        ),
        (
            "secrets",
            paths::secrets_config_path(&settings.config_home, &id.project_key),
        ),
    ]
}

// ---------------------------------------------------------------------------
// path
// ---------------------------------------------------------------------------

fn path(id: &WorkspaceIdentity, settings: &Settings, json: bool) -> anyhow::Result<()> {
    let entries = config_paths(id, settings);
    if json {
        let map: serde_json::Map<String, Value> = entries
            .iter()
            .map(|(name, p)| (name.to_string(), Value::String(p.display().to_string())))
            .collect();
        return print_json(&map);
    }
    for (name, p) in &entries {
        println!("{name:<8} {}", p.display());
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// show
// ---------------------------------------------------------------------------

/// Raw document, or `None` when absent. Unparseable files are reported as a
/// string so the other documents still print.
fn read_document(path: &Path) -> Option<Value> {
    let data = std::fs::read_to_string(path).ok()?;
    Some(
        serde_json::from_str(&data)
            .unwrap_or_else(|e| Value::String(format!("invalid JSON: {e}"))),
    )
}

fn show(id: &WorkspaceIdentity, settings: &Settings, json: bool) -> anyhow::Result<()> {
    let mut docs = serde_json::Map::new();
    for (name, p) in config_paths(id, settings) {
        let doc = read_document(&p).map(|d| {
            if name == "secrets" {
                secrets::masked(&d)
            } else {
                d
            }
        });
        docs.insert(name.to_string(), doc.unwrap_or(Value::Null));
    }

    if json {
        return print_json(&serde_json::json!({
            "projectKey": id.project_key,
            "configs": docs,
        }));
    }

    println!("Project key: {}", id.project_key);
    for (name, p) in config_paths(id, settings) {
        println!("\n{name}: {}", p.display());
        match docs.get(name) {
            Some(Value::Null) | None => println!("  (missing)"),
            Some(doc) => println!("{}", serde_json::to_string_pretty(doc)?),
        }
    }
    Ok(())
}
