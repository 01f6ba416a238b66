use crate::output::{print_json, print_table};
use crate::root;
use catalyst_core::identity;
use catalyst_core::settings::Settings;
use catalyst_core::toolchain::SystemToolchain;
use catalyst_core::validate::{self, ValidationReport, ValidationTarget};
use std::path::Path;

pub fn run(
    start: &Path,
    settings: &Settings,
    project_key: Option<&str>,
    json: bool,
) -> anyhow::Result<()> {
    let project_dir = root::find_project_dir(start);
    let toolchain = SystemToolchain::new(settings.thoughts_cli.clone());
    let id = identity::resolve_existing(&project_dir, project_key, &toolchain)?;
    let report = validate::validate(&ValidationTarget::new(&id, settings));

    print_report(&report, &[], json)?;
    if !report.passed() {
        anyhow::bail!("validation failed; run `catalyst setup` to repair");
    }
    Ok(())
}

/// Itemised report, then run warnings. JSON mode prints one object.
pub fn print_report(
    report: &ValidationReport,
    warnings: &[String],
    json: bool,
) -> anyhow::Result<()> {
    if json {
        return print_json(&serde_json::json!({
            "passed": report.passed(),
            "items": report.items,
            "warnings": warnings,
        }));
    }

    let rows = report
        .items
        .iter()
        .map(|item| {
            let status = match (item.passed, item.required) {
                (true, _) => "ok",
                (false, true) => "FAIL",
                (false, false) => "warn",
            };
            vec![item.name.clone(), status.to_string(), item.detail.clone()]
        })
        .collect();
    print_table(&["CHECK", "STATUS", "DETAIL"], rows);

    if !warnings.is_empty() {
        println!();
        for w in warnings {
            println!("[warning] {w}");
        }
    }
    if report.passed() {
        println!("\nAll required checks passed.");
    }
    Ok(())
}
