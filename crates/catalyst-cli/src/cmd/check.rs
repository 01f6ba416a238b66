use crate::output::{print_json, print_table};
use catalyst_core::prereq;
use catalyst_core::settings::Settings;
use catalyst_core::toolchain::SystemToolchain;

pub fn run(settings: &Settings, json: bool) -> anyhow::Result<()> {
    let toolchain = SystemToolchain::new(settings.thoughts_cli.clone());
    let statuses = prereq::survey(&toolchain, settings);

    if json {
        print_json(&statuses)?;
    } else {
        let rows = statuses
            .iter()
            .map(|s| {
                vec![
                    s.program.clone(),
                    if s.critical { "required" } else { "optional" }.to_string(),
                    if s.present { "found" } else { "missing" }.to_string(),
                    if s.present {
                        s.purpose.clone()
                    } else {
                        s.hint.clone()
                    },
                ]
            })
            .collect();
        print_table(&["TOOL", "KIND", "STATUS", "NOTES"], rows);
    }

    let missing: Vec<&str> = statuses
        .iter()
        .filter(|s| s.critical && !s.present)
        .map(|s| s.program.as_str())
        .collect();
    if !missing.is_empty() {
        anyhow::bail!("missing required tools: {}", missing.join(", "));
    }
    Ok(())
}
