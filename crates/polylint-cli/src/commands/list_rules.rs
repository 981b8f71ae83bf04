//! List rules command implementation.

use anyhow::Result;
use polylint_core::{Preset, Rule};

use crate::config_resolver::ConfigSource;

/// Runs the list-rules command.
pub fn run(source: &ConfigSource) -> Result<()> {
    let doc = source.load()?;

    if doc.model.is_empty() {
        println!("No rules configured.");
    } else {
        println!(
            "{:<30} {:<8} {:<24} {:<28} Pattern",
            "Id", "Severity", "Languages", "Kinds"
        );
        println!("{}", "-".repeat(100));
        for rule in doc.model.rules() {
            println!("{}", row(rule));
        }
    }

    println!("\nPresets:");
    for preset in Preset::ALL {
        println!("  {preset}");
    }
    println!("\nEnable one with `preset: <name>` in polylint.yaml.");
    Ok(())
}

fn row(rule: &Rule) -> String {
    let id = if rule.is_enabled() {
        rule.id().to_string()
    } else {
        format!("{} (disabled)", rule.id())
    };
    format!(
        "{id:<30} {:<8} {:<24} {:<28} {}",
        rule.severity().to_string(),
        rule.languages().to_string(),
        rule.kinds().to_string(),
        rule.pattern()
    )
}
