//! Diff command implementation
//!
//! Previews what sync would merge without writing anything.

use std::path::Path;

use colored::Colorize;

use fmu_settings::{ChangePayload, DirDiff, ResourceChange, ResourceKind};

use super::{display_value, open_current, open_incoming};
use crate::error::Result;

pub fn run_diff(path: &Path, incoming: &Path, json: bool) -> Result<()> {
    let current = open_current(path)?;
    let incoming = open_incoming(incoming)?;
    let diff = current.get_dir_diff(&incoming)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&diff)?);
    } else {
        print_diff(&diff, incoming.path(), current.path())?;
    }
    Ok(())
}

fn print_diff(diff: &DirDiff, from: &Path, into: &Path) -> Result<()> {
    if diff.values().all(Vec::is_empty) {
        println!(
            "{} Nothing to sync. Directories are in step.",
            "OK".green().bold()
        );
        return Ok(());
    }

    println!(
        "{} {} -> {}",
        "Diff".blue().bold(),
        from.display().to_string().yellow(),
        into.display().to_string().yellow()
    );
    for kind in ResourceKind::ALL {
        let Some(changes) = diff.get(&kind) else {
            println!();
            println!("{} {}", kind.as_str().bold(), "(skipped, not in both)".dimmed());
            continue;
        };
        if changes.is_empty() {
            continue;
        }
        println!();
        println!("{}", kind.as_str().bold());
        for change in changes {
            print_change(change)?;
        }
    }

    println!();
    println!("Run {} to apply these changes.", "fmu sync".cyan());
    Ok(())
}

fn print_change(change: &ResourceChange) -> Result<()> {
    match &change.new_value {
        ChangePayload::Value(value) => {
            let rendered = display_value(value)?.replace('\n', "\n      ");
            println!("  {} {}: {}", "~".yellow(), change.key.cyan(), rendered);
        }
        ChangePayload::Changelog(log) => {
            for entry in log {
                println!(
                    "  {} {} {} {}",
                    "+".green(),
                    entry.timestamp.to_rfc3339().dimmed(),
                    entry.user,
                    entry.change
                );
            }
        }
        ChangePayload::Mappings(mappings) => {
            let count = mappings.stratigraphy.as_ref().map_or(0, |s| s.len());
            println!(
                "  {} stratigraphy: {} mapping(s), replacing the current list",
                "~".yellow(),
                count
            );
        }
    }
    Ok(())
}
