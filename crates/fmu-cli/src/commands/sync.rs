//! Sync command implementation

use std::path::Path;

use colored::Colorize;

use super::{open_current, open_incoming};
use crate::error::Result;

/// Merge `incoming` into the `.fmu` directory at or above `path`.
pub fn run_sync(path: &Path, incoming: &Path, json: bool) -> Result<()> {
    let current = open_current(path)?;
    let incoming = open_incoming(incoming)?;
    let result = current.sync_dir(&incoming)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    if result.is_empty() {
        println!("{} Already in sync, nothing merged.", "OK".green().bold());
        return Ok(());
    }
    let names: Vec<&str> = result.keys().map(|k| k.as_str()).collect();
    println!(
        "{} Merged {} from {}",
        "OK".green().bold(),
        names.join(", ").cyan(),
        incoming.path().display().to_string().yellow()
    );
    Ok(())
}
