//! Log command implementation

use std::path::Path;

use colored::Colorize;

use fmu_settings::{ChangeInfo, FilterOperator, FilterType, Log};

use super::open_current;
use crate::error::Result;

/// A single-field filter as given on the command line.
#[derive(Debug, Clone)]
pub struct LogFilter {
    pub field: String,
    pub op: String,
    pub value: String,
    pub filter_type: String,
}

/// Print the changelog, or the entries matching `filter`.
pub fn run_log(path: &Path, filter: Option<LogFilter>, json: bool) -> Result<()> {
    let dir = open_current(path)?;
    if !dir.changelog().exists() {
        if json {
            println!("[]");
        } else {
            println!("{}", "No changes recorded yet.".dimmed());
        }
        return Ok(());
    }

    let log = match filter {
        Some(filter) => {
            let op: FilterOperator = filter.op.parse()?;
            let filter_type: FilterType = filter.filter_type.parse()?;
            dir.changelog()
                .filter_log(&filter.field, op, &filter.value, filter_type)?
        }
        None => dir.changelog().load()?,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&log)?);
    } else {
        print_log(&log);
    }
    Ok(())
}

fn print_log(log: &Log<ChangeInfo>) {
    if log.is_empty() {
        println!("{}", "No matching entries.".dimmed());
        return;
    }
    for entry in log {
        println!(
            "{} {} {}@{} {}:{}",
            entry.timestamp.to_rfc3339().dimmed(),
            format!("{:<6}", entry.change_type.as_str()).cyan(),
            entry.user,
            entry.hostname,
            entry.file,
            entry.key.bold()
        );
        println!("    {}", entry.change);
    }
}
