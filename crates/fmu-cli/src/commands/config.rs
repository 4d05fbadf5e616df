//! Config command implementation

use std::path::Path;

use colored::Colorize;
use fmu_settings::{FmuDirectory, UserFmuDirectory};
use serde_json::Value;

use super::{display_value, open_current, open_user};
use crate::cli::ConfigAction;
use crate::error::{CliError, Result};

/// Dotted-key config access shared by project and user directories.
trait ConfigTarget {
    fn get_value(&self, key: &str) -> fmu_settings::Result<Option<Value>>;
    fn set_value(&self, key: &str, value: Value) -> fmu_settings::Result<()>;
}

impl ConfigTarget for FmuDirectory {
    fn get_value(&self, key: &str) -> fmu_settings::Result<Option<Value>> {
        self.get_config_value(key)
    }

    fn set_value(&self, key: &str, value: Value) -> fmu_settings::Result<()> {
        self.set_config_value(key, value)
    }
}

impl ConfigTarget for UserFmuDirectory {
    fn get_value(&self, key: &str) -> fmu_settings::Result<Option<Value>> {
        self.get_config_value(key)
    }

    fn set_value(&self, key: &str, value: Value) -> fmu_settings::Result<()> {
        self.set_config_value(key, value)
    }
}

pub fn run_config(path: &Path, action: ConfigAction, user: bool) -> Result<()> {
    if user {
        apply(&open_user()?, action)
    } else {
        apply(&open_current(path)?, action)
    }
}

fn apply(dir: &impl ConfigTarget, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Get { key } => {
            let value = dir
                .get_value(&key)?
                .ok_or_else(|| CliError::user(format!("No config value at '{key}'")))?;
            println!("{}", display_value(&value)?);
        }
        ConfigAction::Set { key, value } => {
            let value = parse_value(&value);
            dir.set_value(&key, value)?;
            println!("{} Set {}", "OK".green().bold(), key.cyan());
        }
    }
    Ok(())
}

/// JSON if it parses, otherwise the raw text as a string.
fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}
