//! Init command implementation

use std::path::Path;

use colored::Colorize;
use fmu_settings::{Actor, Error, FmuDirectory, UserFmuDirectory};

use crate::error::{CliError, Result};

/// Create `.fmu` directly under `path`, or in `$HOME` when `user` is set.
pub fn run_init(path: &Path, user: bool) -> Result<()> {
    let created = if user {
        UserFmuDirectory::init(Actor::from_env()).map(|dir| dir.path().to_path_buf())
    } else {
        FmuDirectory::init(path, Actor::from_env()).map(|dir| dir.path().to_path_buf())
    };
    let created = created.map_err(|e| match e {
        Error::AlreadyExists { path } => {
            CliError::user(format!(".fmu directory already exists at {}", path.display()))
        }
        other => other.into(),
    })?;

    println!(
        "{} .fmu directory initialized at {}",
        "OK".green().bold(),
        created.display().to_string().yellow()
    );
    Ok(())
}
