//! Command implementations for fmu-cli

pub mod config;
pub mod diff;
pub mod init;
pub mod lock;
pub mod log;
pub mod sync;

pub use config::run_config;
pub use diff::run_diff;
pub use init::run_init;
pub use lock::run_lock;
pub use log::{LogFilter, run_log};
pub use sync::run_sync;

use std::path::{Path, PathBuf};

use fmu_fs::FmuPath;
use fmu_settings::{Actor, FmuDirectory, UserFmuDirectory};

use crate::error::{CliError, Result};

/// Open the nearest `.fmu` directory at or above `path`.
pub(crate) fn open_current(path: &Path) -> Result<FmuDirectory> {
    FmuDirectory::find_nearest(path, Actor::from_env()).map_err(|e| match e {
        fmu_settings::Error::DirectoryNotFound { .. } => CliError::user(format!(
            "No .fmu directory found at or above {}. Run 'fmu init' first.",
            path.display()
        )),
        other => other.into(),
    })
}

/// Open `$HOME/.fmu`.
pub(crate) fn open_user() -> Result<UserFmuDirectory> {
    UserFmuDirectory::open(Actor::from_env()).map_err(|e| match e {
        fmu_settings::Error::DirectoryNotFound { path } => CliError::user(format!(
            "No user .fmu directory found in {}. Run 'fmu init --user' first.",
            path.display()
        )),
        other => other.into(),
    })
}

/// Open the incoming side of a diff or sync.
///
/// Accepts either the project directory or the `.fmu` directory itself.
pub(crate) fn open_incoming(path: &Path) -> Result<FmuDirectory> {
    FmuDirectory::open(project_root(path), Actor::from_env()).map_err(Into::into)
}

fn project_root(path: &Path) -> PathBuf {
    let is_fmu_dir = path
        .file_name()
        .is_some_and(|name| name == FmuPath::FmuDir.as_str());
    match path.parent() {
        Some(parent) if is_fmu_dir => parent.to_path_buf(),
        _ => path.to_path_buf(),
    }
}

/// Strings bare, everything else as indented JSON.
pub(crate) fn display_value(value: &serde_json::Value) -> Result<String> {
    match value {
        serde_json::Value::String(s) => Ok(s.clone()),
        other => Ok(serde_json::to_string_pretty(other)?),
    }
}
