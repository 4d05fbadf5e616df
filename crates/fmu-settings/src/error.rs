//! Error types for fmu-settings

use std::path::PathBuf;

/// Result type for fmu-settings operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in fmu-settings operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A resource file was required but does not exist
    #[error("Resource file for '{resource}' not found at {path}")]
    ResourceNotFound { resource: String, path: PathBuf },

    /// A diff needs the resource on both sides
    #[error(
        "{resource} resources to diff must exist in both directories: \
         Current {resource} resource exists: {current_exists}. \
         Incoming {resource} resource exists: {incoming_exists}."
    )]
    ResourceNotInBoth {
        resource: String,
        current_exists: bool,
        incoming_exists: bool,
    },

    /// An update produced a document that does not validate
    #[error("Invalid value set for '{manager}' with updates '{value}': {message}")]
    Validation {
        manager: String,
        value: String,
        message: String,
    },

    /// A log entry failed validation and was not appended
    #[error("Invalid log entry added to '{manager}' with value '{entry}': {message}")]
    InvalidLogEntry {
        manager: String,
        entry: String,
        message: String,
    },

    /// Another process holds the write lock
    #[error("Cannot write to .fmu directory because it is locked by {owner} ({path})")]
    LockHeld { path: PathBuf, owner: String },

    /// A changelog filter that cannot be evaluated
    #[error("Unsupported filter: {message}")]
    UnsupportedFilter { message: String },

    /// Functionality that exists in the data model but cannot be merged yet
    #[error("Not implemented: {feature}")]
    NotImplemented { feature: String },

    #[error("No .fmu directory found at {path}")]
    DirectoryNotFound { path: PathBuf },

    #[error(".fmu exists at {path} but is not a directory")]
    NotADirectory { path: PathBuf },

    #[error(".fmu directory already exists at {path}")]
    AlreadyExists { path: PathBuf },

    #[error("Could not determine the home directory of the current user")]
    HomeNotFound,

    /// Filesystem error from fmu-fs
    #[error(transparent)]
    Fs(#[from] fmu_fs::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// True for the "resource file absent" class of errors.
    ///
    /// The aggregate diff and sync treat these as "nothing to sync" for the
    /// resource instead of failing.
    pub fn is_missing_resource(&self) -> bool {
        matches!(
            self,
            Self::ResourceNotFound { .. } | Self::ResourceNotInBoth { .. }
        )
    }

    /// True when the error is a write-lock refusal.
    pub fn is_permission_denied(&self) -> bool {
        matches!(self, Self::LockHeld { .. })
    }

    pub(crate) fn unsupported_filter(message: impl Into<String>) -> Self {
        Self::UnsupportedFilter {
            message: message.into(),
        }
    }
}
