//! Change records written to the changelog

use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::log::LogEntry;
use crate::actor::Actor;

/// The kind of change a record describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeType {
    Add,
    Update,
    Remove,
    Reset,
    /// Summary entry written at the end of a directory sync
    Merge,
}

impl ChangeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Update => "update",
            Self::Remove => "remove",
            Self::Reset => "reset",
            Self::Merge => "merge",
        }
    }
}

impl fmt::Display for ChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry in the changelog.
///
/// Entries are appended and never rewritten, so insertion order is the
/// chronological order of local operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeInfo {
    pub timestamp: DateTime<Utc>,
    pub change_type: ChangeType,
    pub user: String,
    /// The `.fmu` directory the change was made in
    pub path: PathBuf,
    /// Human-readable description
    pub change: String,
    pub hostname: String,
    /// Resource file name the change pertains to
    pub file: String,
    /// Field key affected
    pub key: String,
}

impl ChangeInfo {
    /// Build a record stamped with the actor's identity and current time.
    pub fn record(
        actor: &Actor,
        change_type: ChangeType,
        path: impl Into<PathBuf>,
        file: impl Into<String>,
        key: impl Into<String>,
        change: impl Into<String>,
    ) -> Self {
        Self {
            timestamp: actor.now(),
            change_type,
            user: actor.user.clone(),
            path: path.into(),
            change: change.into(),
            hostname: actor.hostname.clone(),
            file: file.into(),
            key: key.into(),
        }
    }
}

impl LogEntry for ChangeInfo {
    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    fn validate(&self) -> std::result::Result<(), String> {
        let required = [
            ("user", &self.user),
            ("hostname", &self.hostname),
            ("file", &self.file),
            ("key", &self.key),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(format!("field '{name}' must not be empty"));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entry() -> ChangeInfo {
        ChangeInfo {
            timestamp: "2025-03-01T10:00:00+01:00".parse().unwrap(),
            change_type: ChangeType::Add,
            user: "test".into(),
            path: PathBuf::from("/test_folder"),
            change: "Added new field to smda masterdata.".into(),
            hostname: "hostname".into(),
            file: "config.json".into(),
            key: "masterdata".into(),
        }
    }

    #[test]
    fn serializes_with_documented_shape() {
        let value = serde_json::to_value(entry()).unwrap();
        assert_eq!(value["change_type"], json!("add"));
        assert_eq!(value["timestamp"], json!("2025-03-01T09:00:00Z"));
        assert_eq!(value["file"], json!("config.json"));
        assert_eq!(value["path"], json!("/test_folder"));
    }

    #[test]
    fn rejects_naive_timestamps() {
        let mut value = serde_json::to_value(entry()).unwrap();
        value["timestamp"] = json!("2025-03-01T10:00:00");
        assert!(serde_json::from_value::<ChangeInfo>(value).is_err());
    }

    #[test]
    fn rejects_unknown_change_type() {
        let mut value = serde_json::to_value(entry()).unwrap();
        value["change_type"] = json!("invalid change_type");
        assert!(serde_json::from_value::<ChangeInfo>(value).is_err());
    }

    #[test]
    fn validate_requires_key() {
        let mut e = entry();
        e.key = String::new();
        assert!(e.validate().unwrap_err().contains("key"));
    }
}
