//! The per-user `config.json` record

use std::collections::HashSet;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::Document;
use super::config::{ConfigDocument, MIN_CACHE_REVISIONS, check_common, default_cache_max_revisions};

/// Longest list of recently opened projects a user config keeps.
pub const MAX_RECENT_PROJECT_DIRECTORIES: usize = 5;

/// Credentials for external services, keyed by service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserApiKeys {
    #[serde(default)]
    pub smda_subscription: Option<String>,
}

/// User configuration stored in `$HOME/.fmu/config.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserConfig {
    pub version: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub last_modified_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_modified_by: Option<String>,
    #[serde(default = "default_cache_max_revisions")]
    pub cache_max_revisions: u32,
    #[serde(default)]
    pub user_api_keys: UserApiKeys,
    /// Most recent first
    #[serde(default)]
    pub recent_project_directories: Vec<PathBuf>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UserConfig {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            created_at: now,
            last_modified_at: None,
            last_modified_by: None,
            cache_max_revisions: MIN_CACHE_REVISIONS,
            user_api_keys: UserApiKeys::default(),
            recent_project_directories: Vec::new(),
            extra: Map::new(),
        }
    }

    /// The recent-project list with `path` moved to the front.
    ///
    /// Duplicates are dropped and the list is cut to
    /// [`MAX_RECENT_PROJECT_DIRECTORIES`].
    pub fn with_recent_project(&self, path: PathBuf) -> Vec<PathBuf> {
        let mut recent = vec![path];
        for existing in &self.recent_project_directories {
            if !recent.contains(existing) {
                recent.push(existing.clone());
            }
        }
        recent.truncate(MAX_RECENT_PROJECT_DIRECTORIES);
        recent
    }
}

impl Document for UserConfig {
    fn validate(&self) -> std::result::Result<(), String> {
        check_common(&self.version, self.cache_max_revisions)?;
        if self.recent_project_directories.len() > MAX_RECENT_PROJECT_DIRECTORIES {
            return Err(format!(
                "recent_project_directories holds at most {MAX_RECENT_PROJECT_DIRECTORIES} entries"
            ));
        }
        let mut seen = HashSet::new();
        for dir in &self.recent_project_directories {
            if !seen.insert(dir) {
                return Err(format!(
                    "duplicate recent project directory '{}'",
                    dir.display()
                ));
            }
        }
        Ok(())
    }

    fn diff_exempt_fields() -> &'static [&'static str] {
        &["created_at", "last_modified_at", "last_modified_by"]
    }
}

impl ConfigDocument for UserConfig {
    const MANAGER: &'static str = "UserConfigManager";

    fn defaults(_user: &str, now: DateTime<Utc>) -> Self {
        Self::new(now)
    }

    fn cache_max_revisions(&self) -> u32 {
        self.cache_max_revisions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn config() -> UserConfig {
        UserConfig::new(Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap())
    }

    #[test]
    fn missing_optional_sections_use_defaults() {
        let parsed: UserConfig = serde_json::from_value(serde_json::json!({
            "version": "0.1.0",
            "created_at": "2025-01-01T00:00:00Z"
        }))
        .unwrap();
        assert_eq!(parsed.cache_max_revisions, MIN_CACHE_REVISIONS);
        assert_eq!(parsed.user_api_keys, UserApiKeys::default());
        assert!(parsed.recent_project_directories.is_empty());
    }

    #[test]
    fn recent_projects_move_to_front_and_are_capped() {
        let mut c = config();
        for i in 0..MAX_RECENT_PROJECT_DIRECTORIES {
            c.recent_project_directories = c.with_recent_project(PathBuf::from(format!("/p{i}")));
        }
        let recent = c.with_recent_project(PathBuf::from("/p1"));
        assert_eq!(recent.len(), MAX_RECENT_PROJECT_DIRECTORIES);
        assert_eq!(recent[0], PathBuf::from("/p1"));
        assert_eq!(recent.iter().filter(|p| p.ends_with("p1")).count(), 1);

        let recent = c.with_recent_project(PathBuf::from("/new"));
        assert_eq!(recent.len(), MAX_RECENT_PROJECT_DIRECTORIES);
        assert!(!recent.contains(&PathBuf::from("/p0")));
    }

    #[test]
    fn validate_rejects_duplicate_recent_projects() {
        let mut c = config();
        c.recent_project_directories = vec![PathBuf::from("/a"), PathBuf::from("/a")];
        assert!(c.validate().unwrap_err().contains("duplicate"));
    }
}
