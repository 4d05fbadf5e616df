//! The `config.json` record

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::Document;

/// Lowest number of cache revisions a directory retains.
pub const MIN_CACHE_REVISIONS: u32 = 5;

pub(super) fn default_cache_max_revisions() -> u32 {
    MIN_CACHE_REVISIONS
}

/// A `config.json` record that a [`ConfigManager`](crate::ConfigManager) can
/// load, update and reset.
pub trait ConfigDocument: Document {
    /// Manager name used in error messages.
    const MANAGER: &'static str;

    /// A fresh record created by `user` at `now`.
    fn defaults(user: &str, now: DateTime<Utc>) -> Self;

    /// Cache retention the record asks for.
    fn cache_max_revisions(&self) -> u32;
}

pub(super) fn check_common(version: &str, cache_max_revisions: u32) -> Result<(), String> {
    if version.trim().is_empty() {
        return Err("version must not be empty".to_string());
    }
    if cache_max_revisions < MIN_CACHE_REVISIONS {
        return Err(format!(
            "cache_max_revisions must be at least {MIN_CACHE_REVISIONS}, got {cache_max_revisions}"
        ));
    }
    Ok(())
}

/// Project configuration stored in `.fmu/config.json`.
///
/// Known fields are typed; any other top-level field is kept in `extra` so
/// the record stays open to domain settings this crate does not model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectConfig {
    pub version: String,
    pub created_at: DateTime<Utc>,
    pub created_by: String,
    #[serde(default)]
    pub last_modified_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_modified_by: Option<String>,
    #[serde(default = "default_cache_max_revisions")]
    pub cache_max_revisions: u32,
    #[serde(default)]
    pub masterdata: Option<Value>,
    #[serde(default)]
    pub model: Option<Value>,
    #[serde(default)]
    pub access: Option<Value>,
    #[serde(default)]
    pub rms: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ProjectConfig {
    /// Fields recording who created the resource. Never mergeable.
    pub const PROVENANCE_FIELDS: &'static [&'static str] = &["created_at", "created_by"];

    /// Fields stamped as a side effect of every update.
    pub const MODIFICATION_FIELDS: &'static [&'static str] =
        &["last_modified_at", "last_modified_by"];

    /// A fresh configuration created by `user` at `now`.
    pub fn new(user: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            created_at: now,
            created_by: user.into(),
            last_modified_at: None,
            last_modified_by: None,
            cache_max_revisions: MIN_CACHE_REVISIONS,
            masterdata: None,
            model: None,
            access: None,
            rms: None,
            extra: Map::new(),
        }
    }
}

impl Document for ProjectConfig {
    fn validate(&self) -> std::result::Result<(), String> {
        check_common(&self.version, self.cache_max_revisions)
    }

    fn diff_exempt_fields() -> &'static [&'static str] {
        &[
            "created_at",
            "created_by",
            "last_modified_at",
            "last_modified_by",
        ]
    }
}

impl ConfigDocument for ProjectConfig {
    const MANAGER: &'static str = "ConfigManager";

    fn defaults(user: &str, now: DateTime<Utc>) -> Self {
        Self::new(user, now)
    }

    fn cache_max_revisions(&self) -> u32 {
        self.cache_max_revisions
    }
}
