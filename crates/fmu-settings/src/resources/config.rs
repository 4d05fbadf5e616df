//! The `config.json` resource

use std::sync::Arc;

use serde_json::Value;

use fmu_fs::FmuPath;

use super::{ChangelogManager, DirContext, ResourceManager, fields};
use crate::models::{ChangeType, ConfigDocument, ProjectConfig, UserConfig};
use crate::{Error, Result};

/// Reads, updates and merges a configuration record.
///
/// Every update is logged to the changelog before the call returns.
#[derive(Debug)]
pub struct ConfigManager<C = ProjectConfig> {
    resource: ResourceManager<C>,
    changelog: Arc<ChangelogManager>,
}

/// The config manager of a user directory.
pub type UserConfigManager = ConfigManager<UserConfig>;

impl<C: ConfigDocument> ConfigManager<C> {
    pub(crate) fn new(ctx: Arc<DirContext>, changelog: Arc<ChangelogManager>) -> Self {
        Self {
            resource: ResourceManager::new(ctx, FmuPath::Config, C::MANAGER).with_cache(),
            changelog,
        }
    }

    pub fn resource(&self) -> &ResourceManager<C> {
        &self.resource
    }

    pub fn exists(&self) -> bool {
        self.resource.exists()
    }

    pub fn load(&self) -> Result<C> {
        self.resource.load()
    }

    /// Write a whole config without logging it.
    pub fn save(&self, config: &C) -> Result<()> {
        self.resource.save(config)
    }

    /// Value at a dotted key, `None` if any segment is absent.
    pub fn get(&self, key: &str) -> Result<Option<Value>> {
        let config = serde_json::to_value(self.load()?)?;
        Ok(fields::lookup(&config, key).cloned())
    }

    pub fn set(&self, key: &str, value: Value) -> Result<C> {
        self.update(vec![(key.to_string(), value)])
    }

    /// Apply several dotted-key updates in one write.
    ///
    /// Stamps `last_modified_at`/`last_modified_by` and logs one changelog
    /// entry per updated key. The stamp fields themselves are not logged.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ResourceNotFound`] if the config does not exist and
    /// [`Error::Validation`] if the result is not a valid config. The file
    /// on disk is untouched on error.
    pub fn update(&self, updates: Vec<(String, Value)>) -> Result<C> {
        let old = serde_json::to_value(self.load()?)?;
        let validation = |message: String| Error::Validation {
            manager: C::MANAGER.to_string(),
            value: updates_object(&updates).to_string(),
            message,
        };

        let mut new = old.clone();
        for (key, value) in &updates {
            if let Err(message) = fields::assign(&mut new, key, value.clone()) {
                return Err(validation(message));
            }
        }

        let ctx = self.resource.ctx();
        let stamps = [
            ("last_modified_at", serde_json::to_value(ctx.actor.now())?),
            ("last_modified_by", Value::String(ctx.actor.user.clone())),
        ];
        for (key, value) in stamps {
            if let Err(message) = fields::assign(&mut new, key, value) {
                return Err(validation(message));
            }
        }

        let config: C = match serde_json::from_value(new) {
            Ok(config) => config,
            Err(e) => return Err(validation(e.to_string())),
        };
        if let Err(message) = config.validate() {
            return Err(validation(message));
        }

        self.resource.save(&config)?;
        let keys: Vec<&str> = updates.iter().map(|(k, _)| k.as_str()).collect();
        tracing::debug!(?keys, "updated config");

        self.changelog
            .log_update_to_changelog(&updates, &old, FmuPath::Config.file_name())?;
        Ok(config)
    }

    /// Replace the config with defaults for the acting user.
    pub fn reset(&self) -> Result<C> {
        let ctx = self.resource.ctx();
        let config = C::defaults(&ctx.actor.user, ctx.actor.now());
        self.resource.save(&config)?;
        self.changelog.log_change(
            ChangeType::Reset,
            FmuPath::Config.file_name(),
            "config",
            "Reset config to default values",
        )?;
        Ok(config)
    }

    /// Top-level fields of the incoming config that differ from ours.
    ///
    /// Diff-exempt fields are never reported. Pairs are `(key, incoming value)`
    /// in key order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ResourceNotInBoth`] unless both config files exist.
    pub fn get_resource_diff(&self, incoming: &ConfigManager<C>) -> Result<Vec<(String, Value)>> {
        if !(self.exists() && incoming.exists()) {
            return Err(Error::ResourceNotInBoth {
                resource: "config".to_string(),
                current_exists: self.exists(),
                incoming_exists: incoming.exists(),
            });
        }
        let current = serde_json::to_value(self.load()?)?;
        let incoming = serde_json::to_value(incoming.load()?)?;
        let exempt = C::diff_exempt_fields();

        let mut changes = Vec::new();
        if let Value::Object(incoming) = incoming {
            for (key, value) in incoming {
                if exempt.contains(&key.as_str()) {
                    continue;
                }
                if current.get(&key) != Some(&value) {
                    changes.push((key, value));
                }
            }
        }
        Ok(changes)
    }

    /// Set every listed field to its new value.
    pub fn merge_changes(&self, changes: &[(String, Value)]) -> Result<C> {
        self.update(changes.to_vec())
    }

    pub fn merge_config(&self, incoming: &ConfigManager<C>) -> Result<C> {
        let changes = self.get_resource_diff(incoming)?;
        self.merge_changes(&changes)
    }
}

fn updates_object(updates: &[(String, Value)]) -> Value {
    Value::Object(
        updates
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect(),
    )
}
