//! Append-only log resources and the `.fmu` changelog

use std::path::Path;
use std::sync::{Arc, Mutex};

use serde_json::{Map, Value};

use fmu_fs::FmuPath;

use super::{DirContext, ResourceManager, fields};
use crate::models::{
    ChangeInfo, ChangeType, Filter, FilterOperator, FilterType, Log, LogEntry,
};
use crate::{Error, Result};

/// Serialized rows of a loaded log, kept for repeated filtering.
#[derive(Debug)]
struct Projection<T> {
    entries: Vec<T>,
    rows: Vec<Map<String, Value>>,
}

/// Manages a log resource of entries of type `T`.
///
/// Filtering works on a memoized projection of the log. Every append drops
/// the projection, so a filter always sees all appended entries while
/// repeated filters between appends do not re-read the file.
#[derive(Debug)]
pub struct LogManager<T: LogEntry> {
    resource: ResourceManager<Log<T>>,
    projection: Mutex<Option<Arc<Projection<T>>>>,
}

/// The `.fmu/logs/changelog.json` resource.
pub type ChangelogManager = LogManager<ChangeInfo>;

impl<T: LogEntry> LogManager<T> {
    pub(crate) fn new(ctx: Arc<DirContext>, relative: FmuPath, name: &'static str) -> Self {
        Self {
            resource: ResourceManager::new(ctx, relative, name),
            projection: Mutex::new(None),
        }
    }

    pub fn resource(&self) -> &ResourceManager<Log<T>> {
        &self.resource
    }

    pub fn exists(&self) -> bool {
        self.resource.exists()
    }

    pub fn load(&self) -> Result<Log<T>> {
        self.resource.load()
    }

    /// Validate and append one entry, creating the log file if absent.
    pub fn add_log_entry(&self, entry: T) -> Result<()> {
        self.add_log_entries(std::iter::once(entry))
    }

    /// Validate every entry, then append them all in one write.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidLogEntry`] for the first invalid entry; nothing
    /// is appended and no file is created in that case.
    pub fn add_log_entries(&self, entries: impl IntoIterator<Item = T>) -> Result<()> {
        let entries: Vec<T> = entries.into_iter().collect();
        if entries.is_empty() {
            return Ok(());
        }
        for entry in &entries {
            if let Err(message) = entry.validate() {
                return Err(Error::InvalidLogEntry {
                    manager: self.resource.name().to_string(),
                    entry: serde_json::to_string(entry)?,
                    message,
                });
            }
        }

        let mut log = if self.exists() {
            self.load()?
        } else {
            Log::new()
        };
        for entry in entries {
            log.add_entry(entry);
        }
        self.save(&log)
    }

    fn save(&self, log: &Log<T>) -> Result<()> {
        let result = self.resource.save(log);
        self.invalidate();
        result
    }

    fn invalidate(&self) {
        *self.projection.lock().unwrap_or_else(|e| e.into_inner()) = None;
    }

    fn projection(&self) -> Result<Arc<Projection<T>>> {
        let mut slot = self.projection.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(projection) = slot.as_ref() {
            return Ok(Arc::clone(projection));
        }

        let entries = if self.exists() {
            self.load()?.into_entries()
        } else {
            Vec::new()
        };
        let rows = entries
            .iter()
            .map(|entry| -> Result<Map<String, Value>> {
                match serde_json::to_value(entry)? {
                    Value::Object(row) => Ok(row),
                    _ => Ok(Map::new()),
                }
            })
            .collect::<Result<Vec<_>>>()?;
        let projection = Arc::new(Projection { entries, rows });
        *slot = Some(Arc::clone(&projection));
        Ok(projection)
    }

    /// Entries matching `filter`, in log order.
    pub fn filter(&self, filter: &Filter) -> Result<Log<T>> {
        filter.check()?;
        let projection = self.projection()?;
        let mut matched = Log::new();
        for (entry, row) in projection.entries.iter().zip(&projection.rows) {
            if filter.matches(row)? {
                matched.add_entry(entry.clone());
            }
        }
        Ok(matched)
    }

    /// Entries whose `field_name` compares to `value` under `operator`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedFilter`] for `<=`/`>=` on a string field,
    /// for a value that does not parse as `filter_type`, and for a field the
    /// entries do not have.
    pub fn filter_log(
        &self,
        field_name: &str,
        operator: FilterOperator,
        value: &str,
        filter_type: FilterType,
    ) -> Result<Log<T>> {
        let filter = Filter::new(field_name, operator, value, filter_type)?;
        self.filter(&filter)
    }
}

impl LogManager<ChangeInfo> {
    pub(crate) fn changelog(ctx: Arc<DirContext>) -> Self {
        Self::new(ctx, FmuPath::Changelog, "ChangelogManager")
    }

    fn ctx(&self) -> &DirContext {
        self.resource.ctx()
    }

    /// Record one entry per updated key.
    ///
    /// `old_resource` is the document before the update; a key absent from
    /// it is logged as `add`, any other as `update`.
    pub fn log_update_to_changelog(
        &self,
        updates: &[(String, Value)],
        old_resource: &Value,
        file: &str,
    ) -> Result<()> {
        let ctx = self.ctx();
        let entries = updates.iter().map(|(key, new)| {
            let (change_type, change) = match fields::lookup(old_resource, key) {
                None => (
                    ChangeType::Add,
                    format!("Added field '{key}'. New value: {}", fields::render(new)),
                ),
                Some(old) => (
                    ChangeType::Update,
                    format!(
                        "Updated field '{key}'. Old value: {} -> New value: {}",
                        fields::render(old),
                        fields::render(new)
                    ),
                ),
            };
            ChangeInfo::record(
                &ctx.actor,
                change_type,
                ctx.fmu_path.to_native(),
                file,
                key.as_str(),
                change,
            )
        });
        self.add_log_entries(entries.collect::<Vec<_>>())
    }

    /// Record a single entry describing a whole-resource change.
    pub(crate) fn log_change(
        &self,
        change_type: ChangeType,
        file: &str,
        key: &str,
        change: impl Into<String>,
    ) -> Result<()> {
        let ctx = self.ctx();
        self.add_log_entry(ChangeInfo::record(
            &ctx.actor,
            change_type,
            ctx.fmu_path.to_native(),
            file,
            key,
            change,
        ))
    }

    /// Incoming entries newer than this changelog's last entry.
    ///
    /// An empty local changelog has no cursor, so every incoming entry is
    /// returned. Entries sharing the cursor's timestamp are excluded.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ResourceNotInBoth`] unless both changelog files exist.
    pub fn get_changelog_diff(&self, incoming: &ChangelogManager) -> Result<Log<ChangeInfo>> {
        if !(self.exists() && incoming.exists()) {
            return Err(Error::ResourceNotInBoth {
                resource: "changelog".to_string(),
                current_exists: self.exists(),
                incoming_exists: incoming.exists(),
            });
        }
        let cursor = self.load()?.latest_timestamp();
        Ok(incoming.load()?.entries_after(cursor))
    }

    /// Append the incoming entries newer than our last entry.
    pub fn merge_changelog(&self, incoming: &ChangelogManager) -> Result<Log<ChangeInfo>> {
        let changes = self.get_changelog_diff(incoming)?;
        self.merge_changes(&changes)
    }

    /// Append `changes` in order and return the merged changelog.
    pub fn merge_changes(&self, changes: &Log<ChangeInfo>) -> Result<Log<ChangeInfo>> {
        self.add_log_entries(changes.iter().cloned())?;
        self.load()
    }

    /// Append the summary entry written at the end of a directory sync.
    pub fn log_merge_to_changelog(&self, incoming_fmu_path: &Path, resources: &[&str]) -> Result<()> {
        let current = self.ctx().fmu_path.to_native();
        let change = format!(
            "Merged resources [{}] from '{}' into '{}'",
            resources
                .iter()
                .map(|r| format!("'{r}'"))
                .collect::<Vec<_>>()
                .join(", "),
            incoming_fmu_path.display(),
            current.display()
        );
        self.log_change(
            ChangeType::Merge,
            &resources.join(", "),
            FmuPath::FmuDir.as_str(),
            change,
        )
    }
}
