//! SyncEngine implementation

use serde_json::Value;

use crate::Result;
use crate::dir::FmuDirectory;
use crate::models::{ChangeInfo, Log, Mappings};

use super::{
    ChangePayload, DirDiff, MergedResource, ResourceChange, ResourceKind, SyncResource, SyncResult,
};

/// Typed per-resource changes. `None` means the resource was skipped
/// because it is missing on one side.
#[derive(Debug, Default)]
struct PendingChanges {
    changelog: Option<Log<ChangeInfo>>,
    config: Option<Vec<(String, Value)>>,
    /// Empty when the incoming record would change nothing
    mappings: Option<Vec<Mappings>>,
}

impl PendingChanges {
    fn into_dir_diff(self) -> DirDiff {
        let mut diff = DirDiff::new();
        if let Some(log) = self.changelog {
            let changes = if log.is_empty() {
                Vec::new()
            } else {
                vec![ResourceChange::new(
                    ResourceKind::Changelog.as_str(),
                    ChangePayload::Changelog(log),
                )]
            };
            diff.insert(ResourceKind::Changelog, changes);
        }
        if let Some(fields) = self.config {
            let changes = fields
                .into_iter()
                .map(|(key, value)| ResourceChange::new(key, ChangePayload::Value(value)))
                .collect();
            diff.insert(ResourceKind::Config, changes);
        }
        if let Some(records) = self.mappings {
            let changes = records
                .into_iter()
                .map(|m| {
                    ResourceChange::new(ResourceKind::Mappings.as_str(), ChangePayload::Mappings(m))
                })
                .collect();
            diff.insert(ResourceKind::Mappings, changes);
        }
        diff
    }
}

/// Diffs and merges an incoming directory into the current one.
///
/// The engine provides two operations:
/// - **diff**: report what a sync would change, writing nothing
/// - **sync**: merge the changelog, then config and mappings, then append
///   one `merge` summary entry
pub struct SyncEngine<'a> {
    current: &'a FmuDirectory,
    incoming: &'a FmuDirectory,
}

impl<'a> SyncEngine<'a> {
    pub fn new(current: &'a FmuDirectory, incoming: &'a FmuDirectory) -> Self {
        Self { current, incoming }
    }

    /// Run one resource's diff, turning a missing resource into a skip.
    fn collect<R: SyncResource>(
        kind: ResourceKind,
        current: &R,
        incoming: &R,
    ) -> Result<Option<R::Changes>> {
        match current.diff(incoming) {
            Ok(changes) => Ok(Some(changes)),
            Err(e) if e.is_missing_resource() => {
                tracing::debug!(resource = %kind, reason = %e, "skipping resource");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Keep only the sub-collections the incoming record sets and that
    /// differ from ours. `None` when nothing would change.
    fn effective_mappings(ours: &Mappings, incoming: Mappings) -> Option<Mappings> {
        let stratigraphy = incoming
            .stratigraphy
            .filter(|strat| ours.stratigraphy.as_ref() != Some(strat));
        let wells = incoming
            .wells
            .filter(|wells| !wells.is_null() && ours.wells.as_ref() != Some(wells));
        if stratigraphy.is_none() && wells.is_none() {
            return None;
        }
        Some(Mappings {
            stratigraphy,
            wells,
        })
    }

    fn pending(&self) -> Result<PendingChanges> {
        let mut pending = PendingChanges::default();
        for kind in ResourceKind::ALL {
            match kind {
                ResourceKind::Changelog => {
                    pending.changelog = Self::collect(
                        kind,
                        self.current.changelog(),
                        self.incoming.changelog(),
                    )?;
                }
                ResourceKind::Config => {
                    pending.config =
                        Self::collect(kind, self.current.config(), self.incoming.config())?;
                }
                ResourceKind::Mappings => {
                    let incoming =
                        Self::collect(kind, self.current.mappings(), self.incoming.mappings())?;
                    pending.mappings = match incoming {
                        Some(record) => {
                            let ours = self.current.mappings().load()?;
                            Some(Self::effective_mappings(&ours, record).into_iter().collect())
                        }
                        None => None,
                    };
                }
            }
        }
        Ok(pending)
    }

    /// Per-resource change lists between the two directories.
    ///
    /// Neither directory is modified.
    pub fn diff(&self) -> Result<DirDiff> {
        Ok(self.pending()?.into_dir_diff())
    }

    /// Merge the incoming directory into the current one.
    ///
    /// # Errors
    ///
    /// A missing resource is skipped, never an error. Validation failures,
    /// lock refusals and non-null well mappings abort the sync; resources
    /// merged before the failure stay merged.
    pub fn sync(&self) -> Result<SyncResult> {
        tracing::info!(
            current = %self.current.path().display(),
            incoming = %self.incoming.path().display(),
            "syncing .fmu directories"
        );
        let pending = self.pending()?;

        let wells_pending = pending
            .mappings
            .iter()
            .flatten()
            .any(|m| m.wells.is_some());
        if wells_pending {
            self.current.mappings().update_well_mappings()?;
        }

        let mut updated = SyncResult::new();
        for kind in ResourceKind::ALL {
            let merged = match kind {
                ResourceKind::Changelog => match &pending.changelog {
                    Some(log) if !log.is_empty() => Some(MergedResource::Changelog(
                        self.current.changelog().merge(log)?,
                    )),
                    _ => None,
                },
                ResourceKind::Config => match &pending.config {
                    Some(fields) if !fields.is_empty() => {
                        Some(MergedResource::Config(self.current.config().merge(fields)?))
                    }
                    _ => None,
                },
                ResourceKind::Mappings => match pending.mappings.as_deref() {
                    Some([record, ..]) => {
                        Some(MergedResource::Mappings(self.current.mappings().merge(record)?))
                    }
                    _ => None,
                },
            };
            if let Some(merged) = merged {
                tracing::debug!(resource = %kind, "merged resource");
                updated.insert(kind, merged);
            }
        }

        self.current.sync_runtime_variables()?;

        if updated.is_empty() {
            tracing::info!("nothing to sync");
            return Ok(updated);
        }

        let names: Vec<&str> = updated.keys().map(ResourceKind::as_str).collect();
        self.current
            .changelog()
            .log_merge_to_changelog(self.incoming.path(), &names)?;
        if updated.contains_key(&ResourceKind::Changelog) {
            updated.insert(
                ResourceKind::Changelog,
                MergedResource::Changelog(self.current.changelog().load()?),
            );
        }

        tracing::info!(resources = ?names, "sync complete");
        Ok(updated)
    }
}
