use serde_json::Value;

use crate::Result;
use crate::models::{ChangeInfo, Log, Mappings, ProjectConfig};
use crate::resources::{ChangelogManager, ConfigManager, MappingsManager};

/// A resource that can be diffed against its counterpart in another
/// directory and have the result merged back in.
pub trait SyncResource {
    /// What a diff produces and a merge consumes.
    type Changes;
    /// The resource state after a merge.
    type Merged;

    /// Changes needed to bring `self` in line with `incoming`.
    ///
    /// Fails with a missing-resource error when either side's file is absent.
    fn diff(&self, incoming: &Self) -> Result<Self::Changes>;

    /// Apply `changes` and return the merged state.
    fn merge(&self, changes: &Self::Changes) -> Result<Self::Merged>;
}

impl SyncResource for ChangelogManager {
    type Changes = Log<ChangeInfo>;
    type Merged = Log<ChangeInfo>;

    fn diff(&self, incoming: &Self) -> Result<Self::Changes> {
        self.get_changelog_diff(incoming)
    }

    fn merge(&self, changes: &Self::Changes) -> Result<Self::Merged> {
        self.merge_changes(changes)
    }
}

impl SyncResource for ConfigManager {
    type Changes = Vec<(String, Value)>;
    type Merged = ProjectConfig;

    fn diff(&self, incoming: &Self) -> Result<Self::Changes> {
        self.get_resource_diff(incoming)
    }

    fn merge(&self, changes: &Self::Changes) -> Result<Self::Merged> {
        self.merge_changes(changes)
    }
}

impl SyncResource for MappingsManager {
    type Changes = Mappings;
    type Merged = Mappings;

    fn diff(&self, incoming: &Self) -> Result<Self::Changes> {
        self.get_mappings_diff(incoming)
    }

    fn merge(&self, changes: &Self::Changes) -> Result<Self::Merged> {
        self.merge_changes(changes)
    }
}
