//! The `mappings.json` resource

use std::sync::Arc;

use serde_json::Value;

use fmu_fs::FmuPath;

use super::{ChangelogManager, DirContext, ResourceManager};
use crate::models::{Mappings, StratigraphyMappings};
use crate::{Error, Result};

#[derive(Debug)]
pub struct MappingsManager {
    resource: ResourceManager<Mappings>,
    changelog: Arc<ChangelogManager>,
}

impl MappingsManager {
    pub(crate) fn new(ctx: Arc<DirContext>, changelog: Arc<ChangelogManager>) -> Self {
        Self {
            resource: ResourceManager::new(ctx, FmuPath::Mappings, "MappingsManager").with_cache(),
            changelog,
        }
    }

    pub fn resource(&self) -> &ResourceManager<Mappings> {
        &self.resource
    }

    pub fn exists(&self) -> bool {
        self.resource.exists()
    }

    pub fn load(&self) -> Result<Mappings> {
        self.resource.load()
    }

    pub fn stratigraphy_mappings(&self) -> Result<Option<StratigraphyMappings>> {
        Ok(self.load()?.stratigraphy)
    }

    pub fn well_mappings(&self) -> Result<Option<Value>> {
        Ok(self.load()?.wells)
    }

    /// Replace the stratigraphy mappings wholesale.
    ///
    /// Creates the mappings file if it does not exist and logs one `update`
    /// entry for the `stratigraphy` key.
    pub fn update_stratigraphy_mappings(
        &self,
        mappings: StratigraphyMappings,
    ) -> Result<StratigraphyMappings> {
        let mut record = if self.exists() {
            self.load()?
        } else {
            Mappings {
                stratigraphy: Some(StratigraphyMappings::default()),
                wells: None,
            }
        };
        let old = serde_json::to_value(&record)?;
        let new = serde_json::to_value(&mappings)?;

        record.stratigraphy = Some(mappings.clone());
        self.resource.save(&record)?;
        tracing::debug!(count = mappings.len(), "updated stratigraphy mappings");

        self.changelog.log_update_to_changelog(
            &[("stratigraphy".to_string(), new)],
            &old,
            FmuPath::Mappings.file_name(),
        )?;
        Ok(mappings)
    }

    pub fn update_well_mappings(&self) -> Result<()> {
        Err(Error::NotImplemented {
            feature: "well mappings".to_string(),
        })
    }

    /// The incoming mappings record, whole.
    ///
    /// This is a coarse diff: the full incoming record is returned whenever
    /// both files exist, whether or not any sub-collection differs.
    pub fn get_mappings_diff(&self, incoming: &MappingsManager) -> Result<Mappings> {
        if !(self.exists() && incoming.exists()) {
            return Err(Error::ResourceNotInBoth {
                resource: "mappings".to_string(),
                current_exists: self.exists(),
                incoming_exists: incoming.exists(),
            });
        }
        incoming.load()
    }

    pub fn merge_mappings(&self, incoming: &MappingsManager) -> Result<Mappings> {
        let changes = self.get_mappings_diff(incoming)?;
        self.merge_changes(&changes)
    }

    /// Replace each sub-collection present in `changes`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotImplemented`] for a non-null `wells` value before
    /// anything is written.
    pub fn merge_changes(&self, changes: &Mappings) -> Result<Mappings> {
        if changes.wells.is_some() {
            self.update_well_mappings()?;
        }
        if let Some(stratigraphy) = &changes.stratigraphy {
            self.update_stratigraphy_mappings(stratigraphy.clone())?;
        }
        self.load()
    }
}
