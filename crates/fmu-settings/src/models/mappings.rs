//! The `mappings.json` record

use std::collections::HashSet;
use std::ops::Index;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::Document;

/// Systems an identifier can come from or map to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSystem {
    Rms,
    Smda,
    Openworks,
    Fmu,
}

/// What a mapping between two identifiers means.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationType {
    Primary,
    Alias,
    Equivalent,
}

/// Maps a stratigraphic identifier in one system to one in another.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StratigraphyIdentifierMapping {
    pub source_system: DataSystem,
    pub target_system: DataSystem,
    pub relation_type: RelationType,
    pub source_id: String,
    pub target_id: String,
}

impl StratigraphyIdentifierMapping {
    /// An RMS to SMDA mapping, the common case.
    pub fn rms_to_smda(
        relation_type: RelationType,
        source_id: impl Into<String>,
        target_id: impl Into<String>,
    ) -> Self {
        Self {
            source_system: DataSystem::Rms,
            target_system: DataSystem::Smda,
            relation_type,
            source_id: source_id.into(),
            target_id: target_id.into(),
        }
    }
}

/// Ordered set of stratigraphy mappings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StratigraphyMappings(Vec<StratigraphyIdentifierMapping>);

impl StratigraphyMappings {
    pub fn new(mappings: Vec<StratigraphyIdentifierMapping>) -> Self {
        Self(mappings)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, StratigraphyIdentifierMapping> {
        self.0.iter()
    }

    fn validate(&self) -> std::result::Result<(), String> {
        let mut seen = HashSet::new();
        for mapping in &self.0 {
            if mapping.source_id.trim().is_empty() || mapping.target_id.trim().is_empty() {
                return Err("stratigraphy mapping ids must not be empty".to_string());
            }
            if !seen.insert(mapping) {
                return Err(format!(
                    "duplicate stratigraphy mapping '{}' -> '{}'",
                    mapping.source_id, mapping.target_id
                ));
            }
        }
        Ok(())
    }
}

impl Index<usize> for StratigraphyMappings {
    type Output = StratigraphyIdentifierMapping;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

impl From<Vec<StratigraphyIdentifierMapping>> for StratigraphyMappings {
    fn from(mappings: Vec<StratigraphyIdentifierMapping>) -> Self {
        Self(mappings)
    }
}

/// Mappings stored in `.fmu/mappings.json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Mappings {
    #[serde(default)]
    pub stratigraphy: Option<StratigraphyMappings>,
    /// Reserved. Well mappings cannot be merged yet.
    #[serde(default)]
    pub wells: Option<Value>,
}

impl Document for Mappings {
    fn validate(&self) -> std::result::Result<(), String> {
        match &self.stratigraphy {
            Some(strat) => strat.validate(),
            None => Ok(()),
        }
    }
}
