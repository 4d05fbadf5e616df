//! Diffing and merging two `.fmu` directories
//!
//! Synchronization is one-directional: changes flow from an incoming
//! directory into the current one. Only the resources named by
//! [`ResourceKind`] take part; the lock file and the cache never do.
//!
//! - **diff**: per-resource change lists, without touching either side
//! - **sync**: apply those changes to the current directory, changelog first,
//!   and record a terminal `merge` entry

mod engine;
mod resource;

pub use engine::SyncEngine;
pub use resource::SyncResource;

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::models::{ChangeInfo, Log, Mappings, ProjectConfig};

/// The resources that participate in a directory sync.
///
/// Variants are ordered so that iterating a [`DirDiff`] visits the changelog
/// first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Changelog,
    Config,
    Mappings,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 3] = [Self::Changelog, Self::Config, Self::Mappings];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Changelog => "changelog",
            Self::Config => "config",
            Self::Mappings => "mappings",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The new value carried by a [`ResourceChange`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ChangePayload {
    /// A config field value
    Value(Value),
    /// Incoming changelog entries newer than the local cursor
    Changelog(Log<ChangeInfo>),
    /// The whole incoming mappings record
    Mappings(Mappings),
}

/// One entry in a resource's change list: `(key, old_value, new_value)`.
///
/// `old_value` is always `None` in diffs produced by [`SyncEngine`]; the
/// incoming side is the only one reported.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceChange {
    pub key: String,
    pub old_value: Option<Value>,
    pub new_value: ChangePayload,
}

impl ResourceChange {
    pub fn new(key: impl Into<String>, new_value: ChangePayload) -> Self {
        Self {
            key: key.into(),
            old_value: None,
            new_value,
        }
    }
}

/// Change lists keyed by resource. A resource that could not be diffed is
/// absent; one with nothing to sync maps to an empty list.
pub type DirDiff = BTreeMap<ResourceKind, Vec<ResourceChange>>;

/// A resource's state after a sync.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MergedResource {
    Changelog(Log<ChangeInfo>),
    Config(ProjectConfig),
    Mappings(Mappings),
}

/// Merged resources keyed by resource. Unchanged resources are absent.
pub type SyncResult = BTreeMap<ResourceKind, MergedResource>;
