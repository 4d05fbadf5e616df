//! Document models persisted inside a `.fmu` directory

mod change_info;
mod config;
mod log;
mod mappings;
mod user_config;

pub use change_info::{ChangeInfo, ChangeType};
pub use config::{ConfigDocument, MIN_CACHE_REVISIONS, ProjectConfig};
pub use log::{Filter, FilterOperator, FilterType, Log, LogEntry};
pub use mappings::{
    DataSystem, Mappings, RelationType, StratigraphyIdentifierMapping, StratigraphyMappings,
};
pub use user_config::{MAX_RECENT_PROJECT_DIRECTORIES, UserApiKeys, UserConfig};

use serde::{Serialize, de::DeserializeOwned};

/// A structured document stored as one JSON file.
///
/// Serde handles the type-level validation on load; `validate` adds the
/// value-level rules that a type alone cannot express.
pub trait Document: Serialize + DeserializeOwned + Clone + PartialEq + std::fmt::Debug {
    /// Check value-level constraints. Returns a human-readable reason on failure.
    fn validate(&self) -> std::result::Result<(), String> {
        Ok(())
    }

    /// Top-level fields that never participate in a field-by-field diff.
    fn diff_exempt_fields() -> &'static [&'static str] {
        &[]
    }
}
