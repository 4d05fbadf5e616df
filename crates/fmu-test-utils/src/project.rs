//! [`TestProject`] builder for `.fmu` test scenarios.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tempfile::TempDir;

use crate::fixtures;

/// Creation time used by [`TestProject::with_fmu_dir`].
pub const FIXTURE_CREATED_AT: &str = "2025-01-01T00:00:00Z";

/// A temporary project directory, optionally holding a `.fmu` tree.
///
/// # Example
///
/// ```rust,no_run
/// use fmu_test_utils::TestProject;
///
/// let project = TestProject::new().with_fmu_dir("user");
/// project.assert_file_exists(".fmu/config.json");
/// ```
pub struct TestProject {
    temp_dir: TempDir,
}

impl Default for TestProject {
    fn default() -> Self {
        Self::new()
    }
}

impl TestProject {
    /// Create an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().expect("TestProject::new: failed to create temp dir"),
        }
    }

    /// Root of the project (the directory containing `.fmu`).
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn fmu_path(&self) -> PathBuf {
        self.root().join(".fmu")
    }

    /// Write `.fmu/config.json` with a fixed creation time.
    ///
    /// Realism level: DISK ONLY. No README, lock or cache is written.
    pub fn with_fmu_dir(self, created_by: &str) -> Self {
        self.with_config(fixtures::config_json(created_by, FIXTURE_CREATED_AT))
    }

    /// Write `.fmu/config.json` with the given document.
    pub fn with_config(self, config: Value) -> Self {
        self.write_json(".fmu/config.json", &config);
        self
    }

    /// Write `.fmu/logs/changelog.json` with the given entries.
    pub fn with_changelog(self, entries: Vec<Value>) -> Self {
        self.write_json(".fmu/logs/changelog.json", &Value::Array(entries));
        self
    }

    /// Write `.fmu/mappings.json` holding the given stratigraphy mappings.
    pub fn with_strat_mappings(self, mappings: Vec<Value>) -> Self {
        let record = serde_json::json!({"stratigraphy": mappings, "wells": null});
        self.write_json(".fmu/mappings.json", &record);
        self
    }

    /// Write `value` pretty-printed at `path` relative to the root.
    pub fn write_json(&self, path: &str, value: &Value) {
        let text = serde_json::to_string_pretty(value)
            .unwrap_or_else(|e| panic!("TestProject::write_json: {e}"));
        self.write_file(path, &text);
    }

    /// Write `content` at `path` relative to the root, creating parents.
    pub fn write_file(&self, path: &str, content: &str) {
        let full_path = self.root().join(path);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).unwrap_or_else(|e| {
                panic!("TestProject::write_file: cannot create {}: {e}", parent.display())
            });
        }
        fs::write(&full_path, content)
            .unwrap_or_else(|e| panic!("TestProject::write_file: {}: {e}", full_path.display()));
    }

    /// Parse the JSON file at `path` relative to the root.
    pub fn read_json(&self, path: &str) -> Value {
        let full_path = self.root().join(path);
        let text = fs::read_to_string(&full_path)
            .unwrap_or_else(|_| panic!("Could not read file: {}", full_path.display()));
        serde_json::from_str(&text)
            .unwrap_or_else(|e| panic!("Invalid JSON in {}: {e}", full_path.display()))
    }

    pub fn remove_file(&self, path: &str) {
        let full_path = self.root().join(path);
        fs::remove_file(&full_path)
            .unwrap_or_else(|e| panic!("Could not remove {}: {e}", full_path.display()));
    }

    /// Assert that `path` (relative to the root) exists.
    ///
    /// # Panics
    /// Panics with a descriptive message if the path does not exist.
    pub fn assert_file_exists(&self, path: &str) {
        let full_path = self.root().join(path);
        assert!(
            full_path.exists(),
            "Expected file to exist: {}",
            full_path.display()
        );
    }

    /// Assert that `path` (relative to the root) does **not** exist.
    ///
    /// # Panics
    /// Panics with a descriptive message if the path exists.
    pub fn assert_file_not_exists(&self, path: &str) {
        let full_path = self.root().join(path);
        assert!(
            !full_path.exists(),
            "Expected file NOT to exist: {}",
            full_path.display()
        );
    }
}
