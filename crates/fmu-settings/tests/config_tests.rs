//! Tests for config updates and their changelog entries

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use fmu_settings::{Actor, ChangeType, Error, FmuDirectory, SteppingClock};
use fmu_test_utils::TestProject;
use fmu_test_utils::fixtures::config_json;
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::{Value, json};

fn open(project: &TestProject) -> FmuDirectory {
    let clock = SteppingClock::starting_at(Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap());
    let actor = Actor::new("user", "test-host").with_clock(Arc::new(clock));
    FmuDirectory::open(project.root(), actor).unwrap()
}

#[test]
fn test_set_absent_then_present_field() {
    let project = TestProject::new().with_fmu_dir("user");
    let dir = open(&project);

    dir.set_config_value("custom_field", json!("v1")).unwrap();
    let log = dir.changelog().load().unwrap();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].change_type, ChangeType::Add);
    assert_eq!(log[0].key, "custom_field");
    assert_eq!(log[0].file, "config.json");
    assert_eq!(log[0].change, "Added field 'custom_field'. New value: v1");

    dir.set_config_value("custom_field", json!("v2")).unwrap();
    let log = dir.changelog().load().unwrap();
    assert_eq!(log.len(), 2);
    assert_eq!(log[1].change_type, ChangeType::Update);
    assert_eq!(
        log[1].change,
        "Updated field 'custom_field'. Old value: v1 -> New value: v2"
    );
    assert_eq!(dir.get_config_value("custom_field").unwrap(), Some(json!("v2")));
}

#[test]
fn test_null_field_counts_as_present() {
    let project = TestProject::new().with_fmu_dir("user");
    let dir = open(&project);

    dir.set_config_value("model", json!({"name": "drogon"}))
        .unwrap();

    let log = dir.changelog().load().unwrap();
    assert_eq!(log[0].change_type, ChangeType::Update);
    assert_eq!(
        log[0].change,
        r#"Updated field 'model'. Old value: null -> New value: {"name":"drogon"}"#
    );
}

#[test]
fn test_dotted_key_walks_nested_fields() {
    let project = TestProject::new().with_fmu_dir("user");
    let dir = open(&project);

    dir.set_config_value("model.name", json!("drogon")).unwrap();
    dir.set_config_value("model.name", json!("viking")).unwrap();
    dir.set_config_value("model.revision", json!("21.1.0"))
        .unwrap();

    let kinds: Vec<ChangeType> = dir
        .changelog()
        .load()
        .unwrap()
        .iter()
        .map(|e| e.change_type)
        .collect();
    assert_eq!(
        kinds,
        vec![ChangeType::Add, ChangeType::Update, ChangeType::Add]
    );
    assert_eq!(
        dir.get_config_value("model").unwrap(),
        Some(json!({"name": "viking", "revision": "21.1.0"}))
    );
    assert_eq!(dir.get_config_value("model.missing").unwrap(), None);
}

#[test]
fn test_update_stamps_modification_fields_without_logging_them() {
    let project = TestProject::new().with_fmu_dir("creator");
    let dir = open(&project);

    let config = dir
        .update_config(vec![
            ("access".to_string(), json!({"asset": {"name": "Drogon"}})),
            ("rms".to_string(), json!({"version": "14.2.2"})),
        ])
        .unwrap();

    assert_eq!(config.last_modified_by.as_deref(), Some("user"));
    assert!(config.last_modified_at.is_some());
    assert_eq!(config.created_by, "creator");
    let keys: Vec<String> = dir
        .changelog()
        .load()
        .unwrap()
        .iter()
        .map(|e| e.key.clone())
        .collect();
    assert_eq!(keys, vec!["access", "rms"]);
}

#[rstest]
#[case::wrong_type("cache_max_revisions", json!("many"))]
#[case::below_minimum("cache_max_revisions", json!(2))]
#[case::scalar_parent("version.major", json!(1))]
fn test_invalid_update_leaves_disk_untouched(#[case] key: &str, #[case] value: Value) {
    let project = TestProject::new().with_fmu_dir("user");
    let dir = open(&project);
    let before = project.read_json(".fmu/config.json");

    let err = dir.set_config_value(key, value).unwrap_err();

    assert!(matches!(err, Error::Validation { .. }));
    assert!(err.to_string().starts_with("Invalid value set for 'ConfigManager'"));
    assert_eq!(project.read_json(".fmu/config.json"), before);
    assert!(!dir.changelog().exists());
}

#[test]
fn test_missing_config_is_resource_not_found() {
    let project = TestProject::new().with_fmu_dir("user");
    let dir = open(&project);
    project.remove_file(".fmu/config.json");

    let err = dir.config().load().unwrap_err();
    assert!(err.is_missing_resource());
    assert!(err.to_string().starts_with("Resource file for 'ConfigManager' not found"));
    assert!(dir.set_config_value("model", json!(null)).is_err());
}

#[test]
fn test_stored_config_below_cache_minimum_fails_to_load() {
    let project = TestProject::new().with_fmu_dir("user");
    let dir = open(&project);
    let mut config = config_json("user", "2025-01-01T00:00:00Z");
    config["cache_max_revisions"] = json!(2);
    project.write_json(".fmu/config.json", &config);

    let err = dir.config().load().unwrap_err();
    assert!(matches!(err, Error::Validation { .. }));
    assert!(err.to_string().contains("cache_max_revisions must be at least 5"));

    let clock = SteppingClock::starting_at(Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap());
    let actor = Actor::new("user", "test-host").with_clock(Arc::new(clock));
    let err = FmuDirectory::open(project.root(), actor).unwrap_err();
    assert!(matches!(err, Error::Validation { .. }));
}

#[test]
fn test_reset_logs_one_entry() {
    let project = TestProject::new().with_fmu_dir("creator");
    let dir = open(&project);
    dir.set_config_value("model", json!({"name": "x"})).unwrap();

    let config = dir.config().reset().unwrap();

    assert_eq!(config.model, None);
    assert_eq!(config.created_by, "user");
    let log = dir.changelog().load().unwrap();
    assert_eq!(log.len(), 2);
    assert_eq!(log[1].change_type, ChangeType::Reset);
}

#[test]
fn test_config_diff_skips_exempt_and_equal_fields() {
    let current = TestProject::new().with_fmu_dir("alice");
    let mut incoming_config = fmu_test_utils::fixtures::config_json("bob", "2024-06-01T00:00:00Z");
    incoming_config["last_modified_by"] = json!("bob");
    incoming_config["last_modified_at"] = json!("2025-01-01T00:00:00Z");
    incoming_config["model"] = json!({"name": "drogon"});
    let incoming = TestProject::new().with_config(incoming_config);
    let (current, incoming) = (open(&current), open(&incoming));

    let diff = current
        .config()
        .get_resource_diff(incoming.config())
        .unwrap();

    assert_eq!(diff, vec![("model".to_string(), json!({"name": "drogon"}))]);
}

#[test]
fn test_saves_keep_a_revision_cache() {
    let project = TestProject::new().with_fmu_dir("user");
    let dir = open(&project);

    for i in 0..7 {
        dir.set_config_value("custom", json!(i)).unwrap();
    }

    let revisions = dir.cache().list_revisions("config.json").unwrap();
    assert_eq!(revisions.len(), 5);
    let latest = dir.cache().latest_revision("config.json").unwrap().unwrap();
    let text = std::fs::read_to_string(latest.to_native()).unwrap();
    assert!(text.contains("\"custom\": 6"));
}
