//! Tests for creating, opening and maintaining a `.fmu` directory

use std::fs;
use std::sync::Arc;

use chrono::{TimeZone, Utc};
use fmu_settings::{
    Actor, ChangeType, DirectoryOptions, Error, FmuDirectory, SteppingClock, UserFmuDirectory,
};
use fmu_test_utils::TestProject;
use fmu_test_utils::fixtures::config_json;
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::json;
use tempfile::TempDir;

fn actor(user: &str) -> Actor {
    let clock = SteppingClock::starting_at(Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap());
    Actor::new(user, "test-host").with_clock(Arc::new(clock))
}

fn foreign_lock(project: &TestProject) {
    project.write_json(
        ".fmu/.lock",
        &json!({
            "pid": 1,
            "hostname": "other-host",
            "user": "someone",
            "acquired_at": "2025-03-01T08:00:00Z",
            "expires_at": "2099-01-01T00:00:00Z"
        }),
    );
}

#[test]
fn test_init_writes_readme_and_config() {
    let temp = TempDir::new().unwrap();

    let dir = FmuDirectory::init(temp.path(), actor("alice")).unwrap();

    assert!(dir.path().ends_with(".fmu"));
    assert!(dir.file_exists("README"));
    let config = dir.config().load().unwrap();
    assert_eq!(config.created_by, "alice");
    assert_eq!(config.cache_max_revisions, 5);
    assert_eq!(config.version, env!("CARGO_PKG_VERSION"));
    assert!(!dir.changelog().exists());
}

#[test]
fn test_init_twice_fails() {
    let temp = TempDir::new().unwrap();
    FmuDirectory::init(temp.path(), actor("alice")).unwrap();

    let err = FmuDirectory::init(temp.path(), actor("alice")).unwrap_err();
    assert!(matches!(err, Error::AlreadyExists { .. }));
}

#[test]
fn test_open_missing_directory() {
    let temp = TempDir::new().unwrap();

    let err = FmuDirectory::open(temp.path(), actor("alice")).unwrap_err();
    assert!(matches!(err, Error::DirectoryNotFound { .. }));
}

#[test]
fn test_open_file_named_fmu() {
    let project = TestProject::new();
    project.write_file(".fmu", "not a directory");

    let err = FmuDirectory::open(project.root(), actor("alice")).unwrap_err();
    assert!(matches!(err, Error::NotADirectory { .. }));
}

#[test]
fn test_find_walks_up_from_nested_directory() {
    let project = TestProject::new().with_fmu_dir("alice");
    let nested = project.root().join("ert/model/rms");
    fs::create_dir_all(&nested).unwrap();

    let found = FmuDirectory::find_fmu_directory(&nested).unwrap();
    assert_eq!(found, fs::canonicalize(project.fmu_path()).unwrap());

    let dir = FmuDirectory::find_nearest(&nested, actor("bob")).unwrap();
    assert_eq!(dir.base_path(), fs::canonicalize(project.root()).unwrap());
    assert_eq!(dir.config().load().unwrap().created_by, "alice");
}

#[test]
fn test_find_nearest_without_directory() {
    let temp = TempDir::new().unwrap();

    let err = FmuDirectory::find_nearest(temp.path(), actor("bob")).unwrap_err();
    assert!(matches!(err, Error::DirectoryNotFound { .. }));
}

#[test]
fn test_open_reads_cache_limit_from_config() {
    let mut config = config_json("alice", "2025-01-01T00:00:00Z");
    config["cache_max_revisions"] = json!(9);
    let project = TestProject::new().with_config(config);

    let dir = FmuDirectory::open(project.root(), actor("alice")).unwrap();
    assert_eq!(dir.cache_max_revisions(), 9);
}

#[rstest]
#[case(2, 5)]
#[case(5, 5)]
#[case(12, 12)]
fn test_set_cache_limit_clamps_and_persists(#[case] requested: usize, #[case] stored: usize) {
    let project = TestProject::new().with_fmu_dir("alice");
    let dir = FmuDirectory::open(project.root(), actor("alice")).unwrap();

    dir.set_cache_max_revisions(requested).unwrap();

    assert_eq!(dir.cache_max_revisions(), stored);
    assert_eq!(
        project.read_json(".fmu/config.json")["cache_max_revisions"],
        json!(stored)
    );
    let reopened = FmuDirectory::open(project.root(), actor("alice")).unwrap();
    assert_eq!(reopened.cache_max_revisions(), stored);
}

#[test]
fn test_restore_config_from_cache() {
    let temp = TempDir::new().unwrap();
    let dir = FmuDirectory::init(temp.path(), actor("alice")).unwrap();
    dir.set_config_value("model", json!({"name": "drogon"}))
        .unwrap();
    fs::remove_file(dir.get_file_path("config.json")).unwrap();
    fs::remove_file(dir.get_file_path("README")).unwrap();

    dir.restore().unwrap();

    assert!(dir.file_exists("README"));
    assert_eq!(
        dir.get_config_value("model.name").unwrap(),
        Some(json!("drogon"))
    );
    let log = dir.changelog().load().unwrap();
    assert_eq!(log.len(), 1);
}

#[test]
fn test_restore_config_from_defaults() {
    let project = TestProject::new().with_fmu_dir("alice");
    let dir = FmuDirectory::open(project.root(), actor("bob")).unwrap();
    project.remove_file(".fmu/config.json");

    dir.restore().unwrap();

    assert_eq!(dir.config().load().unwrap().created_by, "bob");
    let log = dir.changelog().load().unwrap();
    assert_eq!(log[0].change_type, ChangeType::Reset);
    project.assert_file_exists(".fmu/README");
}

#[test]
fn test_restore_recreates_removed_directory() {
    let temp = TempDir::new().unwrap();
    let dir = FmuDirectory::init(temp.path(), actor("alice")).unwrap();
    fs::remove_dir_all(dir.path()).unwrap();

    dir.restore().unwrap();

    assert!(dir.path().is_dir());
    assert!(dir.config().exists());
}

#[test]
fn test_foreign_lock_blocks_writes() {
    let project = TestProject::new().with_fmu_dir("alice");
    let dir = FmuDirectory::open(project.root(), actor("alice")).unwrap();
    foreign_lock(&project);

    let err = dir.write_text_file("notes.txt", "hello").unwrap_err();
    assert!(err.is_permission_denied());
    assert!(err.to_string().contains("other-host:1"));
    project.assert_file_not_exists(".fmu/notes.txt");

    let err = dir.set_config_value("model", json!({})).unwrap_err();
    assert!(matches!(err, Error::LockHeld { .. }));
    assert!(!dir.changelog().exists());
}

#[test]
fn test_expired_lock_does_not_block() {
    let project = TestProject::new().with_fmu_dir("alice");
    let dir = FmuDirectory::open(project.root(), actor("alice")).unwrap();
    project.write_json(
        ".fmu/.lock",
        &json!({
            "pid": 1,
            "hostname": "other-host",
            "user": "someone",
            "acquired_at": "2020-01-01T00:00:00Z",
            "expires_at": "2020-01-01T00:20:00Z"
        }),
    );

    dir.write_text_file("notes.txt", "hello").unwrap();
    let info = dir.lock().acquire().unwrap();
    assert_eq!(info.hostname, "test-host");
    assert!(dir.lock().is_acquired().unwrap());
}

#[test]
fn test_lock_timeout_option() {
    let project = TestProject::new().with_fmu_dir("alice");
    let options = DirectoryOptions {
        lock_timeout: std::time::Duration::from_secs(60),
    };
    let dir = FmuDirectory::open_with(project.root(), actor("alice"), options).unwrap();

    let info = dir.lock().acquire().unwrap();
    assert_eq!((info.expires_at - info.acquired_at).num_seconds(), 60);
    dir.lock().release().unwrap();
    assert!(!dir.lock().exists());
}

#[test]
fn test_file_helpers() {
    let project = TestProject::new().with_fmu_dir("alice");
    let dir = FmuDirectory::open(project.root(), actor("alice")).unwrap();

    dir.write_text_file("notes/a.txt", "first").unwrap();
    dir.write_file("notes/b.bin", &[0, 1, 2]).unwrap();
    dir.ensure_directory("notes/empty").unwrap();

    assert_eq!(dir.read_text_file("notes/a.txt").unwrap(), "first");
    assert_eq!(dir.read_file("notes/b.bin").unwrap(), vec![0u8, 1, 2]);
    let names: Vec<String> = dir
        .list_files(Some("notes"))
        .unwrap()
        .iter()
        .filter_map(|p| p.file_name())
        .map(|n| n.to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["a.txt", "b.bin"]);
    assert!(dir.list_files(Some("missing")).unwrap().is_empty());
    assert!(dir.get_file_path("notes/empty").is_dir());
}

#[test]
fn test_saves_store_cache_revisions() {
    let temp = TempDir::new().unwrap();
    let dir = FmuDirectory::init(temp.path(), actor("alice")).unwrap();

    dir.set_config_value("model", json!({"name": "a"})).unwrap();

    let revisions = dir.list_files(Some("cache/config")).unwrap();
    assert_eq!(revisions.len(), 2);
    assert!(revisions.iter().all(|p| p.extension().is_some_and(|e| e == "json")));
}

#[test]
fn test_user_directory_init_writes_readme_and_user_config() {
    let home = TempDir::new().unwrap();

    let dir = UserFmuDirectory::init_at(home.path(), actor("alice"), DirectoryOptions::default())
        .unwrap();

    assert_eq!(dir.base_path(), fs::canonicalize(home.path()).unwrap());
    assert!(dir.read_text_file("README").unwrap().contains("personal settings"));
    let config = dir.config().load().unwrap();
    assert_eq!(config.cache_max_revisions, 5);
    assert!(config.recent_project_directories.is_empty());
    assert_eq!(config.user_api_keys.smda_subscription, None);

    let err = UserFmuDirectory::init_at(home.path(), actor("alice"), DirectoryOptions::default())
        .unwrap_err();
    assert!(matches!(err, Error::AlreadyExists { .. }));
}

#[test]
fn test_user_directory_open_requires_existing_directory() {
    let home = TempDir::new().unwrap();

    let err = UserFmuDirectory::open_at(home.path(), actor("alice"), DirectoryOptions::default())
        .unwrap_err();
    assert!(matches!(err, Error::DirectoryNotFound { .. }));
}

#[test]
fn test_user_directory_update_config_logs_changes() {
    let home = TempDir::new().unwrap();
    let dir = UserFmuDirectory::init_at(home.path(), actor("alice"), DirectoryOptions::default())
        .unwrap();

    let config = dir
        .update_config(vec![(
            "user_api_keys.smda_subscription".to_string(),
            json!("secret"),
        )])
        .unwrap();

    assert_eq!(config.user_api_keys.smda_subscription.as_deref(), Some("secret"));
    assert_eq!(config.last_modified_by.as_deref(), Some("alice"));
    let log = dir.changelog().load().unwrap();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].key, "user_api_keys.smda_subscription");
    assert_eq!(log[0].file, "config.json");
    assert_eq!(dir.list_files(Some("cache/config")).unwrap().len(), 2);
}

#[test]
fn test_user_directory_tracks_recent_projects() {
    let home = TempDir::new().unwrap();
    let dir = UserFmuDirectory::init_at(home.path(), actor("alice"), DirectoryOptions::default())
        .unwrap();

    dir.add_recent_project("/projects/drogon").unwrap();
    dir.add_recent_project("/projects/troll").unwrap();
    let config = dir.add_recent_project("/projects/drogon").unwrap();

    assert_eq!(
        config.recent_project_directories,
        vec![
            std::path::PathBuf::from("/projects/drogon"),
            std::path::PathBuf::from("/projects/troll"),
        ]
    );
    assert_eq!(dir.changelog().load().unwrap().len(), 3);
}

#[test]
fn test_user_directory_rejects_invalid_config() {
    let home = TempDir::new().unwrap();
    let dir = UserFmuDirectory::init_at(home.path(), actor("alice"), DirectoryOptions::default())
        .unwrap();

    let err = dir
        .set_config_value("recent_project_directories", json!(["/a", "/a"]))
        .unwrap_err();

    assert!(err.to_string().starts_with("Invalid value set for 'UserConfigManager'"));
    assert!(!dir.changelog().exists());
}

#[test]
fn test_user_directory_restore_and_lock() {
    let home = TempDir::new().unwrap();
    let dir = UserFmuDirectory::init_at(home.path(), actor("alice"), DirectoryOptions::default())
        .unwrap();
    dir.set_cache_max_revisions(7).unwrap();
    fs::remove_file(dir.get_file_path("config.json")).unwrap();
    fs::remove_file(dir.get_file_path("README")).unwrap();

    dir.restore().unwrap();

    assert!(dir.file_exists("README"));
    assert_eq!(dir.config().load().unwrap().cache_max_revisions, 7);

    let reopened =
        UserFmuDirectory::open_at(home.path(), actor("alice"), DirectoryOptions::default())
            .unwrap();
    assert_eq!(reopened.cache_max_revisions(), 7);
    reopened.lock().acquire().unwrap();
    assert!(reopened.lock().is_acquired().unwrap());
    reopened.lock().release().unwrap();
}
