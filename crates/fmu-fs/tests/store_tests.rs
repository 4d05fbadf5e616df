//! Tests for the JSON document store

use fmu_fs::{Error, JsonStore, NormalizedPath};
use pretty_assertions::assert_eq;
use serde::{Deserialize, Serialize};
use tempfile::tempdir;

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct Sample {
    version: String,
    cache_max_revisions: u32,
}

#[test]
fn save_then_load_returns_equal_document() {
    let dir = tempdir().unwrap();
    let path = NormalizedPath::new(dir.path().join("config.json"));
    let store = JsonStore::new();
    let doc = Sample {
        version: "1.0.0".into(),
        cache_max_revisions: 5,
    };

    let written = store.save(&path, &doc).unwrap();
    assert!(written.contains("\"cache_max_revisions\": 5"));

    let loaded: Sample = store.load(&path).unwrap();
    assert_eq!(loaded, doc);
}

#[test]
fn load_reports_parse_errors_with_path() {
    let dir = tempdir().unwrap();
    let path = NormalizedPath::new(dir.path().join("config.json"));
    std::fs::write(path.to_native(), "{ not json").unwrap();

    let err = JsonStore::new().load::<Sample>(&path).unwrap_err();
    match err {
        Error::Parse { path: p, .. } => assert!(p.ends_with("config.json")),
        other => panic!("expected parse error, got {other:?}"),
    }
}

#[test]
fn load_rejects_wrongly_typed_fields() {
    let dir = tempdir().unwrap();
    let path = NormalizedPath::new(dir.path().join("config.json"));
    std::fs::write(
        path.to_native(),
        r#"{"version": 123, "cache_max_revisions": 5}"#,
    )
    .unwrap();

    assert!(JsonStore::new().load::<Sample>(&path).is_err());
}

#[test]
fn load_missing_file_is_not_found() {
    let dir = tempdir().unwrap();
    let path = NormalizedPath::new(dir.path().join("absent.json"));

    let err = JsonStore::new().load::<Sample>(&path).unwrap_err();
    assert!(err.is_not_found());
}
