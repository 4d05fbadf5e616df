//! JSON documents in the shape they are stored on disk.

use serde_json::{Value, json};

/// A minimal valid `config.json`.
pub fn config_json(created_by: &str, created_at: &str) -> Value {
    json!({
        "version": "0.1.0",
        "created_at": created_at,
        "created_by": created_by,
        "last_modified_at": null,
        "last_modified_by": null,
        "cache_max_revisions": 5,
        "masterdata": null,
        "model": null,
        "access": null,
        "rms": null
    })
}

/// A masterdata block as found in a project config.
pub fn masterdata() -> Value {
    json!({
        "smda": {
            "country": [
                {"identifier": "Norway", "uuid": "ad214d85-8a1d-19da-e053-c918a4889309"}
            ],
            "discovery": [
                {"short_identifier": "DROGON", "uuid": "ad214d85-8a1d-19da-e053-c918a4889310"}
            ],
            "field": [
                {"identifier": "DROGON", "uuid": "00000000-0000-0000-0000-000000000000"}
            ],
            "coordinate_system": {
                "identifier": "ST_WGS84_UTM37N_P32637",
                "uuid": "15ce3b84-766f-4c93-9050-b154861f9100"
            },
            "stratigraphic_column": {
                "identifier": "DROGON_HAS_NO_STRATCOLUMN",
                "uuid": "00000000-0000-0000-0000-000000000000"
            }
        }
    })
}

/// One RMS to SMDA stratigraphy mapping.
pub fn strat_mapping(source_id: &str, target_id: &str) -> Value {
    json!({
        "source_system": "rms",
        "target_system": "smda",
        "relation_type": "primary",
        "source_id": source_id,
        "target_id": target_id
    })
}

/// One changelog entry.
pub fn change_entry(timestamp: &str, user: &str, key: &str) -> Value {
    json!({
        "timestamp": timestamp,
        "change_type": "update",
        "user": user,
        "path": "/elsewhere/.fmu",
        "change": format!("Updated field '{key}'. Old value: a -> New value: b"),
        "hostname": "fixture-host",
        "file": "config.json",
        "key": key
    })
}
