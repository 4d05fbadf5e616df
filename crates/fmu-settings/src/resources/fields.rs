//! Dotted-key access into JSON documents

use serde_json::{Map, Value};

/// Look up a dotted key such as `"masterdata.smda"`.
///
/// Returns `None` when any segment is absent. A present `null` is
/// `Some(&Value::Null)`, so callers can tell "missing" from "empty".
pub(crate) fn lookup<'a>(root: &'a Value, key: &str) -> Option<&'a Value> {
    key.split('.')
        .try_fold(root, |node, segment| node.as_object()?.get(segment))
}

/// Set a dotted key, creating intermediate objects as needed.
///
/// A `null` intermediate is replaced by an empty object. Any other
/// non-object intermediate is an error.
pub(crate) fn assign(root: &mut Value, key: &str, value: Value) -> Result<(), String> {
    let mut segments: Vec<&str> = key.split('.').collect();
    let Some(last) = segments.pop() else {
        return Err("empty key".to_string());
    };
    if last.is_empty() || segments.iter().any(|s| s.is_empty()) {
        return Err(format!("invalid key '{key}'"));
    }

    let mut node = root;
    for segment in segments {
        let object = as_object_mut(node, key, segment)?;
        node = object
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
    }
    as_object_mut(node, key, last)?.insert(last.to_string(), value);
    Ok(())
}

fn as_object_mut<'a>(
    node: &'a mut Value,
    key: &str,
    segment: &str,
) -> Result<&'a mut Map<String, Value>, String> {
    if node.is_null() {
        *node = Value::Object(Map::new());
    }
    node.as_object_mut()
        .ok_or_else(|| format!("cannot set '{key}': parent of '{segment}' is not an object"))
}

/// Render a value for a change description.
///
/// Strings are written bare; everything else as compact JSON, so structured
/// values always render the same way regardless of how they were produced.
pub(crate) fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
