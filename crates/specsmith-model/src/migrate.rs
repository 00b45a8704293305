//! Upgrades persisted snapshots from the single-operation path shape.
//!
//! Older snapshots stored one operation per path, with the operation fields
//! (`method`, `summary`, ...) directly on the path entry. Current snapshots
//! carry an `operations` array instead.

use serde_json::{Map, Value};

/// Operation fields that older snapshots stored directly on a path entry.
const LEGACY_OPERATION_FIELDS: &[&str] = &[
    "method",
    "tags",
    "summary",
    "operationId",
    "description",
    "deprecated",
    "parameters",
    "responses",
    "requestBody",
    "security",
];

/// Wrap legacy flat path entries into a one-element `operations` list.
///
/// Entries that already carry `operations` pass through unchanged, so
/// applying the migration twice is the same as applying it once.
pub fn migrate_legacy_format(mut snapshot: Value) -> Value {
    if let Some(paths) = snapshot.get_mut("paths").and_then(Value::as_array_mut) {
        for entry in paths.iter_mut() {
            if let Some(obj) = entry.as_object_mut() {
                migrate_path(obj);
            }
        }
    }
    snapshot
}

fn migrate_path(path: &mut Map<String, Value>) {
    if path.get("operations").is_some_and(Value::is_array) {
        return;
    }

    let mut operation = Map::new();
    for field in LEGACY_OPERATION_FIELDS {
        if let Some(value) = path.remove(*field) {
            operation.insert((*field).to_string(), value);
        }
    }

    let operations = if operation.is_empty() {
        Vec::new()
    } else {
        vec![Value::Object(operation)]
    };
    path.insert("operations".to_string(), Value::Array(operations));
}
