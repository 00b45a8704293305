//! Full-document check against the OpenAPI 3.0 JSON Schema.

use std::sync::LazyLock;

use jsonschema::error::ValidationErrorKind;
use jsonschema::{Draft, ValidationError, Validator};
use serde_json::Value;

use crate::diagnostic::Diagnostic;
use crate::error::CheckError;

/// Compiled once per process; read-only afterwards.
static OPENAPI_SCHEMA: LazyLock<Result<Validator, String>> = LazyLock::new(|| {
    let schema: Value = serde_json::from_str(include_str!("../schema/openapi-3.0.json"))
        .map_err(|e| e.to_string())?;
    jsonschema::options()
        .with_draft(Draft::Draft4)
        .build(&schema)
        .map_err(|e| e.to_string())
});

/// Every schema violation in `document`, as errors.
pub fn check(document: &Value) -> Result<Vec<Diagnostic>, CheckError> {
    let validator = OPENAPI_SCHEMA
        .as_ref()
        .map_err(|e| CheckError::SchemaCompile(e.clone()))?;
    Ok(validator.iter_errors(document).map(|e| to_diagnostic(&e)).collect())
}

fn to_diagnostic(error: &ValidationError<'_>) -> Diagnostic {
    let mut segments = pointer_segments(&error.instance_path.to_string());
    // Point at the missing member rather than at its parent.
    if let ValidationErrorKind::Required { property } = &error.kind {
        if let Some(name) = property.as_str() {
            segments.push(name.to_string());
        }
    }
    Diagnostic::error(segments, message(error))
}

/// Longest instance text quoted verbatim in a message.
const MAX_INSTANCE_TEXT: usize = 80;

/// The validator's message, with a large offending instance replaced by a
/// short stand-in. The location already says which node is at fault.
fn message(error: &ValidationError<'_>) -> String {
    let full = error.to_string();
    let instance = error.instance.to_string();
    if instance.len() <= MAX_INSTANCE_TEXT || !full.contains(&instance) {
        return full;
    }
    full.replacen(&instance, &abbreviate(&error.instance), 1)
}

fn abbreviate(instance: &Value) -> String {
    match instance {
        Value::Object(members) => format!("{{...}} ({} members)", members.len()),
        Value::Array(items) => format!("[...] ({} items)", items.len()),
        Value::String(text) => {
            let head: String = text.chars().take(MAX_INSTANCE_TEXT).collect();
            format!("\"{head}...\"")
        }
        other => other.to_string(),
    }
}

/// Split a JSON pointer into unescaped segments.
fn pointer_segments(pointer: &str) -> Vec<String> {
    pointer
        .split('/')
        .skip(1)
        .map(|s| s.replace("~1", "/").replace("~0", "~"))
        .collect()
}
