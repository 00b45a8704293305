use serde::Serialize;
use specsmith_model::Document;

/// Outcome of an import.
///
/// `document` is present whenever the input parsed as a YAML mapping, even
/// if `errors` is not empty, so callers can inspect a partial result.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportResult {
    pub success: bool,
    pub document: Option<Document>,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ImportResult {
    pub(crate) fn failed(error: String) -> Self {
        Self {
            success: false,
            document: None,
            errors: vec![error],
            warnings: Vec::new(),
        }
    }

    pub(crate) fn built(document: Document, errors: Vec<String>, warnings: Vec<String>) -> Self {
        Self {
            success: errors.is_empty(),
            document: Some(document),
            errors,
            warnings,
        }
    }
}
