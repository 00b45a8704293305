use thiserror::Error;

use crate::model::Method;

/// Errors produced by the document mutation surface.
#[derive(Debug, Error)]
pub enum ModelError {
    /// An index-addressed update named an element that does not exist.
    #[error("{collection} index {index} out of range (len {len})")]
    IndexOutOfRange {
        collection: &'static str,
        index: usize,
        len: usize,
    },

    /// A path already carries an operation for this method.
    #[error("path '{path}' already has a {method} operation")]
    DuplicateMethod { path: String, method: Method },

    /// No template is registered under this key.
    #[error("unknown schema template: {0}")]
    UnknownTemplate(String),

    /// A persisted document snapshot could not be decoded.
    #[error("invalid document snapshot: {0}")]
    InvalidSnapshot(#[from] serde_json::Error),
}
