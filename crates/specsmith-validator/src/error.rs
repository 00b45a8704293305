use thiserror::Error;

/// Failures of the full-schema stage. They never escape [`crate::validate`];
/// each becomes a single document-level error.
#[derive(Debug, Error)]
pub enum CheckError {
    #[error("embedded OpenAPI schema failed to compile: {0}")]
    SchemaCompile(String),

    #[error("schema validation worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}
