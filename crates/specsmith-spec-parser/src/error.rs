use thiserror::Error;

/// Failures that stop an import before a document can be built.
#[derive(Debug, Error)]
pub enum ImportError {
    /// The text is not valid YAML (or JSON).
    #[error("YAML parse error: {0}")]
    Yaml(String),

    /// The root node is a scalar or a sequence.
    #[error("document root must be a mapping")]
    NotAMapping,

    /// I/O error reading the input file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
