//! File input and output for commands.

use std::io::Write;
use std::path::Path;

use specsmith_model::ModelError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid document snapshot {path}: {source}")]
    Snapshot {
        path: String,
        #[source]
        source: ModelError,
    },

    #[error("cannot encode output: {0}")]
    Encode(#[from] ModelError),

    #[error("cannot encode output: {0}")]
    Json(#[from] serde_json::Error),
}

pub fn read_input(path: &str) -> Result<String, CliError> {
    std::fs::read_to_string(Path::new(path)).map_err(|source| CliError::Read {
        path: path.to_string(),
        source,
    })
}

/// Write `content` to `output`, or to stdout when no path is given.
pub fn write_output(output: Option<&str>, content: &str) -> Result<(), CliError> {
    match output {
        Some(path) => std::fs::write(path, content).map_err(|source| CliError::Write {
            path: path.to_string(),
            source,
        }),
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(content.as_bytes())
                .and_then(|()| stdout.flush())
                .map_err(|source| CliError::Write {
                    path: "<stdout>".to_string(),
                    source,
                })
        }
    }
}
