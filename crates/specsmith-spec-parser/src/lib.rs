//! OpenAPI 3.x importer.
//!
//! Reads YAML/JSON text into a specsmith [`Document`](specsmith_model::Document).
//! Import is lenient: anything the editor model cannot express is dropped
//! with a warning, and only problems that make the input unusable are
//! reported as errors.

pub mod error;
pub mod parser;
pub mod report;

pub use error::ImportError;
pub use parser::{import, import_file};
pub use report::ImportResult;
