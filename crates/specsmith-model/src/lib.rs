//! In-memory OpenAPI 3.0 document model.
//!
//! Holds the canonical representation of the API being edited, the
//! immutable update surface over it, and the derived-field helpers that keep
//! it consistent: path-parameter sync, operation-id generation, the schema
//! template library and legacy snapshot migration.
//!
//! References between entities (a response pointing at a schema, an
//! operation requiring a security scheme) are plain names resolved by lookup.
//! A name may point at nothing yet; the validator reports it.

pub mod document;
pub mod error;
mod list;
pub mod migrate;
pub mod model;
pub mod operation_id;
pub mod path_params;
pub mod templates;

pub use document::{COMMON_ERROR_RESPONSES, ERROR_SCHEMA};
pub use error::ModelError;
pub use migrate::migrate_legacy_format;
pub use model::*;
pub use templates::{template, TEMPLATE_KEYS};
