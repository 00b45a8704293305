//! Built-in schema templates (JSON:API error envelope and pagination links).

use crate::model::{Items, List, Property, PropertyType, Schema, SchemaKind};

/// Keys accepted by [`template`], in display order.
pub const TEMPLATE_KEYS: &[&str] = &["jsonApiVersion", "errorDetail", "error", "pagination"];

/// Look up a template schema by key.
///
/// The returned schema is marked `is_template`. Unknown keys yield `None`.
pub fn template(key: &str) -> Option<Schema> {
    let schema = match key {
        "jsonApiVersion" => json_api_version(),
        "errorDetail" => error_detail(),
        "error" => error(),
        "pagination" => pagination(),
        _ => return None,
    };
    Some(Schema {
        is_template: true,
        ..schema
    })
}

fn string(name: &str, description: &str) -> Property {
    Property::new(name, PropertyType::String).describe(description)
}

fn json_api_version() -> Schema {
    let mut version = string("version", "Highest JSON:API version supported by the server");
    version.example = Some("1.0".to_string());
    Schema::object("JsonApiVersion").with_properties(vec![version])
}

fn error_detail() -> Schema {
    let mut status = string("status", "HTTP status code applicable to this problem");
    status.example = Some("400".to_string());
    Schema::object("ErrorDetail").with_properties(vec![
        string("id", "Unique identifier for this occurrence of the problem"),
        status,
        string("code", "Application-specific error code"),
        string("title", "Short, human-readable summary of the problem").required(),
        string("detail", "Explanation specific to this occurrence of the problem"),
    ])
}

fn error() -> Schema {
    let mut errors = Property::new("errors", PropertyType::Array)
        .describe("List of error objects")
        .required();
    errors.items = Some(Items::Ref {
        reference: "ErrorDetail".to_string(),
    });
    Schema {
        description: "JSON:API error envelope".to_string(),
        ..Schema::object("Error").with_properties(vec![
            errors,
            Property::reference("jsonapi", "JsonApiVersion"),
        ])
    }
}

fn pagination() -> Schema {
    let link = |name: &str, description: &str| {
        let mut p = string(name, description);
        p.format = Some("uri".to_string());
        p.nullable = true;
        p
    };
    Schema {
        kind: SchemaKind::Object,
        description: "Pagination links".to_string(),
        properties: List::new(vec![
            link("self", "Link to the current page"),
            link("first", "Link to the first page"),
            link("prev", "Link to the previous page"),
            link("next", "Link to the next page"),
            link("last", "Link to the last page"),
        ]),
        ..Schema::object("Pagination")
    }
}
