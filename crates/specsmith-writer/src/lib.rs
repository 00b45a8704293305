//! Serializes a specsmith [`Document`] to OpenAPI 3.0 YAML.
//!
//! The output is deterministic: the same document always produces the
//! same bytes. Sections are only emitted when they have content, and
//! malformed entries (an array property without `items`, an empty content
//! type) are written with defaults rather than rejected.

mod yaml;

use specsmith_model::{
    enum_tokens, Document, Info, Items, Operation, Parameter, Path, PrimitiveType, Property,
    PropertyType, RequestBody, Response, Schema, SchemaKind, SecurityScheme, SecuritySchemeKind,
    DEFAULT_CONTENT_TYPE, RESPONSE_CONTENT_TYPE,
};

use crate::yaml::{mapping_key, number, single_quoted, YamlWriter, INDENT};

/// Prefix of local component schema references.
pub const SCHEMA_REF_PREFIX: &str = "#/components/schemas/";

/// Serialize a document to OpenAPI YAML text.
pub fn serialize(document: &Document) -> String {
    let mut w = YamlWriter::default();

    let version = if document.openapi_version.is_empty() {
        "3.0.0"
    } else {
        &document.openapi_version
    };
    w.string(0, "openapi", version);
    write_info(&mut w, &document.info);

    if !document.servers.is_empty() {
        w.open(0, "servers");
        for server in document.servers.iter() {
            w.item();
            w.string(INDENT * 2, "url", &server.url);
            w.string_if_present(INDENT * 2, "description", &server.description);
        }
    }

    if !document.tags.is_empty() {
        w.open(0, "tags");
        for tag in document.tags.iter() {
            w.item();
            w.string(INDENT * 2, "name", &tag.name);
            w.string_if_present(INDENT * 2, "description", &tag.description);
        }
    }

    if !document.paths.is_empty() {
        w.open(0, "paths");
        for path in document.paths.iter() {
            write_path(&mut w, INDENT, path);
        }
    }

    if !document.security_schemes.is_empty() || !document.schemas.is_empty() {
        w.open(0, "components");
        if !document.security_schemes.is_empty() {
            w.open(INDENT, "securitySchemes");
            for scheme in document.security_schemes.iter() {
                write_security_scheme(&mut w, INDENT * 2, scheme);
            }
        }
        if !document.schemas.is_empty() {
            w.open(INDENT, "schemas");
            for schema in document.schemas.iter() {
                write_schema(&mut w, INDENT * 2, schema);
            }
        }
    }

    if !document.security_schemes.is_empty() {
        w.open(0, "security");
        for scheme in document.security_schemes.iter() {
            w.bare_item(INDENT, &format!("{}: []", mapping_key(&scheme.name)));
        }
    }

    w.finish()
}

/// Serialize a single schema as a standalone `Name: {...}` fragment.
pub fn serialize_schema(schema: &Schema) -> String {
    let mut w = YamlWriter::default();
    write_schema(&mut w, 0, schema);
    w.finish()
}

/// `$ref` value pointing at a component schema.
pub fn schema_ref(name: &str) -> String {
    single_quoted(&format!("{SCHEMA_REF_PREFIX}{name}"))
}

fn write_info(w: &mut YamlWriter, info: &Info) {
    w.open(0, "info");
    w.string(INDENT, "title", &info.title);
    w.string_if_present(INDENT, "description", &info.description);
    w.string(INDENT, "version", &info.version);
    if let Some(terms) = &info.terms_of_service {
        w.string_if_present(INDENT, "termsOfService", terms);
    }
    if let Some(contact) = &info.contact {
        if !(contact.name.is_empty() && contact.email.is_empty() && contact.url.is_empty()) {
            w.open(INDENT, "contact");
            w.string_if_present(INDENT * 2, "name", &contact.name);
            w.string_if_present(INDENT * 2, "email", &contact.email);
            w.string_if_present(INDENT * 2, "url", &contact.url);
        }
    }
    if let Some(license) = &info.license {
        w.open(INDENT, "license");
        w.string(INDENT * 2, "name", &license.name);
        w.string_if_present(INDENT * 2, "url", &license.url);
    }
}

fn write_path(w: &mut YamlWriter, indent: usize, path: &Path) {
    // Path keys are always quoted, even when they would be plain.
    w.open_quoted(indent, &path.path);
    for op in path.operations.iter() {
        write_operation(w, indent + INDENT, op);
    }
}

fn write_operation(w: &mut YamlWriter, indent: usize, op: &Operation) {
    let field = indent + INDENT;
    w.open(indent, op.method.as_str());

    if !op.tags.is_empty() {
        w.open(field, "tags");
        for tag in op.tags.iter() {
            w.bare_item(field + INDENT, &single_quoted(tag));
        }
    }
    w.string_if_present(field, "summary", &op.summary);
    w.string_if_present(field, "description", &op.description);
    w.string_if_present(field, "operationId", &op.operation_id);
    w.flag(field, "deprecated", op.deprecated);

    if let Some(security) = &op.security {
        if security.is_empty() {
            w.bare(field, "security", "[]");
        } else {
            w.open(field, "security");
            for name in security.iter() {
                w.bare_item(field + INDENT, &format!("{}: []", mapping_key(name)));
            }
        }
    }

    if !op.parameters.is_empty() {
        w.open(field, "parameters");
        for param in op.parameters.iter() {
            write_parameter(w, field + INDENT * 2, param);
        }
    }

    if let Some(body) = &op.request_body {
        write_request_body(w, field, body);
    }

    if op.responses.is_empty() {
        w.bare(field, "responses", "{}");
    } else {
        w.open(field, "responses");
        for response in op.responses.iter() {
            write_response(w, field + INDENT, response);
        }
    }
}

fn write_parameter(w: &mut YamlWriter, indent: usize, param: &Parameter) {
    w.item();
    w.string(indent, "name", &param.name);
    w.bare(indent, "in", param.location.as_str());
    w.string_if_present(indent, "description", &param.description);
    w.flag(indent, "required", param.required);
    w.flag(indent, "deprecated", param.deprecated);

    let schema = indent + INDENT;
    let kind = property_type(param.schema_type);
    w.open(indent, "schema");
    w.bare(schema, "type", param.schema_type.as_str());
    if let Some(format) = present(&param.format) {
        w.string(schema, "format", format);
    }
    if let Some(raw) = present(&param.enum_values) {
        write_enum(w, schema, kind, raw);
    }
    if let Some(default) = present(&param.default) {
        w.bare(schema, "default", &typed_scalar(kind, default));
    }
    if let Some(example) = present(&param.example) {
        w.bare(indent, "example", &typed_scalar(kind, example));
    }
}

fn write_request_body(w: &mut YamlWriter, indent: usize, body: &RequestBody) {
    let field = indent + INDENT;
    let content_type = if body.content_type.is_empty() {
        DEFAULT_CONTENT_TYPE
    } else {
        &body.content_type
    };

    w.open(indent, "requestBody");
    w.string_if_present(field, "description", &body.description);
    w.flag(field, "required", body.required);
    w.open(field, "content");
    w.open(field + INDENT, content_type);
    w.open(field + INDENT * 2, "schema");
    if body.schema_ref.is_empty() {
        w.bare(field + INDENT * 3, "type", "object");
    } else {
        w.bare(field + INDENT * 3, "$ref", &schema_ref(&body.schema_ref));
    }
}

fn write_response(w: &mut YamlWriter, indent: usize, response: &Response) {
    let field = indent + INDENT;
    w.open_quoted(indent, &response.status);
    w.string(field, "description", &response.description);
    if !response.schema_ref.is_empty() {
        w.open(field, "content");
        w.open(field + INDENT, RESPONSE_CONTENT_TYPE);
        w.open(field + INDENT * 2, "schema");
        w.bare(field + INDENT * 3, "$ref", &schema_ref(&response.schema_ref));
    }
}

fn write_security_scheme(w: &mut YamlWriter, indent: usize, scheme: &SecurityScheme) {
    let field = indent + INDENT;
    w.open(indent, &scheme.name);
    w.bare(field, "type", scheme.kind.type_name());
    w.string_if_present(field, "description", &scheme.description);

    match &scheme.kind {
        SecuritySchemeKind::Http {
            scheme,
            bearer_format,
        } => {
            w.bare(field, "scheme", scheme.as_str());
            if let Some(format) = present(bearer_format) {
                w.string(field, "bearerFormat", format);
            }
        }
        SecuritySchemeKind::ApiKey { location, key_name } => {
            w.bare(field, "in", location.as_str());
            w.string(field, "name", key_name);
        }
        SecuritySchemeKind::OAuth2 { token_url } => match present(token_url) {
            Some(url) => {
                w.open(field, "flows");
                w.open(field + INDENT, "clientCredentials");
                w.string(field + INDENT * 2, "tokenUrl", url);
                w.bare(field + INDENT * 2, "scopes", "{}");
            }
            None => w.bare(field, "flows", "{}"),
        },
        SecuritySchemeKind::OpenIdConnect {
            open_id_connect_url,
        } => {
            w.string(field, "openIdConnectUrl", open_id_connect_url);
        }
    }
}

fn write_schema(w: &mut YamlWriter, indent: usize, schema: &Schema) {
    let field = indent + INDENT;
    w.open(indent, &schema.name);
    w.bare(field, "type", schema.kind.as_str());
    w.string_if_present(field, "description", &schema.description);

    match schema.kind {
        SchemaKind::Object => write_object_body(w, field, &schema.properties),
        SchemaKind::Array => {
            w.open(field, "items");
            match &schema.items {
                Some(items) => write_items(w, field + INDENT, items),
                None => {
                    w.bare(field + INDENT, "type", "object");
                    write_object_body(w, field + INDENT, &schema.properties);
                }
            }
        }
    }
}

/// `required` list and `properties` map of an object schema.
fn write_object_body(w: &mut YamlWriter, indent: usize, properties: &[Property]) {
    if properties.iter().any(|p| p.required) {
        w.open(indent, "required");
        for prop in properties.iter().filter(|p| p.required) {
            w.bare_item(indent + INDENT, &single_quoted(&prop.name));
        }
    }
    if !properties.is_empty() {
        w.open(indent, "properties");
        for prop in properties {
            write_property(w, indent + INDENT, prop);
        }
    }
}

fn write_items(w: &mut YamlWriter, indent: usize, items: &Items) {
    match items {
        Items::Ref { reference } if !reference.is_empty() => {
            w.bare(indent, "$ref", &schema_ref(reference));
        }
        Items::Primitive { item_type } if *item_type != PropertyType::Untyped => {
            w.bare(indent, "type", item_type.as_str());
        }
        _ => w.bare(indent, "type", "string"),
    }
}

fn write_property(w: &mut YamlWriter, indent: usize, prop: &Property) {
    let field = indent + INDENT;
    if prop.prop_type == PropertyType::Untyped && !has_schema_fields(prop) {
        w.bare(indent, &prop.name, "{}");
        return;
    }
    w.open(indent, &prop.name);

    if prop.prop_type == PropertyType::Object {
        if let Some(target) = present(&prop.schema_ref) {
            w.bare(field, "$ref", &schema_ref(target));
            return;
        }
    }

    if prop.prop_type == PropertyType::Array {
        w.bare(field, "type", "array");
        w.open(field, "items");
        match &prop.items {
            Some(items) => write_items(w, field + INDENT, items),
            None => w.bare(field + INDENT, "type", "string"),
        }
        w.string_if_present(field, "description", &prop.description);
        return;
    }

    if prop.prop_type != PropertyType::Untyped {
        w.bare(field, "type", prop.prop_type.as_str());
    }
    if let Some(format) = present(&prop.format) {
        w.string(field, "format", format);
    }
    w.flag(field, "nullable", prop.nullable);
    w.flag(field, "deprecated", prop.deprecated);
    w.flag(field, "readOnly", prop.read_only);
    w.flag(field, "writeOnly", prop.write_only);
    if let Some(default) = present(&prop.default) {
        w.bare(field, "default", &typed_scalar(prop.prop_type, default));
    }
    if let Some(pattern) = present(&prop.pattern) {
        w.string(field, "pattern", pattern);
    }
    match prop.prop_type {
        PropertyType::String => {
            if let Some(min) = prop.min_length {
                w.bare(field, "minLength", &min.to_string());
            }
            if let Some(max) = prop.max_length {
                w.bare(field, "maxLength", &max.to_string());
            }
        }
        PropertyType::Number | PropertyType::Integer => {
            if let Some(min) = prop.minimum {
                w.bare(field, "minimum", &number(min));
            }
            if let Some(max) = prop.maximum {
                w.bare(field, "maximum", &number(max));
            }
        }
        _ => {}
    }
    if let Some(raw) = present(&prop.enum_values) {
        write_enum(w, field, prop.prop_type, raw);
    }
    w.string_if_present(field, "description", &prop.description);
    if let Some(example) = present(&prop.example) {
        w.bare(field, "example", &typed_scalar(prop.prop_type, example));
    }
}

/// Whether an untyped property has anything to write besides its name.
fn has_schema_fields(prop: &Property) -> bool {
    present(&prop.format).is_some()
        || prop.nullable
        || prop.deprecated
        || prop.read_only
        || prop.write_only
        || present(&prop.default).is_some()
        || present(&prop.pattern).is_some()
        || present(&prop.enum_values).is_some_and(|raw| !enum_tokens(raw).is_empty())
        || !prop.description.is_empty()
        || present(&prop.example).is_some()
}

fn write_enum(w: &mut YamlWriter, indent: usize, kind: PropertyType, raw: &str) {
    let values = enum_tokens(raw);
    if values.is_empty() {
        return;
    }
    w.open(indent, "enum");
    for value in values {
        w.bare_item(indent + INDENT, &typed_scalar(kind, value));
    }
}

/// Render a user-entered value for a field of type `kind`.
///
/// Numbers and booleans are written bare when the text is already the
/// canonical spelling of that type, so reading it back yields the same
/// text; everything else is a quoted string.
fn typed_scalar(kind: PropertyType, value: &str) -> String {
    let bare = match kind {
        PropertyType::Integer => canonical_integer(value),
        PropertyType::Number => canonical_integer(value) || canonical_float(value),
        PropertyType::Boolean => value == "true" || value == "false",
        _ => false,
    };
    if bare {
        value.to_string()
    } else if value.contains('\n') {
        serde_json::Value::String(value.to_string()).to_string()
    } else {
        single_quoted(value)
    }
}

fn canonical_integer(value: &str) -> bool {
    value.parse::<i64>().is_ok_and(|n| n.to_string() == value)
}

fn canonical_float(value: &str) -> bool {
    value
        .parse::<f64>()
        .ok()
        .and_then(serde_json::Number::from_f64)
        .is_some_and(|n| n.to_string() == value)
}

fn property_type(kind: PrimitiveType) -> PropertyType {
    match kind {
        PrimitiveType::String => PropertyType::String,
        PrimitiveType::Number => PropertyType::Number,
        PrimitiveType::Integer => PropertyType::Integer,
        PrimitiveType::Boolean => PropertyType::Boolean,
    }
}

/// The value of an optional text field, treating empty as absent.
fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}
