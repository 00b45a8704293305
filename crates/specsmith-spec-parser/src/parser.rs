use serde_json::{Map, Value};
use tracing::{debug, warn};

use specsmith_model::{
    ApiKeyLocation, Contact, Document, HttpAuthScheme, Info, Items, License, List, Method,
    Operation, Parameter, ParameterLocation, Path, PrimitiveType, Property, PropertyType,
    RequestBody, Response, Schema, SchemaKind, SecurityScheme, SecuritySchemeKind, Server, Tag,
    DEFAULT_CONTENT_TYPE,
};

use crate::error::ImportError;
use crate::report::ImportResult;

type Object = Map<String, Value>;

/// Prefix of the only `$ref` shape the model can hold.
const SCHEMA_REF_PREFIX: &str = "#/components/schemas/";

/// HTTP methods OpenAPI allows on a path item.
const HTTP_METHODS: &[&str] = &[
    "get", "put", "post", "delete", "options", "head", "patch", "trace",
];

/// Component sections the model has no place for.
const UNSUPPORTED_COMPONENTS: &[&str] = &[
    "responses",
    "parameters",
    "examples",
    "requestBodies",
    "headers",
    "links",
    "callbacks",
];

const COMPOSITION_KEYWORDS: &[&str] = &["allOf", "oneOf", "anyOf", "not"];

const DEFAULT_API_VERSION: &str = "1.0.0";

/// Import an OpenAPI document from YAML or JSON text.
///
/// Never fails: parse problems come back as `ImportResult::errors`.
pub fn import(input: &str) -> ImportResult {
    let root = match parse_root(input) {
        Ok(root) => root,
        Err(err) => {
            warn!(error = %err, "import failed");
            return ImportResult::failed(err.to_string());
        }
    };

    let mut importer = Importer::default();
    let document = importer.document(&root);
    debug!(
        paths = document.paths.len(),
        schemas = document.schemas.len(),
        errors = importer.errors.len(),
        warnings = importer.warnings.len(),
        "import finished"
    );
    ImportResult::built(document, importer.errors, importer.warnings)
}

/// Import a document from a file path.
pub fn import_file(path: &std::path::Path) -> Result<ImportResult, ImportError> {
    let content = std::fs::read_to_string(path)?;
    Ok(import(&content))
}

fn parse_root(input: &str) -> Result<Object, ImportError> {
    // JSON is valid YAML, so one parser covers both.
    let root: Value = serde_yaml::from_str(input).map_err(|e| ImportError::Yaml(e.to_string()))?;
    match root {
        Value::Object(map) => Ok(map),
        _ => Err(ImportError::NotAMapping),
    }
}

/// Collects diagnostics while walking the parsed tree.
#[derive(Debug, Default)]
struct Importer {
    errors: Vec<String>,
    warnings: Vec<String>,
}

impl Importer {
    fn error(&mut self, message: impl Into<String>) {
        let message = message.into();
        debug!(%message, "import error");
        self.errors.push(message);
    }

    fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        debug!(%message, "import warning");
        self.warnings.push(message);
    }

    fn document(&mut self, root: &Object) -> Document {
        let openapi_version = self.openapi_version(root);
        let info = self.info(root.get("info"));
        let servers = match root.get("servers").and_then(Value::as_array) {
            Some(list) => self.servers(list),
            None => Vec::new(),
        };
        let tags = match root.get("tags").and_then(Value::as_array) {
            Some(list) => self.tags(list),
            None => Vec::new(),
        };

        let components = root.get("components").and_then(Value::as_object);
        if let Some(components) = components {
            for section in UNSUPPORTED_COMPONENTS {
                if components.contains_key(*section) {
                    self.warn(format!(
                        "components.{section} is not fully supported and was ignored"
                    ));
                }
            }
        }
        let security_schemes = match components
            .and_then(|c| c.get("securitySchemes"))
            .and_then(Value::as_object)
        {
            Some(map) => self.security_schemes(map),
            None => Vec::new(),
        };
        let schemas = match components
            .and_then(|c| c.get("schemas"))
            .and_then(Value::as_object)
        {
            Some(map) => map
                .iter()
                .filter_map(|(name, value)| self.schema(name, value))
                .collect(),
            None => Vec::new(),
        };

        let global_security = root
            .get("security")
            .map(|value| self.security_requirement(value, "security"));
        let paths = match root.get("paths").and_then(Value::as_object) {
            Some(map) => self.paths(map, global_security.as_ref()),
            None => Vec::new(),
        };

        Document {
            openapi_version,
            info,
            servers: List::new(servers),
            security_schemes: List::new(security_schemes),
            tags: List::new(tags),
            paths: List::new(paths),
            schemas: List::new(schemas),
        }
    }

    fn openapi_version(&mut self, root: &Object) -> String {
        match root.get("openapi").and_then(scalar_text) {
            Some(version) => {
                if !version.starts_with("3.") {
                    self.warn(format!(
                        "OpenAPI version {version} may not be fully supported"
                    ));
                }
                version
            }
            None => {
                if root.contains_key("swagger") {
                    self.error("missing required field 'openapi' (Swagger 2.0 is not supported)");
                } else {
                    self.error("missing required field 'openapi'");
                }
                Document::default().openapi_version
            }
        }
    }

    fn info(&mut self, info: Option<&Value>) -> Info {
        let empty = Object::new();
        let info = match info.and_then(Value::as_object) {
            Some(info) => info,
            None => {
                self.warn("missing 'info' object");
                &empty
            }
        };

        let title = text(info, "title");
        if title.is_empty() {
            self.warn("missing 'info.title'");
        }
        let version = match info.get("version").and_then(scalar_text) {
            Some(version) => version,
            None => DEFAULT_API_VERSION.to_string(),
        };

        let contact = info.get("contact").and_then(Value::as_object).map(|c| Contact {
            name: text(c, "name"),
            email: text(c, "email"),
            url: text(c, "url"),
        });
        let license = info.get("license").and_then(Value::as_object).map(|l| License {
            name: text(l, "name"),
            url: text(l, "url"),
        });
        if license.as_ref().is_some_and(|l| l.name.is_empty()) {
            self.warn("missing 'info.license.name'");
        }

        Info {
            title,
            description: text(info, "description"),
            version,
            terms_of_service: optional_text(info, "termsOfService"),
            contact,
            license,
        }
    }

    fn servers(&mut self, list: &[Value]) -> Vec<Server> {
        let mut servers = Vec::new();
        for (index, value) in list.iter().enumerate() {
            let url = value.as_object().map(|s| text(s, "url")).unwrap_or_default();
            if url.is_empty() {
                self.warn(format!("servers[{index}] has no url and was skipped"));
                continue;
            }
            servers.push(Server {
                url,
                description: value.as_object().map(|s| text(s, "description")).unwrap_or_default(),
            });
        }
        servers
    }

    fn tags(&mut self, list: &[Value]) -> Vec<Tag> {
        let mut tags = Vec::new();
        for (index, value) in list.iter().enumerate() {
            let name = value.as_object().map(|t| text(t, "name")).unwrap_or_default();
            if name.is_empty() {
                self.warn(format!("tags[{index}] has no name and was skipped"));
                continue;
            }
            tags.push(Tag {
                name,
                description: value.as_object().map(|t| text(t, "description")).unwrap_or_default(),
            });
        }
        tags
    }

    fn security_schemes(&mut self, map: &Object) -> Vec<SecurityScheme> {
        let mut schemes = Vec::new();
        for (name, value) in map {
            let Some(obj) = value.as_object() else {
                self.warn(format!("security scheme '{name}' is not an object and was skipped"));
                continue;
            };
            if obj.contains_key("$ref") {
                self.warn(format!("security scheme '{name}' is a $ref and was skipped"));
                continue;
            }
            let Some(kind) = self.security_scheme_kind(name, obj) else {
                continue;
            };
            schemes.push(SecurityScheme {
                name: name.clone(),
                description: text(obj, "description"),
                kind,
            });
        }
        schemes
    }

    fn security_scheme_kind(&mut self, name: &str, obj: &Object) -> Option<SecuritySchemeKind> {
        match obj.get("type").and_then(Value::as_str) {
            Some("http") => {
                let scheme = text(obj, "scheme");
                match HttpAuthScheme::parse(&scheme.to_ascii_lowercase()) {
                    Some(scheme) => Some(SecuritySchemeKind::Http {
                        scheme,
                        bearer_format: optional_text(obj, "bearerFormat"),
                    }),
                    None => {
                        self.warn(format!(
                            "security scheme '{name}': HTTP scheme '{scheme}' is not supported; skipped"
                        ));
                        None
                    }
                }
            }
            Some("apiKey") => {
                let location = text(obj, "in");
                match ApiKeyLocation::parse(&location) {
                    Some(location) => Some(SecuritySchemeKind::ApiKey {
                        location,
                        key_name: text(obj, "name"),
                    }),
                    None => {
                        self.warn(format!(
                            "security scheme '{name}': invalid API key location '{location}'; skipped"
                        ));
                        None
                    }
                }
            }
            Some("oauth2") => {
                let flows = obj.get("flows").and_then(Value::as_object);
                if flows.is_some_and(|f| f.keys().any(|k| k != "clientCredentials")) {
                    self.warn(format!(
                        "security scheme '{name}': only the clientCredentials flow is kept"
                    ));
                }
                let token_url = flows
                    .and_then(|f| f.get("clientCredentials"))
                    .and_then(Value::as_object)
                    .and_then(|f| optional_text(f, "tokenUrl"));
                Some(SecuritySchemeKind::OAuth2 { token_url })
            }
            Some("openIdConnect") => Some(SecuritySchemeKind::OpenIdConnect {
                open_id_connect_url: text(obj, "openIdConnectUrl"),
            }),
            Some(other) => {
                self.warn(format!(
                    "security scheme '{name}' has unsupported type '{other}'; skipped"
                ));
                None
            }
            None => {
                self.warn(format!("security scheme '{name}' has no type; skipped"));
                None
            }
        }
    }

    fn schema(&mut self, name: &str, value: &Value) -> Option<Schema> {
        let Some(obj) = value.as_object() else {
            self.warn(format!("schema '{name}' is not an object and was skipped"));
            return None;
        };
        if obj.contains_key("$ref") {
            self.warn(format!("schema '{name}' is a $ref alias and was skipped"));
            return None;
        }
        for keyword in COMPOSITION_KEYWORDS {
            if obj.contains_key(*keyword) {
                self.warn(format!("schema '{name}': '{keyword}' is not supported and was ignored"));
            }
        }

        let kind = match obj.get("type").and_then(Value::as_str) {
            None | Some("object") => SchemaKind::Object,
            Some("array") => SchemaKind::Array,
            Some(other) => {
                self.warn(format!(
                    "schema '{name}' of type '{other}' is not supported; imported as an object"
                ));
                SchemaKind::Object
            }
        };

        let (properties, items) = match kind {
            SchemaKind::Object => (self.properties(name, obj), None),
            SchemaKind::Array => match obj.get("items").and_then(Value::as_object) {
                Some(items) if items.contains_key("properties") => {
                    (self.properties(name, items), None)
                }
                Some(items) => (Vec::new(), self.items(&format!("schema '{name}'"), items)),
                None => (Vec::new(), None),
            },
        };

        Some(Schema {
            name: name.to_string(),
            description: text(obj, "description"),
            kind,
            properties: List::new(properties),
            items,
            is_template: false,
        })
    }

    /// Properties of an object schema, with `required` folded in.
    fn properties(&mut self, owner: &str, obj: &Object) -> Vec<Property> {
        let required: Vec<&str> = obj
            .get("required")
            .and_then(Value::as_array)
            .map(|names| names.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default();
        let Some(props) = obj.get("properties").and_then(Value::as_object) else {
            return Vec::new();
        };

        props
            .iter()
            .map(|(name, value)| Property {
                required: required.contains(&name.as_str()),
                ..self.property(owner, name, value)
            })
            .collect()
    }

    fn property(&mut self, owner: &str, name: &str, value: &Value) -> Property {
        let context = format!("property {owner}.{name}");
        let empty = Object::new();
        let obj = match value.as_object() {
            Some(obj) => obj,
            None => {
                self.warn(format!("{context} is not an object; imported untyped"));
                &empty
            }
        };

        if let Some(reference) = single_ref(obj) {
            let target = self.ref_name(reference, &context);
            return Property {
                nullable: flag(obj, "nullable"),
                ..Property::reference(name, target)
            };
        }
        if let Some(keyword) = COMPOSITION_KEYWORDS.iter().find(|k| obj.contains_key(**k)) {
            self.warn(format!("{context}: '{keyword}' is not supported; imported untyped"));
            return Property::new(name, PropertyType::Untyped).describe(text(obj, "description"));
        }

        let prop_type = match obj.get("type") {
            Some(Value::String(t)) => PropertyType::parse(t).unwrap_or_else(|| {
                self.warn(format!("{context}: unknown type '{t}'; imported untyped"));
                PropertyType::Untyped
            }),
            Some(other) => {
                self.warn(format!("{context}: type {other} is not supported; imported untyped"));
                PropertyType::Untyped
            }
            None if obj.contains_key("properties") => PropertyType::Object,
            None if obj.contains_key("items") => PropertyType::Array,
            None => PropertyType::Untyped,
        };

        if prop_type == PropertyType::Object && obj.contains_key("properties") {
            self.warn(format!("{context}: nested object properties were dropped"));
        }
        let items = match (prop_type, obj.get("items").and_then(Value::as_object)) {
            (PropertyType::Array, Some(items)) => {
                if items.contains_key("properties") {
                    self.warn(format!("{context}: inline item properties were dropped"));
                }
                self.items(&context, items)
            }
            _ => None,
        };

        Property {
            name: name.to_string(),
            prop_type,
            format: optional_text(obj, "format"),
            description: text(obj, "description"),
            example: obj.get("example").and_then(scalar_text),
            required: false,
            nullable: flag(obj, "nullable"),
            read_only: flag(obj, "readOnly"),
            write_only: flag(obj, "writeOnly"),
            deprecated: flag(obj, "deprecated"),
            pattern: optional_text(obj, "pattern"),
            min_length: obj.get("minLength").and_then(Value::as_u64),
            max_length: obj.get("maxLength").and_then(Value::as_u64),
            minimum: obj.get("minimum").and_then(Value::as_f64),
            maximum: obj.get("maximum").and_then(Value::as_f64),
            default: obj.get("default").and_then(scalar_text),
            schema_ref: None,
            items,
            enum_values: enum_text(obj),
        }
    }

    /// Array element descriptor from an `items` object.
    fn items(&mut self, context: &str, items: &Object) -> Option<Items> {
        if let Some(reference) = items.get("$ref").and_then(Value::as_str) {
            return Some(Items::Ref {
                reference: self.ref_name(reference, context),
            });
        }
        let item_type = items.get("type").and_then(Value::as_str)?;
        match PropertyType::parse(item_type) {
            Some(item_type) => Some(Items::Primitive { item_type }),
            None => {
                self.warn(format!("{context}: unknown item type '{item_type}'"));
                None
            }
        }
    }

    /// Schema name from a `#/components/schemas/<Name>` reference.
    fn ref_name(&mut self, reference: &str, context: &str) -> String {
        match reference.strip_prefix(SCHEMA_REF_PREFIX) {
            Some(name) if !name.is_empty() && !name.contains('/') => name.to_string(),
            _ => {
                self.warn(format!("{context}: unsupported $ref '{reference}' was dropped"));
                String::new()
            }
        }
    }

    /// Scheme names from a security requirement list. Scope lists are
    /// discarded.
    fn security_requirement(&mut self, value: &Value, context: &str) -> List<String> {
        let Some(entries) = value.as_array() else {
            self.warn(format!("{context}: security must be a list; ignored"));
            return List::default();
        };
        List::new(
            entries
                .iter()
                .filter_map(Value::as_object)
                .flat_map(|entry| entry.keys().cloned())
                .collect(),
        )
    }

    fn paths(&mut self, paths: &Object, global_security: Option<&List<String>>) -> Vec<Path> {
        let mut out = Vec::new();
        for (template, item) in paths {
            let Some(item) = item.as_object() else {
                self.error(format!("path '{template}' must be an object"));
                continue;
            };
            if item.contains_key("$ref") {
                self.warn(format!("path '{template}' is a $ref path item and was skipped"));
                continue;
            }

            let shared = match item.get("parameters").and_then(Value::as_array) {
                Some(list) => self.parameters(list, &format!("path '{template}'")),
                None => Vec::new(),
            };

            let mut operations: Vec<Operation> = Vec::new();
            for (key, value) in item {
                if !HTTP_METHODS.contains(&key.as_str()) {
                    continue;
                }
                let Some(method) = Method::parse(key) else {
                    self.warn(format!(
                        "{} {template}: method is not supported and was skipped",
                        key.to_uppercase()
                    ));
                    continue;
                };
                let Some(op) = value.as_object() else {
                    self.error(format!("{method} {template} must be an object"));
                    continue;
                };
                operations.push(self.operation(method, template, op, &shared, global_security));
            }

            if operations.is_empty() {
                self.warn(format!(
                    "path '{template}' has no supported operations and was skipped"
                ));
                continue;
            }
            out.push(Path {
                path: template.clone(),
                operations: List::new(operations),
            });
        }
        out
    }

    fn operation(
        &mut self,
        method: Method,
        template: &str,
        op: &Object,
        shared: &[Parameter],
        global_security: Option<&List<String>>,
    ) -> Operation {
        let context = format!("{method} {template}");

        let own = match op.get("parameters").and_then(Value::as_array) {
            Some(list) => self.parameters(list, &context),
            None => Vec::new(),
        };
        let request_body = op
            .get("requestBody")
            .and_then(|body| self.request_body(body, &context));
        let responses = match op.get("responses").and_then(Value::as_object) {
            Some(map) => self.responses(map, &context),
            None => Vec::new(),
        };
        // An explicit (possibly empty) list overrides the global requirement.
        let security = match op.get("security") {
            Some(value) => Some(self.security_requirement(value, &context)),
            None => global_security.cloned(),
        };

        Operation {
            method,
            tags: List::new(string_list(op.get("tags"))),
            summary: text(op, "summary"),
            operation_id: text(op, "operationId"),
            description: text(op, "description"),
            deprecated: flag(op, "deprecated"),
            parameters: List::new(merge_parameters(shared, own)),
            responses: List::new(responses),
            request_body,
            security,
        }
    }

    fn parameters(&mut self, list: &[Value], context: &str) -> Vec<Parameter> {
        list.iter()
            .filter_map(|value| self.parameter(value, context))
            .collect()
    }

    fn parameter(&mut self, value: &Value, context: &str) -> Option<Parameter> {
        let Some(obj) = value.as_object() else {
            self.warn(format!("{context}: parameter is not an object and was skipped"));
            return None;
        };
        if obj.contains_key("$ref") {
            self.warn(format!("{context}: referenced parameters are not supported and were skipped"));
            return None;
        }
        let name = text(obj, "name");
        if name.is_empty() {
            self.warn(format!("{context}: parameter without a name was skipped"));
            return None;
        }
        let location_text = text(obj, "in");
        let Some(location) = ParameterLocation::parse(&location_text) else {
            self.warn(format!(
                "{context}: parameter '{name}' has invalid location '{location_text}' and was skipped"
            ));
            return None;
        };

        let empty = Object::new();
        let schema = obj
            .get("schema")
            .and_then(Value::as_object)
            .unwrap_or(&empty);
        let schema_type = match schema.get("type").and_then(Value::as_str) {
            None => PrimitiveType::String,
            Some(t) => PrimitiveType::parse(t).unwrap_or_else(|| {
                self.warn(format!(
                    "{context}: parameter '{name}' of type '{t}' imported as string"
                ));
                PrimitiveType::String
            }),
        };

        let mut required = flag(obj, "required");
        if location == ParameterLocation::Path && !required {
            self.warn(format!(
                "{context}: path parameter '{name}' must be required; marked required"
            ));
            required = true;
        }

        Some(Parameter {
            description: text(obj, "description"),
            required,
            schema_type,
            format: optional_text(schema, "format"),
            enum_values: enum_text(schema),
            default: schema.get("default").and_then(scalar_text),
            example: obj
                .get("example")
                .or_else(|| schema.get("example"))
                .and_then(scalar_text),
            deprecated: flag(obj, "deprecated"),
            name,
            location,
        })
    }

    fn request_body(&mut self, value: &Value, context: &str) -> Option<RequestBody> {
        let Some(obj) = value.as_object() else {
            self.warn(format!("{context}: request body is not an object and was skipped"));
            return None;
        };
        if obj.contains_key("$ref") {
            self.warn(format!("{context}: referenced request bodies are not supported and were skipped"));
            return None;
        }

        let content = obj.get("content").and_then(Value::as_object);
        if content.is_some_and(|c| c.len() > 1) {
            self.warn(format!("{context}: only the first request body content type is kept"));
        }
        let (content_type, schema_ref) = match content.and_then(|c| c.iter().next()) {
            Some((media, entry)) => (
                media.clone(),
                self.content_schema_ref(entry, &format!("{context} request body")),
            ),
            None => (DEFAULT_CONTENT_TYPE.to_string(), String::new()),
        };

        Some(RequestBody {
            description: text(obj, "description"),
            required: flag(obj, "required"),
            schema_ref,
            content_type,
        })
    }

    fn responses(&mut self, map: &Object, context: &str) -> Vec<Response> {
        let mut responses = Vec::new();
        for (status, value) in map {
            let Some(obj) = value.as_object() else {
                self.warn(format!("{context}: response {status} is not an object and was skipped"));
                continue;
            };
            if obj.contains_key("$ref") {
                self.warn(format!(
                    "{context}: referenced response {status} is not supported and was skipped"
                ));
                continue;
            }
            let schema_ref = match obj
                .get("content")
                .and_then(Value::as_object)
                .and_then(|c| c.values().next())
            {
                Some(entry) => {
                    self.content_schema_ref(entry, &format!("{context} response {status}"))
                }
                None => String::new(),
            };
            responses.push(Response {
                status: status.clone(),
                description: text(obj, "description"),
                schema_ref,
            });
        }
        responses
    }

    /// Schema name behind a media type entry, or empty for an untyped body.
    fn content_schema_ref(&mut self, entry: &Value, context: &str) -> String {
        let Some(schema) = entry.get("schema").and_then(Value::as_object) else {
            return String::new();
        };
        if let Some(reference) = single_ref(schema) {
            return self.ref_name(reference, context);
        }
        let untyped = schema.is_empty()
            || (schema.len() == 1 && schema.get("type").and_then(Value::as_str) == Some("object"));
        if !untyped {
            self.warn(format!("{context}: inline schema is not supported and was dropped"));
        }
        String::new()
    }
}

/// Keep shared (path-level) parameters unless the operation redefines the
/// same name and location.
fn merge_parameters(shared: &[Parameter], own: Vec<Parameter>) -> Vec<Parameter> {
    let mut merged: Vec<Parameter> = shared
        .iter()
        .filter(|p| {
            !own.iter()
                .any(|o| o.name == p.name && o.location == p.location)
        })
        .cloned()
        .collect();
    merged.extend(own);
    merged
}

/// The `$ref` of a schema, also looking through a single-entry `allOf`.
fn single_ref(obj: &Object) -> Option<&str> {
    if let Some(reference) = obj.get("$ref").and_then(Value::as_str) {
        return Some(reference);
    }
    match obj.get("allOf").and_then(Value::as_array).map(Vec::as_slice) {
        Some([only]) => only.get("$ref").and_then(Value::as_str),
        _ => None,
    }
}

/// Text form of a scalar. Numbers and booleans keep their YAML spelling.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn text(obj: &Object, key: &str) -> String {
    obj.get(key).and_then(scalar_text).unwrap_or_default()
}

fn optional_text(obj: &Object, key: &str) -> Option<String> {
    obj.get(key).and_then(scalar_text).filter(|s| !s.is_empty())
}

fn flag(obj: &Object, key: &str) -> bool {
    obj.get(key).and_then(Value::as_bool).unwrap_or(false)
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|list| list.iter().filter_map(scalar_text).collect())
        .unwrap_or_default()
}

/// Enum values joined into the model's comma-separated form.
fn enum_text(obj: &Object) -> Option<String> {
    obj.get("enum")
        .and_then(Value::as_array)
        .map(|values| {
            values
                .iter()
                .filter_map(scalar_text)
                .collect::<Vec<_>>()
                .join(", ")
        })
}
