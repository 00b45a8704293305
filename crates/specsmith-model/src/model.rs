use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Shared, copy-on-write collection.
///
/// Cloning a record clones the `Arc`, not the elements, so untouched
/// branches of a document keep their identity across updates.
pub type List<T> = Arc<Vec<T>>;

/// The whole API surface being edited.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Document {
    /// The `openapi` version string (e.g. "3.0.0").
    pub openapi_version: String,
    pub info: Info,
    pub servers: List<Server>,
    pub security_schemes: List<SecurityScheme>,
    pub tags: List<Tag>,
    pub paths: List<Path>,
    pub schemas: List<Schema>,
}

impl Default for Document {
    fn default() -> Self {
        Self {
            openapi_version: "3.0.0".to_string(),
            info: Info {
                title: "New API".to_string(),
                version: "1.0.0".to_string(),
                ..Info::default()
            },
            servers: List::default(),
            security_schemes: List::default(),
            tags: List::default(),
            paths: List::default(),
            schemas: List::default(),
        }
    }
}

/// The `info` block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Info {
    pub title: String,
    pub description: String,
    /// Semantic version of the described API (not of OpenAPI).
    pub version: String,
    pub terms_of_service: Option<String>,
    pub contact: Option<Contact>,
    pub license: Option<License>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Contact {
    pub name: String,
    pub email: String,
    pub url: String,
}

/// License info. `name` is required by OpenAPI whenever a license is present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct License {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Server {
    pub url: String,
    pub description: String,
}

/// A named security scheme. The name is the key other parts of the
/// document use to require it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityScheme {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(flatten)]
    pub kind: SecuritySchemeKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SecuritySchemeKind {
    #[serde(rename = "http", rename_all = "camelCase")]
    Http {
        scheme: HttpAuthScheme,
        #[serde(default)]
        bearer_format: Option<String>,
    },
    #[serde(rename = "apiKey", rename_all = "camelCase")]
    ApiKey {
        location: ApiKeyLocation,
        key_name: String,
    },
    #[serde(rename = "oauth2", rename_all = "camelCase")]
    OAuth2 {
        #[serde(default)]
        token_url: Option<String>,
    },
    #[serde(rename = "openIdConnect", rename_all = "camelCase")]
    OpenIdConnect { open_id_connect_url: String },
}

impl SecuritySchemeKind {
    /// The OpenAPI `type` value.
    pub fn type_name(&self) -> &'static str {
        match self {
            SecuritySchemeKind::Http { .. } => "http",
            SecuritySchemeKind::ApiKey { .. } => "apiKey",
            SecuritySchemeKind::OAuth2 { .. } => "oauth2",
            SecuritySchemeKind::OpenIdConnect { .. } => "openIdConnect",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HttpAuthScheme {
    #[default]
    Bearer,
    Basic,
}

impl HttpAuthScheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpAuthScheme::Bearer => "bearer",
            HttpAuthScheme::Basic => "basic",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "bearer" => Some(Self::Bearer),
            "basic" => Some(Self::Basic),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiKeyLocation {
    #[default]
    Header,
    Query,
    Cookie,
}

impl ApiKeyLocation {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApiKeyLocation::Header => "header",
            ApiKeyLocation::Query => "query",
            ApiKeyLocation::Cookie => "cookie",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "header" => Some(Self::Header),
            "query" => Some(Self::Query),
            "cookie" => Some(Self::Cookie),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tag {
    pub name: String,
    pub description: String,
}

/// A path template and the operations bound to it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Path {
    /// The path template (e.g. "/users/{id}").
    pub path: String,
    pub operations: List<Operation>,
}

/// HTTP methods an operation can be bound to, in canonical order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    #[default]
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    pub const ALL: [Method; 5] = [
        Method::Get,
        Method::Post,
        Method::Put,
        Method::Patch,
        Method::Delete,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "get",
            Method::Post => "post",
            Method::Put => "put",
            Method::Patch => "patch",
            Method::Delete => "delete",
        }
    }

    /// Parse a lower- or upper-case method name.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "get" => Some(Self::Get),
            "post" => Some(Self::Post),
            "put" => Some(Self::Put),
            "patch" => Some(Self::Patch),
            "delete" => Some(Self::Delete),
            _ => None,
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_str().to_uppercase())
    }
}

/// One HTTP method handler attached to a path.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Operation {
    pub method: Method,
    pub tags: List<String>,
    pub summary: String,
    pub operation_id: String,
    pub description: String,
    pub deprecated: bool,
    pub parameters: List<Parameter>,
    pub responses: List<Response>,
    pub request_body: Option<RequestBody>,
    /// Required security scheme names. `None` inherits the global
    /// requirement, `Some([])` explicitly disables auth.
    pub security: Option<List<String>>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    Path,
    #[default]
    Query,
    Header,
    Cookie,
}

impl ParameterLocation {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParameterLocation::Path => "path",
            ParameterLocation::Query => "query",
            ParameterLocation::Header => "header",
            ParameterLocation::Cookie => "cookie",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "path" => Some(Self::Path),
            "query" => Some(Self::Query),
            "header" => Some(Self::Header),
            "cookie" => Some(Self::Cookie),
            _ => None,
        }
    }
}

/// Scalar types a parameter schema can take.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveType {
    #[default]
    String,
    Number,
    Integer,
    Boolean,
}

impl PrimitiveType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PrimitiveType::String => "string",
            PrimitiveType::Number => "number",
            PrimitiveType::Integer => "integer",
            PrimitiveType::Boolean => "boolean",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "string" => Some(Self::String),
            "number" => Some(Self::Number),
            "integer" => Some(Self::Integer),
            "boolean" => Some(Self::Boolean),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "in")]
    pub location: ParameterLocation,
    pub description: String,
    pub required: bool,
    #[serde(rename = "type")]
    pub schema_type: PrimitiveType,
    pub format: Option<String>,
    /// Comma-separated enum values, kept as typed by the user.
    #[serde(rename = "enum")]
    pub enum_values: Option<String>,
    pub default: Option<String>,
    pub example: Option<String>,
    pub deprecated: bool,
}

impl Parameter {
    /// A fresh path parameter: required, string-typed, no description.
    pub fn path(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            location: ParameterLocation::Path,
            required: true,
            ..Self::default()
        }
    }
}

/// Default request body content type.
pub const DEFAULT_CONTENT_TYPE: &str = "application/json";

/// Content type used for every response body.
pub const RESPONSE_CONTENT_TYPE: &str = "application/vnd.api+json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RequestBody {
    pub description: String,
    pub required: bool,
    /// Name of a schema, or empty for an untyped object body.
    pub schema_ref: String,
    pub content_type: String,
}

impl Default for RequestBody {
    fn default() -> Self {
        Self {
            description: String::new(),
            required: false,
            schema_ref: String::new(),
            content_type: DEFAULT_CONTENT_TYPE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Response {
    /// Status code key, e.g. "200" or "default".
    pub status: String,
    pub description: String,
    pub schema_ref: String,
}

impl Response {
    pub fn new(status: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            status: status.into(),
            description: description.into(),
            schema_ref: String::new(),
        }
    }

    pub fn with_schema_ref(mut self, schema_ref: impl Into<String>) -> Self {
        self.schema_ref = schema_ref.into();
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaKind {
    #[default]
    Object,
    Array,
}

impl SchemaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SchemaKind::Object => "object",
            SchemaKind::Array => "array",
        }
    }
}

/// A named, reusable component schema.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Schema {
    /// Unique name, the `$ref` target.
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: SchemaKind,
    pub properties: List<Property>,
    /// Element descriptor for array schemas. When absent, an array schema
    /// is an array of objects shaped by `properties`.
    pub items: Option<Items>,
    /// Set on schemas inserted from the template library. UI hint only.
    pub is_template: bool,
}

impl Schema {
    pub fn object(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_properties(mut self, properties: Vec<Property>) -> Self {
        self.properties = List::new(properties);
        self
    }
}

/// Property types. The empty variant is an untyped property.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    #[default]
    #[serde(rename = "")]
    Untyped,
    String,
    Number,
    Integer,
    Boolean,
    Array,
    Object,
}

impl PropertyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyType::Untyped => "",
            PropertyType::String => "string",
            PropertyType::Number => "number",
            PropertyType::Integer => "integer",
            PropertyType::Boolean => "boolean",
            PropertyType::Array => "array",
            PropertyType::Object => "object",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "" => Some(Self::Untyped),
            "string" => Some(Self::String),
            "number" => Some(Self::Number),
            "integer" => Some(Self::Integer),
            "boolean" => Some(Self::Boolean),
            "array" => Some(Self::Array),
            "object" => Some(Self::Object),
            _ => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, PropertyType::Number | PropertyType::Integer)
    }
}

/// Array element descriptor: either a primitive type or a schema reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Items {
    Ref {
        #[serde(rename = "$ref")]
        reference: String,
    },
    Primitive {
        #[serde(rename = "type")]
        item_type: PropertyType,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Property {
    pub name: String,
    #[serde(rename = "type")]
    pub prop_type: PropertyType,
    pub format: Option<String>,
    pub description: String,
    pub example: Option<String>,
    pub required: bool,
    pub nullable: bool,
    pub read_only: bool,
    pub write_only: bool,
    pub deprecated: bool,
    pub pattern: Option<String>,
    pub min_length: Option<u64>,
    pub max_length: Option<u64>,
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
    pub default: Option<String>,
    /// Target schema name; only meaningful when `prop_type` is object.
    #[serde(rename = "$ref")]
    pub schema_ref: Option<String>,
    /// Element descriptor; only meaningful when `prop_type` is array.
    pub items: Option<Items>,
    /// Comma-separated enum values, kept as typed by the user.
    #[serde(rename = "enum")]
    pub enum_values: Option<String>,
}

impl Property {
    pub fn new(name: impl Into<String>, prop_type: PropertyType) -> Self {
        Self {
            name: name.into(),
            prop_type,
            ..Self::default()
        }
    }

    /// An object property pointing at another schema.
    pub fn reference(name: impl Into<String>, schema: impl Into<String>) -> Self {
        Self {
            schema_ref: Some(schema.into()),
            ..Self::new(name, PropertyType::Object)
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// Split a raw comma-separated enum string into trimmed, non-empty values.
pub fn enum_tokens(raw: &str) -> Vec<&str> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}
