//! Hand-written checks that run before the full schema pass.
//!
//! These catch the problems an editor user hits most often and word them
//! in terms of the document rather than of JSON Schema keywords.

use serde_json::{Map, Value};
use specsmith_model::path_params::placeholders;

use crate::diagnostic::Diagnostic;

type Object = Map<String, Value>;

const HTTP_METHODS: &[&str] = &[
    "get", "put", "post", "delete", "options", "head", "patch", "trace",
];

const SCHEMA_REF_PREFIX: &str = "#/components/schemas/";
const PARAMETER_REF_PREFIX: &str = "#/components/parameters/";

/// Keywords that give a component schema a shape.
const SHAPE_KEYWORDS: &[&str] = &["type", "$ref", "allOf", "oneOf", "anyOf"];

#[derive(Debug, Default)]
pub struct Findings {
    pub errors: Vec<Diagnostic>,
    pub warnings: Vec<Diagnostic>,
}

impl Findings {
    fn error(&mut self, segments: Vec<&str>, message: impl Into<String>) {
        self.errors.push(Diagnostic::error(segments, message));
    }

    fn warning(&mut self, segments: Vec<&str>, message: impl Into<String>) {
        self.warnings.push(Diagnostic::warning(segments, message));
    }
}

pub fn check(root: &Object) -> Findings {
    let mut findings = Findings::default();
    check_version(root, &mut findings);
    check_info(root, &mut findings);
    check_paths(root, &mut findings);
    check_component_schemas(root, &mut findings);
    check_schema_refs(root, &mut findings);
    findings
}

fn check_version(root: &Object, findings: &mut Findings) {
    match root.get("openapi") {
        None => findings.error(vec!["openapi"], "Missing required field 'openapi'"),
        Some(Value::String(version)) if version.starts_with("3.0") || version.starts_with("3.1") => {}
        Some(Value::String(version)) => findings.error(
            vec!["openapi"],
            format!("Unsupported OpenAPI version '{version}'; expected 3.0.x or 3.1.x"),
        ),
        Some(other) => findings.error(
            vec!["openapi"],
            format!("'openapi' must be a string, found {other}"),
        ),
    }
}

fn check_info(root: &Object, findings: &mut Findings) {
    let info = root.get("info").and_then(Value::as_object);
    for field in ["title", "version"] {
        let present = info
            .and_then(|i| i.get(field))
            .is_some_and(|v| !v.is_null());
        if !present {
            findings.error(
                vec!["info", field],
                format!("Missing required field 'info.{field}'"),
            );
        }
    }
}

fn check_paths(root: &Object, findings: &mut Findings) {
    let paths = match root.get("paths") {
        None => {
            findings.warning(vec!["paths"], "No paths defined");
            return;
        }
        Some(Value::Object(paths)) => paths,
        Some(_) => {
            findings.error(vec!["paths"], "'paths' must be a mapping");
            return;
        }
    };

    for (template, item) in paths {
        if template.starts_with("x-") {
            continue;
        }
        if !template.starts_with('/') {
            findings.error(
                vec!["paths", template.as_str()],
                format!("Path '{template}' must start with '/'"),
            );
        }
        let Some(item) = item.as_object() else {
            continue;
        };

        let shared = declared_path_parameters(item.get("parameters"), root);
        for &verb in HTTP_METHODS {
            let Some(op) = item.get(verb).and_then(Value::as_object) else {
                continue;
            };
            check_operation(root, template, verb, op, &shared, findings);
        }
    }
}

fn check_operation(
    root: &Object,
    template: &str,
    verb: &str,
    op: &Object,
    shared: &[String],
    findings: &mut Findings,
) {
    let label = format!("{} {template}", verb.to_uppercase());

    if !op.contains_key("operationId") {
        findings.warning(
            vec!["paths", template, verb],
            format!("{label} has no operationId"),
        );
    }

    let has_responses = op
        .get("responses")
        .and_then(Value::as_object)
        .is_some_and(|r| !r.is_empty());
    if !has_responses {
        findings.error(
            vec!["paths", template, verb, "responses"],
            format!("{label} must declare at least one response"),
        );
    }

    let own = declared_path_parameters(op.get("parameters"), root);
    for name in placeholders(template) {
        if !shared.contains(&name) && !own.contains(&name) {
            findings.error(
                vec!["paths", template, verb],
                format!("{label} is missing path parameter '{name}' (declare it with in: path)"),
            );
        }
    }
}

/// Names of `in: path` parameters in a parameter list, following local
/// `#/components/parameters/...` references.
fn declared_path_parameters(list: Option<&Value>, root: &Object) -> Vec<String> {
    let Some(list) = list.and_then(Value::as_array) else {
        return Vec::new();
    };
    list.iter()
        .filter_map(|param| resolve_parameter(param, root))
        .filter(|param| param.get("in").and_then(Value::as_str) == Some("path"))
        .filter_map(|param| param.get("name").and_then(Value::as_str))
        .map(str::to_string)
        .collect()
}

fn resolve_parameter<'a>(param: &'a Value, root: &'a Object) -> Option<&'a Object> {
    let param = param.as_object()?;
    match param.get("$ref").and_then(Value::as_str) {
        Some(reference) => {
            let name = reference.strip_prefix(PARAMETER_REF_PREFIX)?;
            root.get("components")?
                .get("parameters")?
                .get(name)?
                .as_object()
        }
        None => Some(param),
    }
}

fn check_component_schemas(root: &Object, findings: &mut Findings) {
    let Some(schemas) = component_schemas(root) else {
        return;
    };

    for (name, schema) in schemas {
        let Some(schema) = schema.as_object() else {
            continue;
        };
        let location = vec!["components", "schemas", name.as_str()];

        if !SHAPE_KEYWORDS.iter().any(|k| schema.contains_key(*k)) {
            findings.warning(location.clone(), format!("Schema '{name}' has no type"));
        }
        match schema.get("type").and_then(Value::as_str) {
            Some("object")
                if !schema.contains_key("properties")
                    && !schema.contains_key("additionalProperties") =>
            {
                findings.warning(location, format!("Object schema '{name}' defines no properties"));
            }
            Some("array") if !schema.contains_key("items") => {
                findings.error(location, format!("Array schema '{name}' is missing 'items'"));
            }
            _ => {}
        }
    }
}

fn component_schemas(root: &Object) -> Option<&Object> {
    root.get("components")?.get("schemas")?.as_object()
}

/// Warn about `#/components/schemas/<Name>` references whose target is
/// not defined.
fn check_schema_refs(root: &Object, findings: &mut Findings) {
    let defined = component_schemas(root);
    let mut path = Vec::new();
    for (key, value) in root {
        path.push(key.clone());
        walk_refs(value, &mut path, defined, findings);
        path.pop();
    }
}

fn walk_refs(value: &Value, path: &mut Vec<String>, defined: Option<&Object>, findings: &mut Findings) {
    match value {
        Value::Object(map) => {
            if let Some(name) = map
                .get("$ref")
                .and_then(Value::as_str)
                .and_then(|r| r.strip_prefix(SCHEMA_REF_PREFIX))
            {
                if !defined.is_some_and(|d| d.contains_key(name)) {
                    let mut segments = path.clone();
                    segments.push("$ref".to_string());
                    findings
                        .warnings
                        .push(Diagnostic::warning(segments, format!("Reference to undefined schema '{name}'")));
                }
            }
            for (key, child) in map {
                path.push(key.clone());
                walk_refs(child, path, defined, findings);
                path.pop();
            }
        }
        Value::Array(items) => {
            for (index, child) in items.iter().enumerate() {
                path.push(index.to_string());
                walk_refs(child, path, defined, findings);
                path.pop();
            }
        }
        _ => {}
    }
}
