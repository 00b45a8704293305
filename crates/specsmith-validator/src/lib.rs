//! OpenAPI document validator.
//!
//! Validation runs in stages over the raw YAML text:
//!
//! 1. parse (a failure stops here with one error);
//! 2. hand-written structural checks;
//! 3. the full OpenAPI 3.0 JSON Schema, on a blocking worker thread;
//! 4. best-effort line attribution for every finding.
//!
//! Nothing here returns `Err`: every failure ends up in the
//! [`ValidationReport`].

mod diagnostic;
pub mod error;
pub mod locate;
mod schema;
mod session;
mod structural;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

pub use diagnostic::{Diagnostic, Severity};
pub use error::CheckError;
pub use locate::{locate_in, locate_line};
pub use session::{Generation, ValidationSession};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    /// True when there are no errors. Warnings never affect validity.
    pub is_valid: bool,
    pub errors: Vec<Diagnostic>,
    pub warnings: Vec<Diagnostic>,
}

impl ValidationReport {
    fn new(errors: Vec<Diagnostic>, warnings: Vec<Diagnostic>) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
            warnings,
        }
    }
}

/// Validate OpenAPI YAML (or JSON) text.
pub async fn validate(text: &str) -> ValidationReport {
    let root: Value = match serde_yaml::from_str(text) {
        Ok(root) => root,
        Err(err) => {
            let line = err.location().map(|l| l.line());
            let error = Diagnostic::document_error(format!("YAML parse error: {err}")).at_line(line);
            return ValidationReport::new(vec![error], Vec::new());
        }
    };
    let Some(object) = root.as_object() else {
        let error = Diagnostic::document_error("Document root must be a mapping");
        return ValidationReport::new(vec![error], Vec::new());
    };

    let structural::Findings {
        mut errors,
        warnings,
    } = structural::check(object);

    let (root, violations) = run_schema_check(root).await;
    let violations = match violations {
        Ok(violations) => violations,
        Err(err) => {
            warn!(error = %err, "schema validation stage failed");
            vec![Diagnostic::document_error(err.to_string())]
        }
    };
    let structural_count = errors.len();
    for violation in violations {
        if !already_reported(&errors[..structural_count], &violation) {
            errors.push(violation);
        }
    }

    let errors = with_lines(text, root.as_ref(), errors);
    let warnings = with_lines(text, root.as_ref(), warnings);
    debug!(
        errors = errors.len(),
        warnings = warnings.len(),
        "validation finished"
    );
    ValidationReport::new(errors, warnings)
}

/// Run the schema pass on a blocking worker, handing the document back for
/// line attribution. The document is lost only if the worker fails.
async fn run_schema_check(root: Value) -> (Option<Value>, Result<Vec<Diagnostic>, CheckError>) {
    let worker = tokio::task::spawn_blocking(move || {
        let violations = schema::check(&root);
        (root, violations)
    });
    match worker.await {
        Ok((root, violations)) => (Some(root), violations),
        Err(err) => (None, Err(err.into())),
    }
}

/// A schema violation is redundant when a structural error already sits at
/// its location or beneath it.
fn already_reported(structural: &[Diagnostic], violation: &Diagnostic) -> bool {
    !violation.segments.is_empty()
        && structural
            .iter()
            .any(|e| e.segments.starts_with(&violation.segments))
}

fn with_lines(text: &str, root: Option<&Value>, diagnostics: Vec<Diagnostic>) -> Vec<Diagnostic> {
    diagnostics
        .into_iter()
        .map(|d| match d.line {
            Some(_) => d,
            None => {
                let line = locate_in(text, root, &d.segments);
                d.at_line(line)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PETSTORE: &str = r##"openapi: 3.0.3
info:
  title: Petstore
  version: 1.0.0
servers:
  - url: https://petstore.example.com/v1
tags:
  - name: pets
paths:
  /pets:
    get:
      tags: [pets]
      operationId: listPets
      parameters:
        - name: limit
          in: query
          schema:
            type: integer
            format: int32
      responses:
        '200':
          description: A list of pets
          content:
            application/json:
              schema:
                type: array
                items:
                  $ref: '#/components/schemas/Pet'
  /pets/{petId}:
    get:
      operationId: getPet
      parameters:
        - name: petId
          in: path
          required: true
          schema:
            type: string
      responses:
        '200':
          description: A pet
          content:
            application/json:
              schema:
                $ref: '#/components/schemas/Pet'
        default:
          description: Unexpected error
components:
  securitySchemes:
    bearerAuth:
      type: http
      scheme: bearer
  schemas:
    Pet:
      type: object
      required: [id, name]
      properties:
        id:
          type: integer
          format: int64
        name:
          type: string
        tag:
          type: string
          nullable: true
security:
  - bearerAuth: []
"##;

    #[tokio::test]
    async fn valid_document_passes() {
        let report = validate(PETSTORE).await;
        assert!(report.is_valid, "{:?}", report.errors);
        assert!(report.warnings.is_empty(), "{:?}", report.warnings);
    }

    #[tokio::test]
    async fn missing_openapi_yields_exactly_one_error() {
        let text = PETSTORE.replacen("openapi: 3.0.3\n", "", 1);
        let report = validate(&text).await;
        assert!(!report.is_valid);
        assert_eq!(report.errors.len(), 1, "{:?}", report.errors);
        assert_eq!(report.errors[0].path, "openapi");
        assert_eq!(report.errors[0].line, None);
    }

    #[tokio::test]
    async fn undeclared_path_parameter_yields_exactly_one_error() {
        let text = r#"openapi: 3.0.0
info:
  title: Items
  version: "1"
paths:
  /items/{id}:
    get:
      operationId: getItem
      responses:
        "200":
          description: ok
"#;
        let report = validate(text).await;
        assert_eq!(report.errors.len(), 1, "{:?}", report.errors);
        let error = &report.errors[0];
        assert!(error.message.contains("'id'"));
        assert_eq!(error.path, "paths./items/{id}.get");
        assert_eq!(error.line, Some(7));
    }

    #[tokio::test]
    async fn parse_error_short_circuits() {
        let report = validate("openapi: 3.0.0\ninfo: [unclosed\n").await;
        assert!(!report.is_valid);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].path, "");
        assert!(report.errors[0].message.starts_with("YAML parse error"));
        assert!(report.errors[0].line.is_some());
        assert!(report.warnings.is_empty());
    }

    #[tokio::test]
    async fn scalar_root_is_rejected() {
        let report = validate("just text").await;
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].message, "Document root must be a mapping");
    }

    #[tokio::test]
    async fn missing_info_is_reported_per_field() {
        let report = validate("openapi: 3.0.0\npaths: {}\n").await;
        let paths: Vec<_> = report.errors.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, vec!["info.title", "info.version"]);
    }

    #[tokio::test]
    async fn missing_responses_reported_once() {
        let text = "openapi: 3.0.0\ninfo: {title: T, version: '1'}\npaths:\n  /a:\n    get:\n      operationId: a\n";
        let report = validate(text).await;
        assert_eq!(report.errors.len(), 1, "{:?}", report.errors);
        assert_eq!(report.errors[0].path, "paths./a.get.responses");
    }

    #[tokio::test]
    async fn schema_violations_are_reported_with_lines() {
        let text = r#"openapi: 3.0.0
info:
  title: T
  version: "1"
paths:
  /a:
    get:
      operationId: a
      parameters:
        - name: q
          in: body
      responses:
        "200":
          description: ok
"#;
        let report = validate(text).await;
        assert_eq!(report.errors.len(), 1, "{:?}", report.errors);
        assert_eq!(report.errors[0].path, "paths./a.get.parameters.0");
        assert_eq!(report.errors[0].line, Some(9));
    }

    #[tokio::test]
    async fn warnings_do_not_affect_validity() {
        let text = r#"openapi: 3.0.0
info:
  title: T
  version: "1"
paths:
  /a:
    get:
      responses:
        "200":
          description: ok
"#;
        let report = validate(text).await;
        assert!(report.is_valid);
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].path, "paths./a.get");
        assert_eq!(report.warnings[0].line, Some(7));
    }

    #[tokio::test]
    async fn response_errors_point_at_the_status_code() {
        let text = r#"openapi: 3.0.0
info:
  title: T
  version: "1"
paths:
  /a:
    get:
      operationId: a
      responses:
        '200': ok
"#;
        let report = validate(text).await;
        assert_eq!(report.errors.len(), 1, "{:?}", report.errors);
        assert_eq!(report.errors[0].path, "paths./a.get.responses.200");
        assert_eq!(report.errors[0].line, Some(10));
    }

    #[tokio::test]
    async fn model_built_document_serializes_valid() {
        use specsmith_model::{
            Document, Method, Operation, Path, Property, PropertyType, RequestBody, Schema,
        };

        let create = Operation {
            request_body: Some(RequestBody::default()),
            ..Operation::new(Method::Post, "/items")
        };
        let document = Document::default()
            .add_path(Path::new("/items/{id}", Method::Get))
            .add_path(Path {
                path: "/items".to_string(),
                operations: std::sync::Arc::new(vec![create]),
            })
            .add_schema(Schema::object("Item").with_properties(vec![
                Property::new("anything", PropertyType::Untyped),
                Property::new("tags", PropertyType::Array),
                Property::reference("parent", "Item"),
            ]));

        let yaml = specsmith_writer::serialize(&document);
        let report = validate(&yaml).await;
        assert!(report.is_valid, "{:?}\n{yaml}", report.errors);
        assert!(report.warnings.is_empty(), "{:?}", report.warnings);
    }

    #[test]
    fn structural_errors_cover_parent_violations() {
        let structural = vec![Diagnostic::error(vec!["info", "title"], "missing")];
        assert!(already_reported(&structural, &Diagnostic::error(vec!["info"], "x")));
        assert!(already_reported(&structural, &Diagnostic::error(vec!["info", "title"], "x")));
        assert!(!already_reported(&structural, &Diagnostic::error(vec!["paths"], "x")));
        assert!(!already_reported(&structural, &Diagnostic::document_error("x")));
    }

    #[test]
    fn report_serializes_camel_case() {
        let report = ValidationReport::new(Vec::new(), Vec::new());
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["isValid"], true);
    }
}
