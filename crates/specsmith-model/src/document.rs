//! Immutable update surface of the document model.
//!
//! Every method takes `&self` and returns a new value. Only the branch
//! being changed is rebuilt; sibling collections keep sharing their `Arc`.

use serde_json::Value;
use tracing::{debug, warn};

use crate::error::ModelError;
use crate::list::{self, list_ops, list_update};
use crate::migrate::migrate_legacy_format;
use crate::model::{
    Document, Items, List, Method, Operation, Parameter, Path, Property, Response, Schema,
    SecurityScheme, Server, Tag,
};
use crate::{operation_id, path_params, templates};

/// Status codes and descriptions appended by
/// [`Operation::with_common_error_responses`].
pub const COMMON_ERROR_RESPONSES: &[(&str, &str)] = &[
    ("400", "Bad Request"),
    ("401", "Unauthorized"),
    ("403", "Forbidden"),
    ("404", "Not Found"),
    ("500", "Internal Server Error"),
];

/// Name of the schema common error responses point at, when present.
pub const ERROR_SCHEMA: &str = "Error";

impl Operation {
    /// A new operation for `method` on `template`, with synced path
    /// parameters, a generated operation id and a default `200` response.
    pub fn new(method: Method, template: &str) -> Self {
        Self {
            method,
            operation_id: operation_id::generate(method.as_str(), template),
            parameters: List::new(path_params::sync(&[], template)),
            responses: List::new(vec![Response::new("200", "Successful response")]),
            ..Self::default()
        }
    }

    list_ops!(parameters: Parameter, add_parameter, remove_parameter, move_parameter);
    list_update!(parameters: Parameter, update_parameter);
    list_ops!(responses: Response, add_response, remove_response, move_response);
    list_update!(responses: Response, update_response);
    list_ops!(tags: String, add_tag, remove_tag, move_tag);

    /// Append the canned 4xx/5xx responses.
    ///
    /// Each points at the `Error` schema when `document` has one. Status
    /// codes the operation already declares are left alone.
    pub fn with_common_error_responses(&self, document: &Document) -> Self {
        let schema_ref = if document.schema(ERROR_SCHEMA).is_some() {
            ERROR_SCHEMA
        } else {
            ""
        };

        let mut responses = (*self.responses).clone();
        for (status, description) in COMMON_ERROR_RESPONSES {
            if responses.iter().any(|r| r.status == *status) {
                continue;
            }
            responses.push(Response::new(*status, *description).with_schema_ref(schema_ref));
        }

        Self {
            responses: List::new(responses),
            ..self.clone()
        }
    }

    /// Copy with fresh parameter and response lists.
    fn deep_copy(&self) -> Self {
        Self {
            parameters: list::deep_copy(&self.parameters),
            responses: list::deep_copy(&self.responses),
            tags: list::deep_copy(&self.tags),
            ..self.clone()
        }
    }
}

impl Path {
    /// A new path holding a single `method` operation.
    pub fn new(template: impl Into<String>, method: Method) -> Self {
        let path = template.into();
        let operation = Operation::new(method, &path);
        Self {
            path,
            operations: List::new(vec![operation]),
        }
    }

    /// The operation bound to `method`, if any.
    pub fn operation(&self, method: Method) -> Option<&Operation> {
        self.operations.iter().find(|op| op.method == method)
    }

    /// First method, in canonical order, without an operation on this path.
    pub fn unused_method(&self) -> Option<Method> {
        Method::ALL
            .into_iter()
            .find(|method| self.operation(*method).is_none())
    }

    /// Change the template, re-syncing every operation's path parameters.
    pub fn with_template(&self, template: impl Into<String>) -> Self {
        let path = template.into();
        let operations = self
            .operations
            .iter()
            .map(|op| Operation {
                parameters: List::new(path_params::sync(&op.parameters, &path)),
                ..op.clone()
            })
            .collect();
        Self {
            path,
            operations: List::new(operations),
        }
    }

    /// Add a `method` operation seeded from the current template.
    pub fn add_operation(&self, method: Method) -> Result<Self, ModelError> {
        if self.operation(method).is_some() {
            return Err(ModelError::DuplicateMethod {
                path: self.path.clone(),
                method,
            });
        }
        Ok(Self {
            operations: list::pushed(&self.operations, Operation::new(method, &self.path)),
            ..self.clone()
        })
    }

    list_update!(operations: Operation, update_operation);

    /// Remove an operation. The caller is responsible for dropping the
    /// path if this leaves it empty; [`Document::remove_operation`] does.
    pub fn remove_operation(&self, index: usize) -> Result<Self, ModelError> {
        Ok(Self {
            operations: list::removed(&self.operations, "operations", index)?,
            ..self.clone()
        })
    }

    pub fn move_operation(&self, from: usize, to: usize) -> Result<Self, ModelError> {
        Ok(Self {
            operations: list::moved(&self.operations, "operations", from, to)?,
            ..self.clone()
        })
    }
}

impl Schema {
    list_ops!(properties: Property, add_property, remove_property, move_property);
    list_update!(properties: Property, update_property);
}

impl Document {
    /// Decode a persisted snapshot, upgrading the legacy path shape first.
    ///
    /// Paths left without operations are dropped.
    pub fn from_value(snapshot: Value) -> Result<Self, ModelError> {
        let document: Document = serde_json::from_value(migrate_legacy_format(snapshot))?;
        if document.paths.iter().all(|p| !p.operations.is_empty()) {
            return Ok(document);
        }

        let paths: Vec<Path> = document
            .paths
            .iter()
            .filter(|p| {
                let keep = !p.operations.is_empty();
                if !keep {
                    warn!(path = %p.path, "dropping path without operations");
                }
                keep
            })
            .cloned()
            .collect();
        Ok(Self {
            paths: List::new(paths),
            ..document
        })
    }

    /// Decode a persisted JSON snapshot. See [`Document::from_value`].
    pub fn from_json(snapshot: &str) -> Result<Self, ModelError> {
        let value: Value = serde_json::from_str(snapshot)?;
        Self::from_value(value)
    }

    /// Encode a snapshot for persistence.
    pub fn to_json(&self) -> Result<String, ModelError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Look up a component schema by name.
    pub fn schema(&self, name: &str) -> Option<&Schema> {
        self.schemas.iter().find(|s| s.name == name)
    }

    /// Look up a security scheme by name.
    pub fn security_scheme(&self, name: &str) -> Option<&SecurityScheme> {
        self.security_schemes.iter().find(|s| s.name == name)
    }

    /// Schema names referenced somewhere in the document that no schema
    /// currently defines, in first-seen order.
    pub fn unresolved_refs(&self) -> Vec<String> {
        let mut refs: Vec<&str> = Vec::new();

        for op in self.paths.iter().flat_map(|p| p.operations.iter()) {
            if let Some(body) = &op.request_body {
                refs.push(&body.schema_ref);
            }
            refs.extend(op.responses.iter().map(|r| r.schema_ref.as_str()));
        }

        for schema in self.schemas.iter() {
            if let Some(Items::Ref { reference }) = &schema.items {
                refs.push(reference);
            }
            for prop in schema.properties.iter() {
                if let Some(target) = &prop.schema_ref {
                    refs.push(target);
                }
                if let Some(Items::Ref { reference }) = &prop.items {
                    refs.push(reference);
                }
            }
        }

        let mut missing: Vec<String> = Vec::new();
        for name in refs {
            if !name.is_empty()
                && self.schema(name).is_none()
                && !missing.iter().any(|m| m == name)
            {
                missing.push(name.to_string());
            }
        }
        missing
    }

    list_ops!(servers: Server, add_server, remove_server, move_server);
    list_update!(servers: Server, update_server);
    list_ops!(security_schemes: SecurityScheme, add_security_scheme, remove_security_scheme, move_security_scheme);
    list_update!(security_schemes: SecurityScheme, update_security_scheme);
    list_ops!(tags: Tag, add_tag, remove_tag, move_tag);
    list_update!(tags: Tag, update_tag);
    list_ops!(schemas: Schema, add_schema, remove_schema, move_schema);
    list_update!(schemas: Schema, update_schema);
    list_ops!(paths: Path, add_path, remove_path, move_path);

    /// Replace the path at `index` with `f(path)`.
    ///
    /// If the new path has no operations it is removed instead.
    pub fn update_path(
        &self,
        index: usize,
        f: impl FnOnce(&Path) -> Path,
    ) -> Result<Self, ModelError> {
        let paths = list::updated(&self.paths, "paths", index, f)?;
        let paths = if paths[index].operations.is_empty() {
            debug!(path = %paths[index].path, "removing path left without operations");
            list::removed(&paths, "paths", index)?
        } else {
            paths
        };
        Ok(Self {
            paths,
            ..self.clone()
        })
    }

    /// Replace one operation of one path.
    pub fn update_operation(
        &self,
        path_index: usize,
        operation_index: usize,
        f: impl FnOnce(&Operation) -> Operation,
    ) -> Result<Self, ModelError> {
        let path = self.path_at(path_index)?;
        let next = path.update_operation(operation_index, f)?;
        self.update_path(path_index, |_| next)
    }

    /// Remove an operation, dropping its path when it was the last one.
    pub fn remove_operation(
        &self,
        path_index: usize,
        operation_index: usize,
    ) -> Result<Self, ModelError> {
        let path = self.path_at(path_index)?;
        let next = path.remove_operation(operation_index)?;
        self.update_path(path_index, |_| next)
    }

    /// Append the canned error responses to one operation.
    pub fn add_common_error_responses(
        &self,
        path_index: usize,
        operation_index: usize,
    ) -> Result<Self, ModelError> {
        self.update_operation(path_index, operation_index, |op| {
            op.with_common_error_responses(self)
        })
    }

    /// Duplicate an operation.
    ///
    /// The copy goes to the first method still free on the same path, with
    /// an operation id generated for that method. When every method is taken
    /// a new `{path}_copy` path is inserted after the original, holding only
    /// the copy with its operation id suffixed `_copy`.
    pub fn duplicate_operation(
        &self,
        path_index: usize,
        operation_index: usize,
    ) -> Result<Self, ModelError> {
        let path = self.path_at(path_index)?;
        let source = path.operations.get(operation_index).ok_or_else(|| {
            ModelError::IndexOutOfRange {
                collection: "operations",
                index: operation_index,
                len: path.operations.len(),
            }
        })?;

        match path.unused_method() {
            Some(method) => {
                let copy = Operation {
                    method,
                    operation_id: operation_id::generate(method.as_str(), &path.path),
                    ..source.deep_copy()
                };
                let next = Path {
                    operations: list::pushed(&path.operations, copy),
                    ..path.clone()
                };
                self.update_path(path_index, |_| next)
            }
            None => {
                let copy = Operation {
                    operation_id: format!("{}_copy", source.operation_id),
                    ..source.deep_copy()
                };
                let new_path = Path {
                    path: format!("{}_copy", path.path),
                    operations: List::new(vec![copy]),
                };
                Ok(Self {
                    paths: list::inserted(&self.paths, path_index + 1, new_path),
                    ..self.clone()
                })
            }
        }
    }

    /// Duplicate a schema as `{name}_copy`, right after the original.
    pub fn duplicate_schema(&self, index: usize) -> Result<Self, ModelError> {
        let source = self
            .schemas
            .get(index)
            .ok_or(ModelError::IndexOutOfRange {
                collection: "schemas",
                index,
                len: self.schemas.len(),
            })?;
        let copy = Schema {
            name: format!("{}_copy", source.name),
            properties: list::deep_copy(&source.properties),
            ..source.clone()
        };
        Ok(Self {
            schemas: list::inserted(&self.schemas, index + 1, copy),
            ..self.clone()
        })
    }

    /// Append a schema from the template library.
    ///
    /// A schema that already uses the template's name is kept and the
    /// document is returned unchanged.
    pub fn insert_template(&self, key: &str) -> Result<Self, ModelError> {
        let schema =
            templates::template(key).ok_or_else(|| ModelError::UnknownTemplate(key.to_string()))?;
        if self.schema(&schema.name).is_some() {
            debug!(template = key, "schema already present, skipping template");
            return Ok(self.clone());
        }
        Ok(self.add_schema(schema))
    }

    fn path_at(&self, index: usize) -> Result<&Path, ModelError> {
        self.paths.get(index).ok_or(ModelError::IndexOutOfRange {
            collection: "paths",
            index,
            len: self.paths.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ParameterLocation, PropertyType, RequestBody};
    use serde_json::json;
    use std::sync::Arc;

    fn items_document() -> Document {
        Document::default()
            .add_server(Server {
                url: "https://api.example.com".to_string(),
                description: "Production".to_string(),
            })
            .add_path(Path::new("/items/{id}", Method::Get))
            .add_schema(
                Schema::object("Item")
                    .with_properties(vec![Property::new("id", PropertyType::String).required()]),
            )
    }

    #[test]
    fn new_operation_is_seeded_from_template() {
        let op = Operation::new(Method::Get, "/items/{id}");
        assert_eq!(op.operation_id, "getItems");
        assert_eq!(op.parameters.len(), 1);
        assert_eq!(op.parameters[0].name, "id");
        assert_eq!(op.parameters[0].location, ParameterLocation::Path);
        assert_eq!(op.responses[0].status, "200");
    }

    #[test]
    fn untouched_branches_keep_identity() {
        let doc = items_document();
        let next = doc
            .update_schema(0, |s| Schema {
                description: "An item".to_string(),
                ..s.clone()
            })
            .unwrap();

        assert!(Arc::ptr_eq(&doc.paths, &next.paths));
        assert!(Arc::ptr_eq(&doc.servers, &next.servers));
        assert!(!Arc::ptr_eq(&doc.schemas, &next.schemas));
        assert_eq!(doc.schemas[0].description, "");
        assert_eq!(next.schemas[0].description, "An item");
        assert!(Arc::ptr_eq(
            &doc.schemas[0].properties,
            &next.schemas[0].properties
        ));
    }

    #[test]
    fn template_change_resyncs_parameters() {
        let doc = items_document();
        let next = doc
            .update_path(0, |p| p.with_template("/stores/{store}/items/{id}"))
            .unwrap();
        let names: Vec<&str> = next.paths[0].operations[0]
            .parameters
            .iter()
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(names, vec!["store", "id"]);
    }

    #[test]
    fn add_operation_rejects_duplicate_method() {
        let path = Path::new("/items", Method::Get);
        assert!(matches!(
            path.add_operation(Method::Get),
            Err(ModelError::DuplicateMethod { .. })
        ));
        let path = path.add_operation(Method::Post).unwrap();
        assert_eq!(path.operations[1].operation_id, "postItems");
    }

    #[test]
    fn removing_last_operation_removes_path() {
        let doc = items_document();
        let next = doc.remove_operation(0, 0).unwrap();
        assert!(next.paths.is_empty());
    }

    #[test]
    fn duplicate_uses_free_method() {
        let doc = items_document();
        let next = doc.duplicate_operation(0, 0).unwrap();
        assert_eq!(next.paths.len(), 1);
        let ops = &next.paths[0].operations;
        assert_eq!(ops.len(), 2);
        assert_eq!(ops[1].method, Method::Post);
        assert_eq!(ops[1].operation_id, "postItems");
        assert_eq!(ops[1].parameters, ops[0].parameters);
        assert!(!Arc::ptr_eq(&ops[1].parameters, &ops[0].parameters));
    }

    #[test]
    fn duplicate_with_all_methods_taken_creates_copy_path() {
        let mut path = Path::new("/items", Method::Get);
        for method in [Method::Post, Method::Put, Method::Patch, Method::Delete] {
            path = path.add_operation(method).unwrap();
        }
        let doc = Document::default()
            .add_path(path)
            .add_path(Path::new("/other", Method::Get));

        let next = doc.duplicate_operation(0, 0).unwrap();
        assert_eq!(next.paths.len(), 3);
        assert_eq!(next.paths[0].operations.len(), 5);
        assert_eq!(next.paths[1].path, "/items_copy");
        assert_eq!(next.paths[1].operations.len(), 1);
        assert_eq!(next.paths[1].operations[0].method, Method::Get);
        assert_eq!(next.paths[1].operations[0].operation_id, "getItems_copy");
        assert_eq!(next.paths[2].path, "/other");
    }

    #[test]
    fn duplicate_schema_appends_copy_suffix() {
        let doc = items_document();
        let next = doc.duplicate_schema(0).unwrap();
        assert_eq!(next.schemas.len(), 2);
        assert_eq!(next.schemas[1].name, "Item_copy");
        assert_eq!(next.schemas[1].properties, doc.schemas[0].properties);
        assert!(!Arc::ptr_eq(
            &next.schemas[1].properties,
            &doc.schemas[0].properties
        ));
    }

    #[test]
    fn common_errors_reference_error_schema_when_present() {
        let doc = items_document();
        let next = doc.add_common_error_responses(0, 0).unwrap();
        let responses = &next.paths[0].operations[0].responses;
        let statuses: Vec<&str> = responses.iter().map(|r| r.status.as_str()).collect();
        assert_eq!(statuses, vec!["200", "400", "401", "403", "404", "500"]);
        assert!(responses.iter().all(|r| r.schema_ref.is_empty()));

        let doc = items_document().insert_template("error").unwrap();
        let next = doc.add_common_error_responses(0, 0).unwrap();
        let responses = &next.paths[0].operations[0].responses;
        assert_eq!(responses[1].schema_ref, "Error");
        assert_eq!(responses[5].description, "Internal Server Error");
    }

    #[test]
    fn common_errors_skip_declared_statuses() {
        let op = Operation::new(Method::Get, "/items")
            .add_response(Response::new("404", "No such item"));
        let next = op.with_common_error_responses(&Document::default());
        let not_found: Vec<&Response> =
            next.responses.iter().filter(|r| r.status == "404").collect();
        assert_eq!(not_found.len(), 1);
        assert_eq!(not_found[0].description, "No such item");
    }

    #[test]
    fn insert_template_handles_unknown_and_existing() {
        let doc = Document::default();
        assert!(matches!(
            doc.insert_template("missing"),
            Err(ModelError::UnknownTemplate(_))
        ));

        let once = doc.insert_template("pagination").unwrap();
        let twice = once.insert_template("pagination").unwrap();
        assert_eq!(once.schemas.len(), 1);
        assert_eq!(twice, once);
    }

    #[test]
    fn unresolved_refs_lists_missing_schemas_once() {
        let op = Operation {
            request_body: Some(RequestBody {
                schema_ref: "NewItem".to_string(),
                ..RequestBody::default()
            }),
            ..Operation::new(Method::Post, "/items")
        }
        .add_response(Response::new("201", "Created").with_schema_ref("Item"))
        .add_response(Response::new("409", "Conflict").with_schema_ref("NewItem"));
        let doc = items_document().add_path(Path {
            path: "/items".to_string(),
            operations: List::new(vec![op]),
        });
        assert_eq!(doc.unresolved_refs(), vec!["NewItem".to_string()]);
    }

    #[test]
    fn legacy_snapshot_loads_like_current_one() {
        let legacy = json!({
            "openapiVersion": "3.0.0",
            "info": {"title": "Legacy", "version": "1.0.0"},
            "paths": [
                {"path": "/health", "method": "get", "operationId": "getHealth"},
                {"path": "/empty"}
            ]
        });
        let doc = Document::from_value(legacy).unwrap();
        assert_eq!(doc.paths.len(), 1);
        assert_eq!(doc.paths[0].operations[0].operation_id, "getHealth");

        let again = Document::from_json(&doc.to_json().unwrap()).unwrap();
        assert_eq!(again, doc);
    }

    #[test]
    fn index_errors_are_returned() {
        let doc = Document::default();
        assert!(matches!(
            doc.remove_server(0),
            Err(ModelError::IndexOutOfRange { collection: "servers", .. })
        ));
        assert!(doc.duplicate_operation(0, 0).is_err());
    }
}
