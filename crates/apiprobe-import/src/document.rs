// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Service description collaborators: parse a fetched body, flatten its operations.

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

static NULL: Value = Value::Null;

const HTTP_METHODS: [&str; 8] = [
    "get", "put", "post", "delete", "options", "head", "patch", "trace",
];

/// Failure to turn a fetched body into a service description.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    /// Body was empty.
    #[error("service description is empty")]
    Empty,
    /// Body was text but neither JSON nor YAML.
    #[error("service description is neither JSON nor YAML: {0}")]
    Syntax(String),
    /// Parsed fine but lacks an `openapi`/`swagger` version key.
    #[error("document is not an OpenAPI or Swagger description")]
    NotApiDescription,
}

/// A parsed OpenAPI/Swagger document.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedSpec {
    document: Value,
}

impl ParsedSpec {
    /// Wrap an already-validated document.
    pub fn new(document: Value) -> Self {
        Self { document }
    }

    /// The whole document.
    pub fn document(&self) -> &Value {
        &self.document
    }

    /// The `paths` object, or null.
    pub fn paths(&self) -> &Value {
        self.document.get("paths").unwrap_or(&NULL)
    }

    /// `openapi` (3.x) or `swagger` (2.0) version string.
    pub fn version(&self) -> Option<&str> {
        self.document
            .get("openapi")
            .or_else(|| self.document.get("swagger"))
            .and_then(Value::as_str)
    }

    /// `info.title`.
    pub fn title(&self) -> Option<&str> {
        self.document.pointer("/info/title").and_then(Value::as_str)
    }
}

/// One callable operation of the imported service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    /// Upper-case HTTP method.
    pub method: String,
    /// Path template, e.g. `/pets/{id}`.
    pub path: String,
    /// `operationId`.
    pub operation_id: Option<String>,
    /// `summary`.
    pub summary: Option<String>,
    /// `description`.
    pub description: Option<String>,
    /// `tags`.
    pub tags: Vec<String>,
    /// `deprecated`.
    pub deprecated: bool,
}

/// Turns a fetched body into a [`ParsedSpec`].
pub trait SpecParser: Send + Sync {
    /// Parse `raw`, the response data of the fetch.
    fn parse(&self, raw: &Value) -> Result<ParsedSpec, ParseError>;
}

/// Flattens a `paths` object into an ordered operation list.
pub trait OperationFlattener: Send + Sync {
    /// Operations in document order.
    fn flatten(&self, paths: &Value) -> Vec<Operation>;
}

/// Accepts JSON objects, or text holding JSON or YAML.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentParser;

impl SpecParser for DocumentParser {
    fn parse(&self, raw: &Value) -> Result<ParsedSpec, ParseError> {
        let document = match raw {
            Value::String(text) if text.trim().is_empty() => return Err(ParseError::Empty),
            Value::String(text) => serde_json::from_str::<Value>(text)
                .or_else(|_| serde_yaml::from_str::<Value>(text))
                .map_err(|err| ParseError::Syntax(err.to_string()))?,
            Value::Null => return Err(ParseError::Empty),
            other => other.clone(),
        };
        let is_api = document
            .as_object()
            .is_some_and(|o| o.contains_key("openapi") || o.contains_key("swagger"));
        if !is_api {
            return Err(ParseError::NotApiDescription);
        }
        Ok(ParsedSpec::new(document))
    }
}

/// Emits one operation per HTTP-method key of each path item.
#[derive(Debug, Clone, Copy, Default)]
pub struct PathFlattener;

impl OperationFlattener for PathFlattener {
    fn flatten(&self, paths: &Value) -> Vec<Operation> {
        let Some(paths) = paths.as_object() else {
            return Vec::new();
        };
        let mut operations = Vec::new();
        for (path, item) in paths {
            let Some(item) = item.as_object() else {
                continue;
            };
            for (method, op) in item {
                if HTTP_METHODS.contains(&method.to_ascii_lowercase().as_str()) {
                    operations.push(operation(path, method, op.as_object()));
                }
            }
        }
        operations
    }
}

fn operation(path: &str, method: &str, op: Option<&Map<String, Value>>) -> Operation {
    let text = |key: &str| {
        op.and_then(|o| o.get(key))
            .and_then(Value::as_str)
            .map(str::to_string)
    };
    Operation {
        method: method.to_ascii_uppercase(),
        path: path.to_string(),
        operation_id: text("operationId"),
        summary: text("summary"),
        description: text("description"),
        tags: op
            .and_then(|o| o.get("tags"))
            .and_then(Value::as_array)
            .map(|tags| {
                tags.iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default(),
        deprecated: op
            .and_then(|o| o.get("deprecated"))
            .and_then(Value::as_bool)
            .unwrap_or(false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_object_with_openapi_key_parses() {
        let spec = DocumentParser
            .parse(&json!({"openapi": "3.0.1", "info": {"title": "Pets"}, "paths": {}}))
            .unwrap();
        assert_eq!(spec.version(), Some("3.0.1"));
        assert_eq!(spec.title(), Some("Pets"));
    }

    #[test]
    fn yaml_text_parses() {
        let body = json!("swagger: \"2.0\"\npaths:\n  /ping:\n    get:\n      summary: ping\n");
        let spec = DocumentParser.parse(&body).unwrap();
        assert_eq!(spec.version(), Some("2.0"));
        let ops = PathFlattener.flatten(spec.paths());
        assert_eq!(ops.len(), 1);
        assert_eq!(ops[0].summary.as_deref(), Some("ping"));
    }

    #[test]
    fn json_text_parses() {
        let body = json!(r#"{"openapi":"3.1.0","paths":{}}"#);
        assert!(DocumentParser.parse(&body).is_ok());
    }

    #[test]
    fn rejects_empty_and_foreign_documents() {
        assert_eq!(DocumentParser.parse(&json!("  ")), Err(ParseError::Empty));
        assert_eq!(DocumentParser.parse(&Value::Null), Err(ParseError::Empty));
        assert_eq!(
            DocumentParser.parse(&json!({"hello": 1})),
            Err(ParseError::NotApiDescription)
        );
        assert_eq!(
            DocumentParser.parse(&json!([1, 2])),
            Err(ParseError::NotApiDescription)
        );
        assert!(matches!(
            DocumentParser.parse(&json!("{ unbalanced: [")),
            Err(ParseError::Syntax(_))
        ));
    }

    #[test]
    fn flatten_keeps_document_order_and_skips_non_methods() {
        let paths = json!({
            "/pets": {
                "parameters": [],
                "post": {"operationId": "createPet", "tags": ["pets"]},
                "get": {"operationId": "listPets", "deprecated": true}
            },
            "/pets/{id}": {
                "summary": "one pet",
                "delete": {"operationId": "deletePet"}
            }
        });
        let ops = PathFlattener.flatten(&paths);
        let ids: Vec<_> = ops
            .iter()
            .map(|o| (o.method.as_str(), o.path.as_str(), o.operation_id.as_deref()))
            .collect();
        assert_eq!(
            ids,
            vec![
                ("POST", "/pets", Some("createPet")),
                ("GET", "/pets", Some("listPets")),
                ("DELETE", "/pets/{id}", Some("deletePet")),
            ]
        );
        assert_eq!(ops[0].tags, vec!["pets".to_string()]);
        assert!(ops[1].deprecated);
    }

    #[test]
    fn flatten_of_missing_paths_is_empty() {
        assert!(PathFlattener.flatten(&Value::Null).is_empty());
    }
}
