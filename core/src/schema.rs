#![deny(missing_docs)]

//! # Service Schema
//!
//! The in-memory model of a service description plus the document loaders.
//!
//! A service document is a mapping with keys `namespace`, `service_name` and
//! `methods`; each method carries `name`, `input_type` and `output_type`.
//! Type references are opaque strings echoed verbatim into generated text;
//! the project shipping the generated code is responsible for their
//! referential integrity. Method name uniqueness, however, is enforced here:
//! a duplicate name would silently produce ambiguous dispatch code.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// One remote operation within a service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodSchema {
    /// Method name, unique within the enclosing service.
    pub name: String,

    /// Opaque type reference for the request payload.
    pub input_type: String,

    /// Opaque type reference for the response payload.
    pub output_type: String,

    /// Derived dispatch id. Never supplied by the user; filled in by
    /// [`crate::ident::assign_ids`].
    #[serde(skip)]
    pub id: u32,
}

/// The root entity: a named collection of remote-procedure methods.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceSchema {
    /// Code-organization scope; also an input to id hashing.
    pub namespace: String,

    /// Service name within the namespace.
    pub service_name: String,

    /// Extra imports echoed into the generated artifact header.
    #[serde(default)]
    pub includes: Vec<String>,

    /// Ordered method list. Order drives generated listing order only;
    /// identity is order-independent.
    pub methods: Vec<MethodSchema>,

    /// Derived service id. Never supplied by the user.
    #[serde(skip)]
    pub id: u32,
}

/// Parses a JSON service document.
pub fn parse_service_document(content: &str) -> AppResult<ServiceSchema> {
    let schema: ServiceSchema = serde_json::from_str(content)
        .map_err(|e| AppError::Parse(format!("Failed to parse service JSON: {}", e)))?;
    validate_method_names(&schema)?;
    Ok(schema)
}

/// Parses a YAML service document.
pub fn parse_service_document_yaml(content: &str) -> AppResult<ServiceSchema> {
    let schema: ServiceSchema = serde_yaml::from_str(content)
        .map_err(|e| AppError::Parse(format!("Failed to parse service YAML: {}", e)))?;
    validate_method_names(&schema)?;
    Ok(schema)
}

/// Reads and parses a service document, dispatching on the file extension.
///
/// `.yaml`/`.yml` documents go through the YAML parser; everything else is
/// treated as JSON.
pub fn load_service_file(path: &Path) -> AppResult<ServiceSchema> {
    let content = fs::read_to_string(path)
        .map_err(|e| AppError::General(format!("Failed to read {:?}: {}", path, e)))?;

    match path.extension().and_then(|e| e.to_str()) {
        Some("yaml") | Some("yml") => parse_service_document_yaml(&content),
        _ => parse_service_document(&content),
    }
}

/// Rejects services declaring the same method name twice.
fn validate_method_names(schema: &ServiceSchema) -> AppResult<()> {
    let mut seen = BTreeSet::new();
    for method in &schema.methods {
        if !seen.insert(method.name.as_str()) {
            return Err(AppError::DuplicateMethod(format!(
                "{}::{}::{}",
                schema.namespace, schema.service_name, method.name
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const ECHO_JSON: &str = r#"{
        "namespace": "rpc_test",
        "service_name": "echo",
        "methods": [
            {"name": "ping", "input_type": "ping_req", "output_type": "ping_resp"}
        ]
    }"#;

    #[test]
    fn test_parse_json_document() {
        let schema = parse_service_document(ECHO_JSON).unwrap();
        assert_eq!(schema.namespace, "rpc_test");
        assert_eq!(schema.service_name, "echo");
        assert_eq!(schema.methods.len(), 1);
        assert_eq!(schema.methods[0].name, "ping");
        assert_eq!(schema.methods[0].input_type, "ping_req");
        assert_eq!(schema.methods[0].output_type, "ping_resp");
        // Ids are derived later, never read from the document
        assert_eq!(schema.id, 0);
        assert_eq!(schema.methods[0].id, 0);
    }

    #[test]
    fn test_parse_yaml_document() {
        let yaml = r#"
namespace: cluster
service_name: heartbeat
methods:
  - name: beat
    input_type: beat_request
    output_type: beat_reply
"#;
        let schema = parse_service_document_yaml(yaml).unwrap();
        assert_eq!(schema.service_name, "heartbeat");
        assert_eq!(schema.methods[0].output_type, "beat_reply");
    }

    #[test]
    fn test_supplied_ids_are_ignored() {
        let json = r#"{
            "namespace": "ns",
            "service_name": "svc",
            "id": 42,
            "methods": [
                {"name": "m", "input_type": "a", "output_type": "b", "id": 7}
            ]
        }"#;
        let schema = parse_service_document(json).unwrap();
        assert_eq!(schema.id, 0);
        assert_eq!(schema.methods[0].id, 0);
    }

    #[test]
    fn test_missing_required_key_is_parse_error() {
        let err = parse_service_document(r#"{"namespace": "ns"}"#).unwrap_err();
        assert!(matches!(err, AppError::Parse(_)));
    }

    #[test]
    fn test_malformed_document_is_parse_error() {
        let err = parse_service_document("{not json").unwrap_err();
        assert!(format!("{}", err).contains("Parse Error"));
    }

    #[test]
    fn test_empty_methods_is_valid() {
        let schema = parse_service_document(
            r#"{"namespace": "ns", "service_name": "svc", "methods": []}"#,
        )
        .unwrap();
        assert!(schema.methods.is_empty());
    }

    #[test]
    fn test_duplicate_method_name_rejected() {
        let json = r#"{
            "namespace": "ns",
            "service_name": "svc",
            "methods": [
                {"name": "m", "input_type": "a", "output_type": "b"},
                {"name": "m", "input_type": "c", "output_type": "d"}
            ]
        }"#;
        let err = parse_service_document(json).unwrap_err();
        match err {
            AppError::DuplicateMethod(detail) => assert_eq!(detail, "ns::svc::m"),
            other => panic!("expected DuplicateMethod, got {}", other),
        }
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        // The loader is intentionally permissive
        let json = r#"{
            "namespace": "ns",
            "service_name": "svc",
            "comment": "future extension",
            "methods": []
        }"#;
        assert!(parse_service_document(json).is_ok());
    }

    #[test]
    fn test_load_service_file_dispatches_on_extension() {
        let dir = tempfile::tempdir().unwrap();

        let json_path = dir.path().join("echo.json");
        fs::write(&json_path, ECHO_JSON).unwrap();
        assert_eq!(load_service_file(&json_path).unwrap().service_name, "echo");

        let yaml_path = dir.path().join("echo.yaml");
        fs::write(
            &yaml_path,
            "namespace: rpc_test\nservice_name: echo\nmethods: []\n",
        )
        .unwrap();
        assert_eq!(load_service_file(&yaml_path).unwrap().service_name, "echo");
    }

    #[test]
    fn test_load_service_file_missing_path() {
        let err = load_service_file(Path::new("/nonexistent/echo.json")).unwrap_err();
        assert!(format!("{}", err).contains("Failed to read"));
    }
}
