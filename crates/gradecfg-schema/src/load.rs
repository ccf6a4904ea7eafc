//! # Document Loading
//!
//! Reads configuration and schema documents from disk and runs the
//! piecewise validator over them. JSON by default; `.yaml`/`.yml` files
//! are parsed as YAML. Schemas have their references inlined once, right
//! after loading.

use std::path::Path;

use serde_json::Value;

use crate::error::{ConfigCheckError, LoadError};
use crate::matcher::SchemaDraft;
use crate::piecewise::{PiecewiseValidator, ValidationOptions};
use crate::resolve::SchemaResolver;

/// Load a configuration document.
///
/// # Errors
///
/// [`LoadError::DocumentLoadError`] if the file cannot be read or parsed.
pub fn load_document(path: &Path) -> Result<Value, LoadError> {
    parse_file(path).map_err(|reason| LoadError::DocumentLoadError {
        path: path.display().to_string(),
        reason,
    })
}

/// Load a schema document and resolve its references.
///
/// # Errors
///
/// [`LoadError::SchemaLoadError`] if the file cannot be read or parsed,
/// [`LoadError::Resolve`] if a reference cannot be inlined.
pub fn load_schema(path: &Path, resolver: &impl SchemaResolver) -> Result<Value, LoadError> {
    let raw = parse_file(path).map_err(|reason| LoadError::SchemaLoadError {
        path: path.display().to_string(),
        reason,
    })?;
    resolver.resolve(raw).map_err(|source| LoadError::Resolve {
        path: path.display().to_string(),
        source,
    })
}

fn parse_file(path: &Path) -> Result<Value, String> {
    let content =
        std::fs::read_to_string(path).map_err(|e| format!("cannot read file: {e}"))?;

    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    match ext {
        "yaml" | "yml" => {
            serde_yaml::from_str(&content).map_err(|e| format!("invalid YAML: {e}"))
        }
        _ => serde_json::from_str(&content).map_err(|e| format!("invalid JSON: {e}")),
    }
}

/// Pick the dialect: the explicit one, else the schema's `$schema`,
/// else the default.
pub fn effective_draft(explicit: Option<SchemaDraft>, schema: &Value) -> SchemaDraft {
    explicit
        .or_else(|| SchemaDraft::detect(schema))
        .unwrap_or_default()
}

/// Load both documents and validate, stopping at the first failure.
///
/// An unset `options.draft` is taken from the schema's `$schema`.
///
/// # Errors
///
/// [`ConfigCheckError::Load`] for unreadable inputs,
/// [`ConfigCheckError::Violation`] for the first violation found.
pub fn validate_files(
    config_path: &Path,
    schema_path: &Path,
    resolver: &impl SchemaResolver,
    options: ValidationOptions,
) -> Result<(), ConfigCheckError> {
    let schema = load_schema(schema_path, resolver)?;
    let config = load_document(config_path)?;
    tracing::debug!(
        config = %config_path.display(),
        schema = %schema_path.display(),
        "validating configuration"
    );
    PiecewiseValidator::for_schema(options, &schema).validate(&config, &schema)?;
    Ok(())
}

/// Load both documents and validate, collecting every failure.
///
/// An unset `options.draft` is taken from the schema's `$schema`.
///
/// # Errors
///
/// [`ConfigCheckError::Load`] for unreadable inputs,
/// [`ConfigCheckError::Violations`] when any report was produced.
pub fn validate_files_all(
    config_path: &Path,
    schema_path: &Path,
    resolver: &impl SchemaResolver,
    options: ValidationOptions,
) -> Result<(), ConfigCheckError> {
    let schema = load_schema(schema_path, resolver)?;
    let config = load_document(config_path)?;
    let reports = PiecewiseValidator::for_schema(options, &schema).validate_all(&config, &schema);
    if reports.is_empty() {
        Ok(())
    } else {
        Err(ConfigCheckError::Violations(reports))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::InlineRefResolver;
    use serde_json::json;
    use std::io::Write;

    fn write_file(dir: &tempfile::TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_load_json_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "config.json", r#"{"testcases": []}"#);
        assert_eq!(load_document(&path).unwrap(), json!({"testcases": []}));
    }

    #[test]
    fn test_load_yaml_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "config.yml",
            "autograding_method: docker\ntestcases:\n  - type: Compilation\n    points: 2\n",
        );
        let value = load_document(&path).unwrap();
        assert_eq!(value["autograding_method"], "docker");
        assert_eq!(value["testcases"][0]["points"], 2);
    }

    #[test]
    fn test_invalid_json_is_document_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "config.json", "{ not json");
        let err = load_document(&path).unwrap_err();
        match err {
            LoadError::DocumentLoadError { reason, .. } => assert!(reason.contains("invalid JSON")),
            other => panic!("Expected DocumentLoadError, got: {other}"),
        }
    }

    #[test]
    fn test_missing_file_is_document_load_error() {
        let err = load_document(Path::new("/nonexistent/config.json")).unwrap_err();
        assert!(matches!(err, LoadError::DocumentLoadError { .. }), "got {err}");
    }

    #[test]
    fn test_schema_refs_resolved_on_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "schema.json",
            r##"{"properties": {"a": {"$ref": "#/definitions/a"}}, "definitions": {"a": {"type": "string"}}}"##,
        );
        let schema = load_schema(&path, &InlineRefResolver::new()).unwrap();
        assert_eq!(schema["properties"]["a"], json!({"type": "string"}));
    }

    #[test]
    fn test_dangling_schema_ref_is_resolve_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "schema.json", r##"{"properties": {"a": {"$ref": "#/nope"}}}"##);
        let err = load_schema(&path, &InlineRefResolver::new()).unwrap_err();
        assert!(matches!(err, LoadError::Resolve { .. }), "got {err}");
    }

    #[test]
    fn test_unreadable_schema_is_schema_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "schema.json", "[");
        let err = load_schema(&path, &InlineRefResolver::new()).unwrap_err();
        assert!(matches!(err, LoadError::SchemaLoadError { .. }), "got {err}");
    }

    #[test]
    fn test_effective_draft_precedence() {
        let d2020 = json!({"$schema": "https://json-schema.org/draft/2020-12/schema"});
        assert_eq!(effective_draft(Some(SchemaDraft::Draft4), &d2020), SchemaDraft::Draft4);
        assert_eq!(effective_draft(None, &d2020), SchemaDraft::Draft202012);
        assert_eq!(effective_draft(None, &json!({})), SchemaDraft::Draft7);
    }

    #[test]
    fn test_validate_files_honours_schema_dialect() {
        let dir = tempfile::tempdir().unwrap();
        let schema = json!({
            "$schema": "https://json-schema.org/draft/2020-12/schema",
            "type": "object",
            "dependentRequired": {"autograding": ["testcases"]},
            "properties": {
                "autograding": {"type": "object"},
                "autograding_method": {},
                "container_options": {},
                "resource_limits": {},
                "testcases": {"type": "array"}
            },
            "definitions": {
                "testcase": {"properties": {}},
                "submission_limit": {"required": ["max_submissions"]},
                "filecheck": {"required": ["actual_file"]},
                "container": {},
                "abstract_validation_object": {},
                "validator_definitions": {}
            }
        });
        let schema_path = write_file(&dir, "schema.json", &schema.to_string());
        let config_path = write_file(&dir, "config.json", r#"{"autograding": {}}"#);

        let err = validate_files(
            &config_path,
            &schema_path,
            &InlineRefResolver::new(),
            ValidationOptions::default(),
        )
        .unwrap_err();
        assert_eq!(err.reports().len(), 1);
        assert_eq!(err.reports()[0].title, crate::piecewise::WHOLE_CONFIG_TITLE);

        let err = validate_files_all(
            &config_path,
            &schema_path,
            &InlineRefResolver::new(),
            ValidationOptions::default(),
        )
        .unwrap_err();
        assert_eq!(err.reports().len(), 1);

        // Draft 7 has no `dependentRequired`, so forcing it accepts the file.
        let draft7 = ValidationOptions {
            draft: Some(SchemaDraft::Draft7),
            ..Default::default()
        };
        validate_files(&config_path, &schema_path, &InlineRefResolver::new(), draft7).unwrap();
    }
}
