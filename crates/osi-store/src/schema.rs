//! JSON Schema validation of definition documents.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::{Result, StoreError};

/// A compiled definition schema.
pub struct SchemaValidator {
    path: PathBuf,
    validator: jsonschema::Validator,
}

impl std::fmt::Debug for SchemaValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaValidator")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl SchemaValidator {
    /// Reads and compiles the schema at `path`.
    pub fn from_file(path: &Path) -> Result<Self> {
        let schema = read_json(path)?;
        let validator =
            jsonschema::validator_for(&schema).map_err(|err| StoreError::InvalidSchema {
                path: path.to_path_buf(),
                message: err.to_string(),
            })?;
        tracing::debug!(path = %path.display(), "compiled schema");
        Ok(Self {
            path: path.to_path_buf(),
            validator,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Every violation of `instance`, in schema order. Empty means valid.
    pub fn validate(&self, instance: &Value) -> Vec<String> {
        self.validator
            .iter_errors(instance)
            .map(|error| error.to_string())
            .collect()
    }

    /// Reads `path` as JSON and validates it.
    pub fn validate_file(&self, path: &Path) -> Result<Vec<String>> {
        let instance = read_json(path)?;
        let errors = self.validate(&instance);
        tracing::info!(
            path = %path.display(),
            schema = %self.path.display(),
            errors = errors.len(),
            "validated definition"
        );
        Ok(errors)
    }
}

fn read_json(path: &Path) -> Result<Value> {
    let raw = fs::read(path).map_err(|source| StoreError::io(path, source))?;
    serde_json::from_slice(&raw).map_err(|source| StoreError::Json {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const SCHEMA: &str = r#"{
        "type": "object",
        "required": ["title", "inclusion_criteria"],
        "properties": {
            "title": {"type": "string"},
            "inclusion_criteria": {"type": "array"}
        }
    }"#;

    fn validator(dir: &Path) -> SchemaValidator {
        let path = dir.join("schema.json");
        fs::write(&path, SCHEMA).unwrap();
        SchemaValidator::from_file(&path).unwrap()
    }

    #[test]
    fn accepts_conforming_documents() {
        let dir = tempfile::tempdir().unwrap();
        let validator = validator(dir.path());

        let errors = validator.validate(&json!({"title": "Sari", "inclusion_criteria": []}));

        assert!(errors.is_empty(), "{errors:?}");
    }

    #[test]
    fn reports_each_violation() {
        let dir = tempfile::tempdir().unwrap();
        let validator = validator(dir.path());

        let errors = validator.validate(&json!({"title": 3}));

        assert_eq!(errors.len(), 2, "{errors:?}");
        assert!(errors.iter().any(|error| error.contains("inclusion_criteria")));
    }

    #[test]
    fn invalid_json_document_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let validator = validator(dir.path());
        let document = dir.path().join("broken.json");
        fs::write(&document, "{not json").unwrap();

        let err = validator.validate_file(&document).unwrap_err();

        assert!(matches!(err, StoreError::Json { .. }));
    }

    #[test]
    fn malformed_schema_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("schema.json");
        fs::write(&path, r#"{"type": 12}"#).unwrap();

        let err = SchemaValidator::from_file(&path).unwrap_err();

        assert!(matches!(err, StoreError::InvalidSchema { .. }));
    }
}
