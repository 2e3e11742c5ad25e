//! JSON-Schema backed document validation

use anyhow::{Context, Result};
use jsonschema::error::ValidationErrorKind;
use jsonschema::{Draft, JSONSchema, ValidationError};
use serde_json::Value;

use crate::domain::models::document::Document;
use crate::domain::models::issue::Issue;
use crate::domain::models::path::{Path, Segment};
use crate::domain::ports::SchemaValidator;
use crate::services::path_accessor::PathAccessor;

/// Validates documents against a compiled Draft 7 schema.
///
/// The schema sees the document with every hole dropped, so a removed slot
/// never fails an `items` rule and `minItems` counts present items only.
/// Reported positions are mapped back to the stable slot indices of the
/// original document.
pub struct JsonSchemaValidator {
    schema: JSONSchema,
}

impl std::fmt::Debug for JsonSchemaValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonSchemaValidator").finish_non_exhaustive()
    }
}

impl JsonSchemaValidator {
    /// Compile a schema value
    pub fn new(schema: &Value) -> Result<Self> {
        let schema = JSONSchema::options()
            .with_draft(Draft::Draft7)
            .compile(schema)
            .map_err(|e| anyhow::anyhow!("Failed to compile JSON schema: {}", e))?;
        Ok(Self { schema })
    }

    /// Parse and compile a schema from JSON text
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(source: &str) -> Result<Self> {
        let schema: Value = serde_json::from_str(source).context("Schema is not valid JSON")?;
        Self::new(&schema)
    }

    /// Read and compile a schema file
    pub fn from_path(path: &std::path::Path) -> Result<Self> {
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read schema file: {}", path.display()))?;
        Self::from_str(&source).with_context(|| format!("Invalid schema file: {}", path.display()))
    }

    fn to_issue(error: &ValidationError<'_>, doc: &Document) -> Issue {
        let pointer = error.instance_path.to_string();
        let mut path = resolve_pointer(doc, &pointer);

        let message = match &error.kind {
            ValidationErrorKind::Required { property } => {
                if let Some(name) = property.as_str() {
                    path.push(name);
                }
                "Required".to_string()
            }
            ValidationErrorKind::MinItems { limit } => {
                format!("Must contain at least {limit} item(s)")
            }
            ValidationErrorKind::MinLength { limit: 1 } if error.instance.as_str() == Some("") => {
                "Required".to_string()
            }
            _ => error.to_string(),
        };
        Issue::new(path, message)
    }
}

impl SchemaValidator for JsonSchemaValidator {
    fn validate(&self, doc: &Document) -> Result<(), Vec<Issue>> {
        let instance = doc.compacted().to_json();
        let result = self.schema.validate(&instance);
        match result {
            Ok(()) => Ok(()),
            Err(errors) => Err(errors.map(|e| Self::to_issue(&e, doc)).collect()),
        }
    }
}

/// Map a JSON pointer into the compacted projection back onto `doc`.
///
/// A numeric token only becomes an index where the document holds a
/// sequence at that point; there it names the n-th present item.
fn resolve_pointer(doc: &Document, pointer: &str) -> Path {
    let accessor = PathAccessor::new();
    let mut path = Path::root();

    for raw in pointer.split('/').skip(1) {
        let token = raw.replace("~1", "/").replace("~0", "~");
        let node = accessor.get(doc, &path);
        let segment = match (node, token.parse::<usize>()) {
            (Some(seq @ Document::Seq(_)), Ok(n)) => {
                let slot = seq.indexed_items().nth(n).map_or(n, |(i, _)| i);
                Segment::Index(slot)
            }
            _ => Segment::Field(token),
        };
        path.push(segment);
    }
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn validator() -> JsonSchemaValidator {
        JsonSchemaValidator::new(&json!({
            "type": "object",
            "required": ["Name", "Items"],
            "properties": {
                "Name": {"type": "string", "minLength": 1},
                "Items": {
                    "type": "array",
                    "minItems": 1,
                    "items": {
                        "type": "object",
                        "required": ["Key"],
                        "properties": {"Key": {"type": "string"}}
                    }
                },
                "Labels": {"type": "object", "additionalProperties": {"type": "integer"}}
            }
        }))
        .unwrap()
    }

    fn issues_of(doc: &Document) -> Vec<(String, String)> {
        validator()
            .validate(doc)
            .err()
            .unwrap_or_default()
            .into_iter()
            .map(|issue| (issue.path.to_string(), issue.message))
            .collect()
    }

    #[test]
    fn test_required_lands_on_missing_field() {
        let issues = issues_of(&json!({"Items": [{"Key": "a"}]}).into());
        assert_eq!(issues, vec![("Name".to_string(), "Required".to_string())]);
    }

    #[test]
    fn test_empty_string_reads_as_required() {
        let issues = issues_of(&json!({"Name": "", "Items": [{"Key": "a"}]}).into());
        assert_eq!(issues, vec![("Name".to_string(), "Required".to_string())]);
    }

    #[test]
    fn test_min_items() {
        let issues = issues_of(&json!({"Name": "n", "Items": []}).into());
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].0, "Items");
        assert!(issues[0].1.contains("at least 1"));
    }

    #[test]
    fn test_holes_are_skipped_and_indices_mapped_back() {
        let doc = Document::Record(
            [
                ("Name".to_string(), Document::string("n")),
                (
                    "Items".to_string(),
                    Document::Seq(vec![None, Some(json!({"Key": "a"}).into()), Some(json!({}).into())]),
                ),
            ]
            .into_iter()
            .collect(),
        );
        let issues = issues_of(&doc);
        assert_eq!(issues, vec![("Items[2].Key".to_string(), "Required".to_string())]);
    }

    #[test]
    fn test_only_holes_fail_min_items() {
        let doc = Document::Record(
            [
                ("Name".to_string(), Document::string("n")),
                ("Items".to_string(), Document::Seq(vec![None])),
            ]
            .into_iter()
            .collect(),
        );
        let issues = issues_of(&doc);
        assert_eq!(issues[0].0, "Items");
    }

    #[test]
    fn test_numeric_record_key_stays_a_field() {
        let doc: Document = json!({"Name": "n", "Items": [{"Key": "a"}], "Labels": {"0": "x"}}).into();
        let issues = validator().validate(&doc).unwrap_err();
        assert_eq!(issues.len(), 1);
        assert_eq!(
            issues[0].path.segments(),
            &[Segment::Field("Labels".into()), Segment::Field("0".into())]
        );
    }

    #[test]
    fn test_invalid_schema_is_rejected() {
        assert!(JsonSchemaValidator::new(&json!({"type": "no-such-type"})).is_err());
    }
}
