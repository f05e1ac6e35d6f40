//! Strict argument validation against the derived input schema
//!
//! This is the pre-flight path: it reports every violation with a path and the
//! failing keyword, but it never coerces. The invocation path coerces instead
//! and only calls in here when strict validation is switched on.

use super::converter::to_input_schema;
use crate::operation::OperationDefinition;
use jsonschema::Draft;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Default cap on reported errors
pub const DEFAULT_MAX_ERRORS: usize = 10;

/// One schema violation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// Human-readable description
    pub message: String,

    /// Failing JSON Schema keyword (`type`, `required`, `minimum`, ...)
    pub keyword: String,

    /// Dot-joined location of the offending value; absent at the root
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

/// Result of validating one argument set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn valid() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
        }
    }

    fn invalid(errors: Vec<ValidationIssue>) -> Self {
        Self {
            valid: false,
            errors,
        }
    }
}

/// Validates arguments against an operation's input schema
#[derive(Debug, Clone)]
pub struct InputValidator {
    max_errors: usize,
}

impl Default for InputValidator {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ERRORS)
    }
}

impl InputValidator {
    /// Create a validator reporting at most `max_errors` issues
    pub fn new(max_errors: usize) -> Self {
        Self {
            max_errors: max_errors.max(1),
        }
    }

    /// Validate `arguments` against the schema derived from `definition`.
    ///
    /// If the schema cannot be compiled the arguments are accepted and a
    /// warning is logged; a broken definition must not block every call.
    pub fn validate(&self, definition: &OperationDefinition, arguments: &Value) -> ValidationReport {
        let schema = match normalize(&to_input_schema(definition)) {
            Ok(schema) => schema,
            Err(e) => {
                tracing::warn!(operation_id = %definition.id, error = %e, "Could not normalize input schema, skipping validation");
                return ValidationReport::valid();
            }
        };
        let instance = match normalize(arguments) {
            Ok(instance) => instance,
            Err(e) => {
                tracing::warn!(operation_id = %definition.id, error = %e, "Could not normalize arguments, skipping validation");
                return ValidationReport::valid();
            }
        };

        let validator = match jsonschema::options()
            .with_draft(Draft::Draft202012)
            .build(&schema)
        {
            Ok(validator) => validator,
            Err(e) => {
                tracing::warn!(operation_id = %definition.id, error = %e, "Input schema failed to compile, skipping validation");
                return ValidationReport::valid();
            }
        };

        let errors: Vec<ValidationIssue> = validator
            .iter_errors(&instance)
            .take(self.max_errors)
            .map(|error| ValidationIssue {
                message: error.to_string(),
                keyword: keyword_of(&error.schema_path.to_string()),
                path: dotted_path(&error.instance_path.to_string()),
            })
            .collect();

        if errors.is_empty() {
            ValidationReport::valid()
        } else {
            tracing::debug!(operation_id = %definition.id, error_count = errors.len(), "Arguments failed validation");
            ValidationReport::invalid(errors)
        }
    }
}

/// Round-trip through the serializer so only plain JSON reaches the validator
fn normalize(value: &Value) -> Result<Value, serde_json::Error> {
    let encoded = serde_json::to_vec(value)?;
    serde_json::from_slice(&encoded)
}

/// Last segment of a schema pointer, e.g. `/properties/count/type` -> `type`
fn keyword_of(schema_pointer: &str) -> String {
    schema_pointer
        .rsplit('/')
        .find(|segment| !segment.is_empty())
        .unwrap_or("schema")
        .to_string()
}

/// JSON pointer to dotted path, e.g. `/items/0/name` -> `items.0.name`
fn dotted_path(instance_pointer: &str) -> Option<String> {
    let segments: Vec<String> = instance_pointer
        .split('/')
        .filter(|segment| !segment.is_empty())
        .map(|segment| segment.replace("~1", "/").replace("~0", "~"))
        .collect();

    if segments.is_empty() {
        None
    } else {
        Some(segments.join("."))
    }
}
