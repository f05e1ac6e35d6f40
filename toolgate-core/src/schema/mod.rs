//! Schema conversion and strict validation
//!
//! [`to_input_schema`] and [`to_annotations`] turn an operation definition into
//! the MCP wire description; [`InputValidator`] checks an argument set against
//! that same schema.

mod converter;
mod validator;

pub use converter::{ENTITY_REFERENCE_DESCRIPTION, ToolAnnotations, to_annotations, to_input_schema};
pub use validator::{DEFAULT_MAX_ERRORS, InputValidator, ValidationIssue, ValidationReport};
