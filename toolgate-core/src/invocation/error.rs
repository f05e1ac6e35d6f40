//! Invocation failures

use super::envelope::InvocationEnvelope;
use crate::mcp::JsonRpcError;
use crate::schema::ValidationIssue;
use serde_json::json;
use thiserror::Error;

/// Why a single tool call did not produce a successful outcome
#[derive(Debug, Clone, Error)]
pub enum InvocationError {
    /// No registered operation (or one hidden by the allow-list)
    #[error("Unknown tool: {0}")]
    NotFound(String),

    /// The registry factory failed or panicked
    #[error("Tool instantiation failed: {0}")]
    Instantiation(String),

    /// `Operation::access` returned false
    #[error("Access denied.")]
    AccessDenied,

    /// The operation returned an error or panicked
    #[error("{0}")]
    Execution(String),

    /// Strict validation rejected the arguments
    #[error("{message}")]
    Validation {
        message: String,
        errors: Vec<ValidationIssue>,
    },
}

impl InvocationError {
    /// Short label used in log fields and observer events
    pub fn kind(&self) -> &'static str {
        match self {
            InvocationError::NotFound(_) => "not_found",
            InvocationError::Instantiation(_) => "instantiation",
            InvocationError::AccessDenied => "access_denied",
            InvocationError::Execution(_) => "execution",
            InvocationError::Validation { .. } => "validation",
        }
    }

    /// Protocol-level error, used only for failures that never reach an operation
    pub fn to_rpc_error(&self) -> JsonRpcError {
        match self {
            InvocationError::NotFound(name) => JsonRpcError::unknown_tool(name),
            other => JsonRpcError::internal_error(other.to_string()),
        }
    }

    /// Uniform failure envelope for everything past resolution
    pub fn into_envelope(self) -> InvocationEnvelope {
        match self {
            InvocationError::Validation { message, errors } => {
                InvocationEnvelope::failure(message).with_data(json!({ "validation_errors": errors }))
            }
            other => InvocationEnvelope::failure(other.to_string()),
        }
    }
}
