//! The uniform result envelope every tool call is answered with

use super::normalize::{is_empty_payload, to_plain_json};
use crate::mcp::ToolCallResult;
use crate::operation::OperationOutcome;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Message used when a successful operation does not set one
pub const DEFAULT_SUCCESS_MESSAGE: &str = "Success.";

/// Message used when a failed operation does not set one
pub const DEFAULT_FAILURE_MESSAGE: &str = "Tool execution failed.";

/// `{success, message, data}` as carried in `structuredContent`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvocationEnvelope {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl InvocationEnvelope {
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
        }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Normalize what an operation reported after running
    pub fn from_outcome(outcome: OperationOutcome) -> Self {
        let message = outcome
            .message
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| {
                if outcome.success {
                    DEFAULT_SUCCESS_MESSAGE
                } else {
                    DEFAULT_FAILURE_MESSAGE
                }
                .to_string()
            });

        // An outcome always carries `data`, an empty object when none was set
        let data = match to_plain_json(&outcome.data) {
            Value::Null => Value::Object(Map::new()),
            data => data,
        };

        Self {
            success: outcome.success,
            message,
            data: Some(data),
        }
    }

    fn has_data(&self) -> bool {
        self.data.as_ref().is_some_and(|data| !is_empty_payload(data))
    }

    /// Render as an MCP tool result.
    ///
    /// The text block is the message, followed by the pretty-printed structured
    /// content when there is data worth showing.
    pub fn into_call_result(self) -> ToolCallResult {
        let structured = to_plain_json(&self);
        let text = if self.has_data() {
            let pretty = serde_json::to_string_pretty(&structured).unwrap_or_default();
            format!("{}\n{}", self.message, pretty)
        } else {
            self.message
        };

        ToolCallResult::text(text, !self.success, structured)
    }
}
