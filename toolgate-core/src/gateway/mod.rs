//! Gateway meta-operations
//!
//! Instead of listing every operation, a gateway-mode server exposes three
//! tools that let a client find and run operations on demand:
//!
//! - `toolgate/discover-tools` - search the allow-listed operations
//! - `toolgate/get-tool-info` - input schema and hints for one operation
//! - `toolgate/execute-tool` - run an operation through the invocation handler
//!
//! All three answer with a [`ToolCallResult`]; failures are reported in the
//! result (`isError`) rather than as protocol errors.

mod catalog;

pub use catalog::{ToolCatalog, ToolHints, ToolInfo, ToolSummary};

use crate::invocation::{InvocationHandler, InvocationRequest, to_plain_json};
use crate::mcp::{JsonRpcError, McpTool, RequestId, ToolCallResult};
use crate::schema::ToolAnnotations;
use once_cell::sync::OnceCell;
use serde_json::{Map, Value, json};

/// Wire name of the discovery tool
pub const DISCOVER_TOOL: &str = "toolgate/discover-tools";

/// Wire name of the info tool
pub const GET_INFO_TOOL: &str = "toolgate/get-tool-info";

/// Wire name of the execution tool
pub const EXECUTE_TOOL: &str = "toolgate/execute-tool";

/// Discovery, inspection and execution of operations by name
#[derive(Debug)]
pub struct ToolGateway {
    handler: InvocationHandler,
    catalog: OnceCell<ToolCatalog>,
}

impl ToolGateway {
    pub fn new(handler: InvocationHandler) -> Self {
        Self {
            handler,
            catalog: OnceCell::new(),
        }
    }

    pub fn handler(&self) -> &InvocationHandler {
        &self.handler
    }

    /// Catalog of visible operations, built on first use
    pub fn catalog(&self) -> &ToolCatalog {
        self.catalog.get_or_init(|| {
            let catalog = ToolCatalog::new(self.handler.allowed_definitions());
            tracing::debug!(tool_count = catalog.len(), "Built tool catalog");
            catalog
        })
    }

    /// Definitions of the three meta tools
    pub fn tools() -> Vec<McpTool> {
        let read_only = |title: &str| ToolAnnotations {
            title: Some(title.to_string()),
            read_only_hint: Some(true),
            destructive_hint: None,
            idempotent_hint: Some(true),
            open_world_hint: Some(false),
        };
        let tool_name = json!({
            "type": "string",
            "description": "Tool name from discover-tools.",
        });

        vec![
            McpTool {
                name: DISCOVER_TOOL.to_string(),
                description: "List available tools with optional filtering.".to_string(),
                input_schema: object_schema(
                    json!({
                        "query": {
                            "type": "string",
                            "description": "Optional search term for name/label/description.",
                        }
                    }),
                    &[],
                ),
                annotations: Some(read_only("Discover Tools")),
            },
            McpTool {
                name: GET_INFO_TOOL.to_string(),
                description: "Get input schema and hints for a specific tool.".to_string(),
                input_schema: object_schema(json!({ "tool_name": tool_name }), &["tool_name"]),
                annotations: Some(read_only("Get Tool Info")),
            },
            McpTool {
                name: EXECUTE_TOOL.to_string(),
                description: "Execute any available tool by name with arguments.".to_string(),
                input_schema: object_schema(
                    json!({
                        "tool_name": tool_name,
                        "arguments": {
                            "type": "object",
                            "description": "Arguments to pass to the tool.",
                        }
                    }),
                    &["tool_name"],
                ),
                annotations: Some(ToolAnnotations {
                    title: Some("Execute Tool".to_string()),
                    read_only_hint: Some(false),
                    destructive_hint: None,
                    idempotent_hint: None,
                    open_world_hint: Some(true),
                }),
            },
        ]
    }

    /// Whether `name` is one of the meta tools
    pub fn is_gateway_tool(name: &str) -> bool {
        matches!(name, DISCOVER_TOOL | GET_INFO_TOOL | EXECUTE_TOOL)
    }

    /// Dispatch a `tools/call` addressed to one of the meta tools.
    ///
    /// # Errors
    ///
    /// Returns method-not-found for any other name, and invalid-params when
    /// the arguments are not an object or a required argument is missing.
    pub async fn call(&self, name: &str, arguments: Value) -> Result<ToolCallResult, JsonRpcError> {
        let arguments = match arguments {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            _ => return Err(JsonRpcError::invalid_params("Arguments must be an object.")),
        };

        match name {
            DISCOVER_TOOL => Ok(self.discover(optional_str(&arguments, "query")?)),
            GET_INFO_TOOL => Ok(self.get_info(required_str(&arguments, "tool_name")?)),
            EXECUTE_TOOL => {
                let tool_name = required_str(&arguments, "tool_name")?;
                let tool_arguments = arguments.get("arguments").cloned().unwrap_or(Value::Null);
                Ok(self.execute(tool_name, tool_arguments).await)
            }
            other => Err(JsonRpcError::unknown_tool(other)),
        }
    }

    /// List visible operations, optionally filtered by `query`
    pub fn discover(&self, query: Option<&str>) -> ToolCallResult {
        let tools: Vec<ToolSummary> = self
            .catalog()
            .search(query)
            .into_iter()
            .map(ToolInfo::summary)
            .collect();

        let structured = json!({
            "success": true,
            "count": tools.len(),
            "tools": to_plain_json(&tools),
        });

        let mut text = format!("Found {} tools.", tools.len());
        if !tools.is_empty() {
            text.push('\n');
            text.push_str(&serde_json::to_string_pretty(&structured).unwrap_or_default());
        }

        ToolCallResult::text(text, false, structured)
    }

    /// Input schema and hints of one operation, by wire name or operation id
    pub fn get_info(&self, name: &str) -> ToolCallResult {
        let Some(info) = self.catalog().get(name) else {
            return error_result(format!("Unknown tool: {name}"), Map::new());
        };

        let structured = json!({
            "success": true,
            "name": info.name,
            "label": info.label,
            "description": info.description,
            "provider": info.provider,
            "inputSchema": info.input_schema,
            "annotations": to_plain_json(&info.annotations),
            "operation_id": info.operation_id,
        });
        let text = serde_json::to_string_pretty(&structured).unwrap_or_default();

        ToolCallResult::text(text, false, structured)
    }

    /// Run an operation through the invocation handler.
    ///
    /// Protocol errors from the handler (unknown or hidden tool) are folded
    /// into an error result carrying the tool name and JSON-RPC code.
    pub async fn execute(&self, name: &str, arguments: Value) -> ToolCallResult {
        if !matches!(arguments, Value::Object(_) | Value::Null) {
            return error_result("Arguments must be an object.", tool_field(name));
        }

        let request_id = RequestId::from(format!("gateway-{}", uuid::Uuid::new_v4()));
        let request = InvocationRequest::new(request_id, name, arguments);

        match self.handler.handle(request).await {
            Ok(result) => result,
            Err(error) => {
                let mut extra = tool_field(name);
                extra.insert("code".to_string(), json!(error.code));
                error_result(error.message, extra)
            }
        }
    }
}

/// `{success: false, error, ...extra}` with the message as text
fn error_result(message: impl Into<String>, extra: Map<String, Value>) -> ToolCallResult {
    let message = message.into();
    let mut structured = Map::new();
    structured.insert("success".to_string(), Value::Bool(false));
    structured.insert("error".to_string(), Value::String(message.clone()));
    for (key, value) in extra {
        structured.entry(key).or_insert(value);
    }

    ToolCallResult::text(message, true, Value::Object(structured))
}

fn tool_field(name: &str) -> Map<String, Value> {
    let mut map = Map::new();
    map.insert("tool".to_string(), Value::String(name.to_string()));
    map
}

fn object_schema(properties: Value, required: &[&str]) -> Value {
    let mut schema = json!({
        "type": "object",
        "properties": properties,
    });
    if !required.is_empty() {
        schema["required"] = json!(required);
    }
    schema
}

fn optional_str<'a>(arguments: &'a Map<String, Value>, key: &str) -> Result<Option<&'a str>, JsonRpcError> {
    match arguments.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.as_str())),
        Some(_) => Err(JsonRpcError::invalid_params(format!("'{key}' must be a string"))),
    }
}

fn required_str<'a>(arguments: &'a Map<String, Value>, key: &str) -> Result<&'a str, JsonRpcError> {
    optional_str(arguments, key)?
        .ok_or_else(|| JsonRpcError::invalid_params(format!("Missing required argument '{key}'")))
}

#[cfg(test)]
mod tests;
