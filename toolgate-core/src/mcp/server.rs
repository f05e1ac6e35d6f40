//! MCP Server Implementation
//!
//! Dispatches JSON-RPC requests either straight to the invocation handler
//! (direct mode) or to the three gateway meta tools (gateway mode).

use super::protocol::*;
use crate::config::GatewayConfig;
use crate::gateway::ToolGateway;
use crate::invocation::{InvocationHandler, InvocationObserver, InvocationRequest};
use crate::operation::OperationRegistry;
use crate::policy::AllowList;
use crate::schema::InputValidator;
use serde_json::{Value, json};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// MCP Server configuration
#[derive(Debug, Clone)]
pub struct McpServerConfig {
    /// Server name
    pub name: String,
    /// Server version
    pub version: String,
    /// Expose the meta tools instead of every operation
    pub gateway_mode: bool,
}

impl Default for McpServerConfig {
    fn default() -> Self {
        Self {
            name: "toolgate".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            gateway_mode: false,
        }
    }
}

/// How tools are exposed
#[derive(Debug)]
enum Exposure {
    Direct(InvocationHandler),
    Gateway(ToolGateway),
}

/// MCP Server state
#[derive(Debug)]
pub struct McpServer {
    config: McpServerConfig,
    exposure: Exposure,
    initialized: AtomicBool,
}

impl McpServer {
    /// Create a new MCP server builder
    pub fn builder() -> McpServerBuilder {
        McpServerBuilder::new()
    }

    pub fn config(&self) -> &McpServerConfig {
        &self.config
    }

    /// Whether an `initialize` request has been answered
    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    /// The invocation handler behind either mode
    pub fn handler(&self) -> &InvocationHandler {
        match &self.exposure {
            Exposure::Direct(handler) => handler,
            Exposure::Gateway(gateway) => gateway.handler(),
        }
    }

    /// Handle an incoming JSON-RPC request
    pub async fn handle_request(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        tracing::debug!(method = %request.method, id = %request.id, "Handling request");
        match request.method.as_str() {
            "initialize" => self.handle_initialize(request),
            "initialized" | "notifications/initialized" => {
                // Notification, no response needed but we return success
                JsonRpcResponse::success(request.id, Value::Null)
            }
            "ping" => JsonRpcResponse::success(request.id, json!({})),
            "tools/list" => self.handle_tools_list(request),
            "tools/call" => self.handle_tools_call(request).await,
            other => {
                tracing::debug!(method = %other, "Unknown method");
                JsonRpcResponse::error(request.id, JsonRpcError::method_not_found())
            }
        }
    }

    /// Handle initialize request
    fn handle_initialize(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        let params: InitializeParams = match request.params {
            Some(p) => match serde_json::from_value(p) {
                Ok(params) => params,
                Err(e) => {
                    return JsonRpcResponse::error(
                        request.id,
                        JsonRpcError::invalid_params(format!("Invalid initialize params: {}", e)),
                    );
                }
            },
            None => {
                return JsonRpcResponse::error(
                    request.id,
                    JsonRpcError::invalid_params("Missing initialize params"),
                );
            }
        };

        tracing::info!(
            client = %params.client_info.name,
            client_version = %params.client_info.version,
            protocol_version = %params.protocol_version,
            "Client initialized"
        );

        let result = InitializeResult {
            protocol_version: MCP_PROTOCOL_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability { list_changed: false }),
            },
            server_info: ServerInfo {
                name: self.config.name.clone(),
                version: self.config.version.clone(),
            },
        };

        self.initialized.store(true, Ordering::SeqCst);

        respond(request.id, &result)
    }

    /// Handle tools/list request
    fn handle_tools_list(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        let tools = match &self.exposure {
            Exposure::Direct(handler) => handler.list_tools(),
            Exposure::Gateway(_) => ToolGateway::tools(),
        };

        respond(request.id, &ToolsListResult { tools })
    }

    /// Handle tools/call request
    async fn handle_tools_call(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        let params: ToolCallParams = match request.params {
            Some(p) => match serde_json::from_value(p) {
                Ok(params) => params,
                Err(e) => {
                    return JsonRpcResponse::error(
                        request.id,
                        JsonRpcError::invalid_params(format!("Invalid tool call params: {}", e)),
                    );
                }
            },
            None => {
                return JsonRpcResponse::error(
                    request.id,
                    JsonRpcError::invalid_params("Missing tool call params"),
                );
            }
        };

        let outcome = match &self.exposure {
            Exposure::Direct(handler) => {
                handler
                    .handle(InvocationRequest::new(
                        request.id.clone(),
                        params.name,
                        params.arguments,
                    ))
                    .await
            }
            Exposure::Gateway(gateway) => gateway.call(&params.name, params.arguments).await,
        };

        match outcome {
            Ok(result) => respond(request.id, &result),
            Err(error) => JsonRpcResponse::error(request.id, error),
        }
    }
}

fn respond<T: serde::Serialize>(id: RequestId, result: &T) -> JsonRpcResponse {
    match serde_json::to_value(result) {
        Ok(value) => JsonRpcResponse::success(id, value),
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize result");
            JsonRpcResponse::error(id, JsonRpcError::internal_error(e.to_string()))
        }
    }
}

/// Builder for MCP Server
#[derive(Default)]
pub struct McpServerBuilder {
    config: McpServerConfig,
    registry: Option<Arc<OperationRegistry>>,
    allow_list: AllowList,
    validator: Option<InputValidator>,
    observers: Vec<Arc<dyn InvocationObserver>>,
}

impl McpServerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take name, version, mode, allow-list and validation from `config`
    pub fn with_config(mut self, config: &GatewayConfig) -> Self {
        self.config = McpServerConfig {
            name: config.server.name.clone(),
            version: config.server.version.clone(),
            gateway_mode: config.server.gateway_mode,
        };
        self.allow_list = AllowList::from_config(&config.access);
        self.validator = config
            .validation
            .validate_arguments
            .then(|| InputValidator::new(config.validation.max_errors));
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.config.name = name.into();
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.config.version = version.into();
        self
    }

    pub fn gateway_mode(mut self, enable: bool) -> Self {
        self.config.gateway_mode = enable;
        self
    }

    pub fn with_registry(mut self, registry: Arc<OperationRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn with_allow_list(mut self, allow_list: AllowList) -> Self {
        self.allow_list = allow_list;
        self
    }

    pub fn with_strict_validation(mut self, validator: InputValidator) -> Self {
        self.validator = Some(validator);
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn InvocationObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn build(self) -> McpServer {
        let registry = self.registry.unwrap_or_default();
        let mut handler = InvocationHandler::new(registry, self.allow_list);
        if let Some(validator) = self.validator {
            handler = handler.with_strict_validation(validator);
        }
        for observer in self.observers {
            handler = handler.with_observer(observer);
        }

        let exposure = if self.config.gateway_mode {
            Exposure::Gateway(ToolGateway::new(handler))
        } else {
            Exposure::Direct(handler)
        };

        McpServer {
            config: self.config,
            exposure,
            initialized: AtomicBool::new(false),
        }
    }
}
