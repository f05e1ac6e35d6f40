//! # Toolgate - MCP tools from a registry of typed operations
//!
//! Toolgate exposes operations a host application already has as Model
//! Context Protocol tools:
//! - Input schemas and annotation hints derived from operation definitions
//! - Provider allow-listing shared by discovery and invocation
//! - Lenient argument coercion, with opt-in strict schema validation
//! - A uniform `{success, message, data}` result envelope
//! - Gateway mode with discover / get-info / execute meta tools
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use toolgate_core::prelude::*;
//!
//! # async fn run(registry: OperationRegistry) -> Result<()> {
//! let config = GatewayConfig::load()?;
//! toolgate_core::logging::init(&config.logging)?;
//!
//! let server = McpServer::builder()
//!     .with_config(&config)
//!     .with_registry(Arc::new(registry))
//!     .build();
//!
//! let response = server
//!     .handle_request(JsonRpcRequest::new(1i64, "tools/list"))
//!     .await;
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - **operation**: definitions, the `Operation` trait, and the registry
//! - **schema**: JSON Schema and annotation derivation, strict validation
//! - **invocation**: the per-call pipeline and its result envelope
//! - **gateway**: discovery and execution meta tools
//! - **mcp**: JSON-RPC types and request dispatch

pub mod config;
pub mod error;
pub mod gateway;
pub mod invocation;
pub mod logging;
pub mod mcp;
pub mod operation;
pub mod policy;
pub mod schema;

/// Current library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::{
        AccessConfig, GatewayConfig, LoggingConfig, ServerConfig, ValidationConfig,
    };
    pub use crate::error::{GatewayError, Result};
    pub use crate::gateway::{ToolCatalog, ToolGateway, ToolInfo, ToolSummary};
    pub use crate::invocation::{
        InvocationEnvelope, InvocationError, InvocationEvent, InvocationHandler,
        InvocationObserver, InvocationRequest, InvocationStage,
    };
    pub use crate::mcp::{
        JsonRpcError, JsonRpcRequest, JsonRpcResponse, McpServer, McpServerBuilder, McpTool,
        RequestId, ToolCallResult,
    };
    pub use crate::operation::{
        DataType, Operation, OperationDefinition, OperationKind, OperationOutcome,
        OperationRegistry, ParameterDefinition, RegistryError,
    };
    pub use crate::policy::AllowList;
    pub use crate::schema::{
        InputValidator, ToolAnnotations, ValidationIssue, ValidationReport, to_annotations,
        to_input_schema,
    };
}
