//! Model Context Protocol (MCP) Server Implementation
//!
//! Exposes a registry of operations to MCP clients over JSON-RPC 2.0. The
//! server answers:
//! - `initialize` / `notifications/initialized` - Connection setup
//! - `ping`
//! - `tools/list` - List available tools
//! - `tools/call` - Call a tool
//!
//! Reading and writing the byte stream is left to the host.
//!
//! # Example
//!
//! ```rust,ignore
//! use toolgate_core::config::GatewayConfig;
//! use toolgate_core::mcp::{JsonRpcRequest, McpServer};
//!
//! let config = GatewayConfig::load()?;
//! let server = McpServer::builder()
//!     .with_config(&config)
//!     .with_registry(Arc::new(registry))
//!     .build();
//!
//! let response = server.handle_request(request).await;
//! ```
//!
//! # References
//!
//! - [MCP Specification](https://modelcontextprotocol.io/specification)

mod protocol;
mod server;

pub use protocol::*;
pub use server::{McpServer, McpServerBuilder, McpServerConfig};
