//! Error types for toolgate operations

use crate::operation::RegistryError;

/// Result type for toolgate operations
pub type Result<T> = std::result::Result<T, GatewayError>;

/// Crate-level errors raised while building or configuring a gateway.
///
/// Failures that happen while a tool call is in flight never surface as a
/// `GatewayError`; they are folded into the call result instead (see
/// [`crate::invocation::InvocationError`]).
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Registry construction failed
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Logging could not be initialized
    #[error("Logging initialization error: {0}")]
    Logging(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl From<String> for GatewayError {
    fn from(s: String) -> Self {
        GatewayError::Other(s)
    }
}

impl From<&str> for GatewayError {
    fn from(s: &str) -> Self {
        GatewayError::Other(s.to_string())
    }
}

impl From<anyhow::Error> for GatewayError {
    fn from(err: anyhow::Error) -> Self {
        GatewayError::Other(err.to_string())
    }
}
