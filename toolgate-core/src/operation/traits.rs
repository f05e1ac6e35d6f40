//! The operation trait implemented by every exposed tool

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use crate::invocation::to_plain_json;

/// Outcome reported by an operation after `execute`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OperationOutcome {
    pub success: bool,

    /// Human-readable summary; the gateway supplies a default when absent
    pub message: Option<String>,

    /// Structured payload returned to the caller
    pub data: Value,
}

impl OperationOutcome {
    /// A successful outcome with no payload
    pub fn success() -> Self {
        Self {
            success: true,
            message: None,
            data: Value::Null,
        }
    }

    /// A failed outcome with no payload
    pub fn failure() -> Self {
        Self {
            success: false,
            message: None,
            data: Value::Null,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Attach a payload; values that cannot be represented as JSON are
    /// replaced by a description of their type
    pub fn with_data<T: Serialize>(mut self, data: &T) -> Self {
        self.data = to_plain_json(data);
        self
    }
}

/// A single invocable operation.
///
/// Instances are created per call by the registry factory, receive their
/// argument values through [`Operation::set_value`], are asked for access, and
/// then executed once. The operation's definition lives in the registry next to
/// its factory.
///
/// # Example
///
/// ```rust
/// use async_trait::async_trait;
/// use serde_json::Value;
/// use toolgate_core::operation::{Operation, OperationOutcome};
///
/// #[derive(Default)]
/// struct Greet {
///     name: Option<String>,
///     outcome: OperationOutcome,
/// }
///
/// #[async_trait]
/// impl Operation for Greet {
///     fn set_value(&mut self, name: &str, value: Value) {
///         if name == "name" {
///             self.name = value.as_str().map(str::to_string);
///         }
///     }
///
///     async fn execute(&mut self) -> anyhow::Result<()> {
///         let name = self.name.as_deref().unwrap_or("world");
///         self.outcome = OperationOutcome::success().with_message(format!("Hello, {name}!"));
///         Ok(())
///     }
///
///     fn result(&self) -> OperationOutcome {
///         self.outcome.clone()
///     }
/// }
/// ```
#[async_trait]
pub trait Operation: Send + Sync {
    /// Receive one (already coerced) argument value
    fn set_value(&mut self, name: &str, value: Value);

    /// Whether the current caller may run this operation with the values set
    fn access(&self) -> bool {
        true
    }

    /// Run the operation
    async fn execute(&mut self) -> anyhow::Result<()>;

    /// Outcome of the last `execute`
    fn result(&self) -> OperationOutcome;
}
