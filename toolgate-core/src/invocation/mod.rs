//! Tool invocation
//!
//! The [`InvocationHandler`] turns a wire call (`{name, arguments}`) into a
//! run of one registered operation and answers with a uniform envelope:
//!
//! ```text
//! { content: [{type: "text", text}], isError, structuredContent: {success, message, data?} }
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use toolgate_core::invocation::{InvocationHandler, InvocationRequest};
//! use toolgate_core::policy::AllowList;
//!
//! let handler = InvocationHandler::new(Arc::new(registry), AllowList::prefix("acme"));
//! let result = handler
//!     .handle(InvocationRequest::new(1i64, "acme___status", json!({"verbose": "true"})))
//!     .await?;
//! assert!(!result.is_error);
//! ```

mod coerce;
mod envelope;
mod error;
mod events;
mod handler;
mod normalize;
mod redact;

pub use coerce::{coerce_arguments, coerce_value};
pub use envelope::{DEFAULT_FAILURE_MESSAGE, DEFAULT_SUCCESS_MESSAGE, InvocationEnvelope};
pub use error::InvocationError;
pub use events::{InvocationEvent, InvocationObserver, InvocationStage, ObserverRegistry};
pub use handler::{InvocationHandler, InvocationRequest};
pub use normalize::{is_empty_payload, to_plain_json};
pub use redact::{REDACTED, redact_arguments};
