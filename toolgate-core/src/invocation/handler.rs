//! The invocation pipeline
//!
//! One call moves through resolve and allow-list, coercion, optional strict
//! validation, instantiation, value assignment, access check, execution and
//! normalization. Only resolution failures leave as protocol errors; every
//! later failure is answered with an error envelope.

use super::coerce::coerce_arguments;
use super::envelope::InvocationEnvelope;
use super::error::InvocationError;
use super::events::{InvocationEvent, InvocationObserver, InvocationStage, ObserverRegistry};
use super::redact::redact_arguments;
use crate::config::GatewayConfig;
use crate::mcp::{JsonRpcError, McpTool, RequestId, ToolCallResult};
use crate::operation::name::{to_operation_id, to_wire_name};
use crate::operation::{OperationDefinition, OperationRegistry, RegisteredOperation};
use crate::policy::AllowList;
use crate::schema::{InputValidator, to_annotations, to_input_schema};
use futures::FutureExt;
use serde_json::{Map, Value};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;
use tracing::Instrument;

/// A single `tools/call`
#[derive(Debug, Clone)]
pub struct InvocationRequest {
    /// Correlation id, echoed into logs and events
    pub id: RequestId,
    /// Wire name of the tool
    pub name: String,
    /// Raw arguments; `null` is treated as no arguments
    pub arguments: Value,
}

impl InvocationRequest {
    pub fn new(id: impl Into<RequestId>, name: impl Into<String>, arguments: Value) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments,
        }
    }
}

/// Drives registered operations on behalf of wire callers
#[derive(Debug, Clone)]
pub struct InvocationHandler {
    registry: Arc<OperationRegistry>,
    allow_list: AllowList,
    validator: Option<InputValidator>,
    observers: ObserverRegistry,
}

impl InvocationHandler {
    pub fn new(registry: Arc<OperationRegistry>, allow_list: AllowList) -> Self {
        Self {
            registry,
            allow_list,
            validator: None,
            observers: ObserverRegistry::new(),
        }
    }

    /// Build a handler with the allow-list and validation settings of `config`
    pub fn from_config(registry: Arc<OperationRegistry>, config: &GatewayConfig) -> Self {
        let handler = Self::new(registry, AllowList::from_config(&config.access));
        if config.validation.validate_arguments {
            handler.with_strict_validation(InputValidator::new(config.validation.max_errors))
        } else {
            handler
        }
    }

    /// Validate coerced arguments against the input schema before instantiating
    pub fn with_strict_validation(mut self, validator: InputValidator) -> Self {
        self.validator = Some(validator);
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn InvocationObserver>) -> Self {
        self.observers.register(observer);
        self
    }

    pub fn registry(&self) -> &Arc<OperationRegistry> {
        &self.registry
    }

    pub fn allow_list(&self) -> &AllowList {
        &self.allow_list
    }

    /// Definitions visible through the allow-list, in registration order
    pub fn allowed_definitions(&self) -> impl Iterator<Item = &OperationDefinition> {
        self.registry
            .definitions()
            .filter(|definition| self.allow_list.permits(definition))
    }

    /// MCP descriptions of every visible operation
    pub fn list_tools(&self) -> Vec<McpTool> {
        self.allowed_definitions()
            .map(|definition| McpTool {
                name: to_wire_name(&definition.id),
                description: definition.description.clone(),
                input_schema: to_input_schema(definition),
                annotations: Some(to_annotations(definition)),
            })
            .collect()
    }

    /// Resolve a wire name to a visible operation.
    ///
    /// Hidden operations are reported exactly like missing ones.
    pub fn resolve(&self, name: &str) -> Result<&RegisteredOperation, InvocationError> {
        self.registry
            .get(&to_operation_id(name))
            .filter(|entry| self.allow_list.permits(entry.definition()))
            .ok_or_else(|| InvocationError::NotFound(name.to_string()))
    }

    /// Run one tool call.
    ///
    /// # Errors
    ///
    /// Returns a JSON-RPC error when the tool is unknown or hidden, or when the
    /// arguments are not an object. Everything else, including panics inside
    /// the operation, is reported through the result's `isError` flag.
    pub async fn handle(&self, request: InvocationRequest) -> Result<ToolCallResult, JsonRpcError> {
        let started = Instant::now();
        let operation_id = to_operation_id(&request.name);

        let entry = match self.resolve(&request.name) {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(
                    tool = %request.name,
                    operation_id = %operation_id,
                    request_id = %request.id,
                    "Tool not found"
                );
                return Err(e.to_rpc_error());
            }
        };

        let arguments = match request.arguments {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            _ => {
                tracing::warn!(tool = %request.name, "Rejected non-object arguments");
                return Err(JsonRpcError::invalid_params("Arguments must be an object."));
            }
        };

        let event = InvocationEvent {
            tool: request.name.clone(),
            operation_id: operation_id.clone(),
            request_id: request.id.clone(),
            arguments: redact_arguments(&Value::Object(arguments.clone())),
            stage: InvocationStage::Started,
        };
        tracing::debug!(
            tool = %request.name,
            operation_id = %operation_id,
            arguments = %event.arguments,
            "Invoking operation"
        );
        self.observers.dispatch(&event);

        let span = tracing::info_span!("invocation", operation_id = %operation_id, request_id = %request.id);
        let outcome = self.run(entry, arguments).instrument(span).await;
        let duration_ms = started.elapsed().as_secs_f64() * 1000.0;

        let envelope = match outcome {
            Ok(envelope) => {
                if envelope.success {
                    tracing::info!(operation_id = %operation_id, duration_ms, "Operation succeeded");
                    self.observers
                        .dispatch(&event.with_stage(InvocationStage::Succeeded { duration_ms }));
                } else {
                    tracing::warn!(
                        operation_id = %operation_id,
                        duration_ms,
                        error = %envelope.message,
                        "Operation reported failure"
                    );
                    self.observers.dispatch(&event.with_stage(InvocationStage::Failed {
                        reason: "result".to_string(),
                        message: envelope.message.clone(),
                        duration_ms,
                    }));
                }
                envelope
            }
            Err(e) => {
                match &e {
                    InvocationError::AccessDenied | InvocationError::Validation { .. } => {
                        tracing::warn!(
                            operation_id = %operation_id,
                            duration_ms,
                            kind = e.kind(),
                            error = %e,
                            "Invocation rejected"
                        );
                    }
                    _ => {
                        tracing::error!(
                            operation_id = %operation_id,
                            duration_ms,
                            kind = e.kind(),
                            error = %e,
                            "Invocation failed"
                        );
                    }
                }
                self.observers.dispatch(&event.with_stage(InvocationStage::Failed {
                    reason: e.kind().to_string(),
                    message: e.to_string(),
                    duration_ms,
                }));
                e.into_envelope()
            }
        };

        Ok(envelope.into_call_result())
    }

    async fn run(
        &self,
        entry: &RegisteredOperation,
        arguments: Map<String, Value>,
    ) -> Result<InvocationEnvelope, InvocationError> {
        let definition = entry.definition();
        let arguments = coerce_arguments(definition, arguments);

        if let Some(validator) = &self.validator {
            let report = validator.validate(definition, &Value::Object(arguments.clone()));
            if !report.valid {
                let message = report
                    .errors
                    .first()
                    .map(|issue| issue.message.clone())
                    .unwrap_or_else(|| "Invalid arguments.".to_string());
                return Err(InvocationError::Validation {
                    message,
                    errors: report.errors,
                });
            }
        }

        let mut operation = std::panic::catch_unwind(AssertUnwindSafe(|| entry.instantiate()))
            .map_err(|payload| InvocationError::Instantiation(panic_message(payload.as_ref())))?
            .map_err(|e| InvocationError::Instantiation(format!("{e:#}")))?;

        let permitted = std::panic::catch_unwind(AssertUnwindSafe(|| {
            for (name, value) in arguments {
                operation.set_value(&name, value);
            }
            operation.access()
        }))
        .map_err(|payload| InvocationError::Execution(panic_message(payload.as_ref())))?;

        if !permitted {
            return Err(InvocationError::AccessDenied);
        }

        match AssertUnwindSafe(operation.execute()).catch_unwind().await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(InvocationError::Execution(format!("{e:#}"))),
            Err(payload) => return Err(InvocationError::Execution(panic_message(payload.as_ref()))),
        }

        let outcome = std::panic::catch_unwind(AssertUnwindSafe(|| operation.result()))
            .map_err(|payload| InvocationError::Execution(panic_message(payload.as_ref())))?;

        Ok(InvocationEnvelope::from_outcome(outcome))
    }
}

/// Best-effort text of a panic payload
fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "Tool execution panicked.".to_string()
    }
}
