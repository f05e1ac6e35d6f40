//! Invocation lifecycle events
//!
//! Observers registered on an [`InvocationHandler`](super::InvocationHandler)
//! see every call start and finish. Arguments are already redacted.

use crate::mcp::RequestId;
use serde::Serialize;
use serde_json::Value;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

/// Where a call is in its lifecycle
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "stage", rename_all = "snake_case")]
pub enum InvocationStage {
    Started,
    Succeeded { duration_ms: f64 },
    Failed { reason: String, message: String, duration_ms: f64 },
}

/// One lifecycle event
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvocationEvent {
    pub tool: String,
    pub operation_id: String,
    pub request_id: RequestId,
    pub arguments: Value,
    #[serde(flatten)]
    pub stage: InvocationStage,
}

impl InvocationEvent {
    pub fn with_stage(&self, stage: InvocationStage) -> Self {
        Self {
            stage,
            ..self.clone()
        }
    }
}

/// Receives invocation events
pub trait InvocationObserver: Send + Sync {
    fn on_event(&self, event: &InvocationEvent);
}

/// Ordered set of observers
#[derive(Clone, Default)]
pub struct ObserverRegistry {
    observers: Vec<Arc<dyn InvocationObserver>>,
}

impl ObserverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, observer: Arc<dyn InvocationObserver>) {
        self.observers.push(observer);
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    /// Deliver an event to every observer; a panicking observer is logged and skipped
    pub fn dispatch(&self, event: &InvocationEvent) {
        for observer in &self.observers {
            let delivered = std::panic::catch_unwind(AssertUnwindSafe(|| observer.on_event(event)));
            if delivered.is_err() {
                tracing::error!(
                    tool = %event.tool,
                    operation_id = %event.operation_id,
                    "Invocation observer panicked"
                );
            }
        }
    }
}

impl std::fmt::Debug for ObserverRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObserverRegistry")
            .field("observers", &self.observers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        stages: Mutex<Vec<InvocationStage>>,
    }

    impl InvocationObserver for Recorder {
        fn on_event(&self, event: &InvocationEvent) {
            if let Ok(mut stages) = self.stages.lock() {
                stages.push(event.stage.clone());
            }
        }
    }

    struct Exploding;

    impl InvocationObserver for Exploding {
        fn on_event(&self, _event: &InvocationEvent) {
            panic!("observer failure");
        }
    }

    fn started() -> InvocationEvent {
        InvocationEvent {
            tool: "acme___status".to_string(),
            operation_id: "acme:status".to_string(),
            request_id: RequestId::from(1i64),
            arguments: json!({}),
            stage: InvocationStage::Started,
        }
    }

    #[test]
    fn test_dispatch_survives_panicking_observer() {
        let recorder = Arc::new(Recorder::default());
        let mut registry = ObserverRegistry::new();
        registry.register(Arc::new(Exploding));
        registry.register(recorder.clone());

        let event = started();
        registry.dispatch(&event);
        registry.dispatch(&event.with_stage(InvocationStage::Succeeded { duration_ms: 1.5 }));

        let stages = recorder.stages.lock().unwrap();
        assert_eq!(stages.len(), 2);
        assert_eq!(stages[0], InvocationStage::Started);
    }

    #[test]
    fn test_event_serializes_flat() {
        let event = started().with_stage(InvocationStage::Failed {
            reason: "access_denied".to_string(),
            message: "Access denied.".to_string(),
            duration_ms: 0.2,
        });
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["stage"], "failed");
        assert_eq!(value["reason"], "access_denied");
        assert_eq!(value["tool"], "acme___status");
    }
}
