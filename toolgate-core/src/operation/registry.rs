//! Operation registry mapping ids to definitions and factories
//!
//! The `OperationRegistry` provides:
//! - Registration with duplicate detection
//! - Lookup by operation id
//! - Per-call instantiation through the registered factory
//! - Iteration in registration order
//!
//! The host builds the registry once and shares it behind an `Arc`; nothing in
//! the gateway mutates it afterwards.
//!
//! # Example
//!
//! ```rust,ignore
//! use toolgate_core::operation::{OperationDefinition, OperationRegistry};
//!
//! let mut registry = OperationRegistry::new();
//! registry.register(
//!     OperationDefinition::new("acme:status", "Site status").with_provider("acme"),
//!     || Ok(Box::new(SiteStatus::default())),
//! )?;
//!
//! let operation = registry.instantiate("acme:status")?;
//! ```

use super::definition::OperationDefinition;
use super::traits::Operation;
use std::collections::HashMap;
use std::sync::Arc;

/// Factory producing a fresh operation instance for each call
pub type OperationFactory = Arc<dyn Fn() -> anyhow::Result<Box<dyn Operation>> + Send + Sync>;

/// Error type for registry operations
#[derive(Debug, Clone, thiserror::Error)]
pub enum RegistryError {
    /// Operation with this id already exists
    #[error("Operation '{0}' is already registered")]
    DuplicateOperation(String),

    /// Operation not found
    #[error("Operation '{0}' not found")]
    NotFound(String),

    /// Factory failed to produce an instance
    #[error("{0}")]
    Instantiation(String),
}

/// A definition paired with the factory that builds it
#[derive(Clone)]
pub struct RegisteredOperation {
    definition: OperationDefinition,
    factory: OperationFactory,
}

impl RegisteredOperation {
    pub fn definition(&self) -> &OperationDefinition {
        &self.definition
    }

    /// Build a new instance
    pub fn instantiate(&self) -> anyhow::Result<Box<dyn Operation>> {
        (self.factory)()
    }
}

impl std::fmt::Debug for RegisteredOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisteredOperation")
            .field("id", &self.definition.id)
            .field("provider", &self.definition.provider)
            .finish()
    }
}

/// Registry of operations keyed by id
#[derive(Default)]
pub struct OperationRegistry {
    operations: Vec<RegisteredOperation>,
    index: HashMap<String, usize>,
}

impl std::fmt::Debug for OperationRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperationRegistry")
            .field("operation_count", &self.operations.len())
            .field("operations", &self.ids())
            .finish()
    }
}

impl OperationRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an operation
    ///
    /// Returns an error if an operation with the same id is already registered.
    pub fn register<F>(
        &mut self,
        definition: OperationDefinition,
        factory: F,
    ) -> Result<(), RegistryError>
    where
        F: Fn() -> anyhow::Result<Box<dyn Operation>> + Send + Sync + 'static,
    {
        self.register_shared(definition, Arc::new(factory))
    }

    /// Register an operation with an already shared factory
    pub fn register_shared(
        &mut self,
        definition: OperationDefinition,
        factory: OperationFactory,
    ) -> Result<(), RegistryError> {
        if self.index.contains_key(&definition.id) {
            return Err(RegistryError::DuplicateOperation(definition.id));
        }
        self.index
            .insert(definition.id.clone(), self.operations.len());
        self.operations.push(RegisteredOperation {
            definition,
            factory,
        });
        Ok(())
    }

    /// Get an operation by id
    pub fn get(&self, id: &str) -> Option<&RegisteredOperation> {
        self.index.get(id).map(|&i| &self.operations[i])
    }

    /// Get an operation's definition by id
    pub fn definition(&self, id: &str) -> Option<&OperationDefinition> {
        self.get(id).map(RegisteredOperation::definition)
    }

    /// Check if an operation is registered
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Build a fresh instance of an operation
    pub fn instantiate(&self, id: &str) -> Result<Box<dyn Operation>, RegistryError> {
        let entry = self
            .get(id)
            .ok_or_else(|| RegistryError::NotFound(id.to_string()))?;
        entry
            .instantiate()
            .map_err(|e| RegistryError::Instantiation(format!("{e:#}")))
    }

    /// All definitions in registration order
    pub fn definitions(&self) -> impl Iterator<Item = &OperationDefinition> {
        self.operations.iter().map(RegisteredOperation::definition)
    }

    /// All operation ids in registration order
    pub fn ids(&self) -> Vec<&str> {
        self.operations
            .iter()
            .map(|op| op.definition.id.as_str())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}
