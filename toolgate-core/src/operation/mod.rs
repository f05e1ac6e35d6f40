//! Operation model consumed by the gateway
//!
//! Hosts describe each exposed tool with an [`OperationDefinition`] and
//! register it together with a factory in an [`OperationRegistry`]. The
//! gateway never knows concrete operation types; it instantiates them by id
//! and drives them through the [`Operation`] trait.

mod definition;
pub mod name;
mod registry;
mod traits;

pub use definition::{
    Constraints, DataType, LengthConstraint, OperationDefinition, OperationKind,
    ParameterDefinition, RangeConstraint,
};
pub use registry::{OperationFactory, OperationRegistry, RegisteredOperation, RegistryError};
pub use traits::{Operation, OperationOutcome};
