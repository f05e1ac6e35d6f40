//! Discovery catalog of the operations visible through the allow-list

use crate::operation::OperationDefinition;
use crate::operation::name::{to_operation_id, to_wire_name};
use crate::schema::{ToolAnnotations, to_annotations, to_input_schema};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Behaviour hints shown in discovery results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolHints {
    pub read_only: bool,
    pub destructive: bool,
    pub idempotent: bool,
}

/// Lightweight discovery entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSummary {
    pub name: String,
    pub label: String,
    pub description: String,
    pub provider: String,
    pub hints: ToolHints,
}

/// Everything known about one exposed operation
#[derive(Debug, Clone, PartialEq)]
pub struct ToolInfo {
    /// Wire name
    pub name: String,
    pub operation_id: String,
    pub label: String,
    pub description: String,
    pub provider: String,
    pub input_schema: Value,
    pub annotations: ToolAnnotations,
}

impl ToolInfo {
    pub fn from_definition(definition: &OperationDefinition) -> Self {
        Self {
            name: to_wire_name(&definition.id),
            operation_id: definition.id.clone(),
            label: definition.label.clone(),
            description: definition.description.clone(),
            provider: definition.provider.clone(),
            input_schema: to_input_schema(definition),
            annotations: to_annotations(definition),
        }
    }

    pub fn summary(&self) -> ToolSummary {
        ToolSummary {
            name: self.name.clone(),
            label: self.label.clone(),
            description: self.description.clone(),
            provider: self.provider.clone(),
            hints: ToolHints {
                read_only: self.annotations.is_read_only(),
                destructive: self.annotations.is_destructive(),
                idempotent: self.annotations.is_idempotent(),
            },
        }
    }

    /// Case-insensitive substring match over name, label and description.
    ///
    /// `query` must already be lowercased.
    fn matches(&self, query: &str) -> bool {
        format!("{} {} {}", self.name, self.label, self.description)
            .to_lowercase()
            .contains(query)
    }
}

/// Immutable snapshot of the exposed operations, in registration order
#[derive(Debug, Clone, Default)]
pub struct ToolCatalog {
    tools: Vec<ToolInfo>,
}

impl ToolCatalog {
    pub fn new<'a>(definitions: impl IntoIterator<Item = &'a OperationDefinition>) -> Self {
        Self {
            tools: definitions.into_iter().map(ToolInfo::from_definition).collect(),
        }
    }

    /// Entries matching `query`; a missing or blank query matches everything
    pub fn search(&self, query: Option<&str>) -> Vec<&ToolInfo> {
        let query = query.map(str::trim).filter(|q| !q.is_empty()).map(str::to_lowercase);
        self.tools
            .iter()
            .filter(|tool| query.as_deref().is_none_or(|q| tool.matches(q)))
            .collect()
    }

    /// Look up by wire name, falling back to the raw operation id
    pub fn get(&self, name: &str) -> Option<&ToolInfo> {
        self.tools.iter().find(|tool| tool.name == name).or_else(|| {
            let operation_id = to_operation_id(name);
            self.tools.iter().find(|tool| tool.operation_id == operation_id)
        })
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ToolInfo> {
        self.tools.iter()
    }
}
