//! Operation definition to MCP input schema and annotations

use crate::operation::{Constraints, DataType, OperationDefinition, OperationKind, ParameterDefinition};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

/// Description given to every entity-reference parameter
pub const ENTITY_REFERENCE_DESCRIPTION: &str =
    "Entity objects should be passed using an ID or a handle token returned by a previous tool call.";

/// MCP tool annotations
///
/// Hints that are unknown are omitted rather than sent as `false`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolAnnotations {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_only_hint: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destructive_hint: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub idempotent_hint: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open_world_hint: Option<bool>,
}

impl ToolAnnotations {
    pub fn is_read_only(&self) -> bool {
        self.read_only_hint.unwrap_or(false)
    }

    pub fn is_destructive(&self) -> bool {
        self.destructive_hint.unwrap_or(false)
    }

    pub fn is_idempotent(&self) -> bool {
        self.idempotent_hint.unwrap_or(false)
    }
}

/// Build the JSON Schema for an operation's arguments.
///
/// The result always has `"type": "object"` and a `properties` object (empty
/// when the operation takes no parameters). `required` is present only when at
/// least one parameter is required.
pub fn to_input_schema(definition: &OperationDefinition) -> Value {
    object_schema(&definition.parameters)
}

/// Derive annotation hints for an operation.
///
/// Read operations are read-only and idempotent. Write and trigger operations
/// get no idempotent hint since repeating them may not be safe. Operations
/// never reach outside the host, so `openWorldHint` is always false.
pub fn to_annotations(definition: &OperationDefinition) -> ToolAnnotations {
    let read_only = definition.kind == OperationKind::Read;

    ToolAnnotations {
        title: Some(definition.label.clone()),
        read_only_hint: Some(read_only),
        destructive_hint: definition.destructive.then_some(true),
        idempotent_hint: read_only.then_some(true),
        open_world_hint: Some(false),
    }
}

fn object_schema(parameters: &[ParameterDefinition]) -> Value {
    let mut properties = Map::new();
    let mut required = Vec::new();

    for parameter in parameters {
        properties.insert(parameter.name.clone(), parameter_schema(parameter));
        if parameter.required {
            required.push(Value::String(parameter.name.clone()));
        }
    }

    let mut schema = Map::new();
    schema.insert("type".into(), json!("object"));
    schema.insert("properties".into(), Value::Object(properties));
    if !required.is_empty() {
        schema.insert("required".into(), Value::Array(required));
    }
    Value::Object(schema)
}

/// Schema for one parameter, including list wrapping and its description
fn parameter_schema(parameter: &ParameterDefinition) -> Value {
    let mut schema = match &parameter.data_type {
        DataType::List { item } => {
            let mut items = match item {
                Some(item) => parameter_schema(item),
                None => json!({ "type": "string" }),
            };
            // The list's own constraints bind each item, as with `multiple`
            if let Value::Object(items) = &mut items {
                apply_constraints(items, &parameter.constraints);
            }
            let mut schema = Map::new();
            schema.insert("type".into(), json!("array"));
            schema.insert("items".into(), items);
            schema
        }
        _ if parameter.multiple => {
            let mut schema = Map::new();
            schema.insert("type".into(), json!("array"));
            schema.insert("items".into(), Value::Object(scalar_schema(parameter)));
            schema
        }
        _ => scalar_schema(parameter),
    };

    if let Some(description) = describe(parameter) {
        schema.insert("description".into(), Value::String(description));
    }
    Value::Object(schema)
}

/// Schema for a single (non-list) value with its constraints
fn scalar_schema(parameter: &ParameterDefinition) -> Map<String, Value> {
    let mut schema = Map::new();

    let (json_type, format) = match &parameter.data_type {
        DataType::String => ("string", None),
        DataType::Integer => ("integer", None),
        DataType::Float => ("number", None),
        DataType::Boolean => ("boolean", None),
        DataType::Email => ("string", Some("email")),
        DataType::Uri => ("string", Some("uri")),
        DataType::Datetime => ("string", Some("date-time")),
        DataType::Timestamp => ("integer", None),
        DataType::EntityReference { .. } => ("string", None),
        DataType::Map { .. } => ("object", None),
        DataType::List { .. } => ("array", None),
    };
    schema.insert("type".into(), json!(json_type));
    if let Some(format) = format {
        schema.insert("format".into(), json!(format));
    }

    if let DataType::Map { properties } = &parameter.data_type {
        if !properties.is_empty() {
            if let Value::Object(nested) = object_schema(properties) {
                for (key, value) in nested {
                    if key != "type" {
                        schema.insert(key, value);
                    }
                }
            }
        }
    }

    apply_constraints(&mut schema, &parameter.constraints);
    schema
}

/// Project constraints onto `schema`, keeping any keyword already present
fn apply_constraints(schema: &mut Map<String, Value>, constraints: &Constraints) {
    if let Some(length) = &constraints.length {
        if let Some(min) = length.min {
            schema.entry("minLength").or_insert(json!(min));
        }
        if let Some(max) = length.max {
            schema.entry("maxLength").or_insert(json!(max));
        }
    }
    if let Some(range) = &constraints.range {
        if let Some(min) = &range.min {
            schema.entry("minimum").or_insert(Value::Number(min.clone()));
        }
        if let Some(max) = &range.max {
            schema.entry("maximum").or_insert(Value::Number(max.clone()));
        }
    }
    if let Some(pattern) = &constraints.pattern {
        schema.entry("pattern").or_insert(json!(pattern));
    }
    if !constraints.allowed_values.is_empty() {
        schema
            .entry("enum")
            .or_insert(Value::Array(constraints.allowed_values.clone()));
    }
}

fn describe(parameter: &ParameterDefinition) -> Option<String> {
    let own = parameter
        .description
        .as_deref()
        .filter(|d| !d.is_empty());

    match (parameter.data_type.is_entity_reference(), own) {
        (true, Some(own)) => Some(format!("{ENTITY_REFERENCE_DESCRIPTION} {own}")),
        (true, None) => Some(ENTITY_REFERENCE_DESCRIPTION.to_string()),
        (false, own) => own.map(str::to_string),
    }
}
