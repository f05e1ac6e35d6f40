//! Operation and parameter definitions
//!
//! An [`OperationDefinition`] is the host-facing description of a tool: its
//! identity, the provider namespace it belongs to, the kind of side effect it
//! has, and an ordered list of typed parameters. Schema conversion, argument
//! coercion, and discovery all read from this one model.

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

/// Side-effect category of an operation.
///
/// Only `Read` produces a read-only hint; `Write` and `Trigger` are treated the
/// same by the gateway and differ only in how hosts describe them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    #[default]
    Read,
    Write,
    Trigger,
}

/// Declared shape of a parameter value.
///
/// Recursive shapes (lists of maps, maps of lists) are expressed by nesting
/// [`ParameterDefinition`]s inside `List` and `Map`.
///
/// Any type tag naming an entity (`entity`, `entity:node`, `entity_reference`)
/// reads as an entity reference; a `:` suffix becomes the target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", try_from = "TaggedDataType")]
pub enum DataType {
    String,
    Integer,
    Float,
    Boolean,
    Email,
    Uri,
    Datetime,
    Timestamp,
    List {
        /// Item definition; items are strings when absent
        #[serde(default, skip_serializing_if = "Option::is_none")]
        item: Option<Box<ParameterDefinition>>,
    },
    Map {
        /// Declared properties, in order
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        properties: Vec<ParameterDefinition>,
    },
    EntityReference {
        /// Entity type the reference points at, if constrained
        #[serde(default, skip_serializing_if = "Option::is_none")]
        target: Option<String>,
    },
}

impl DataType {
    /// Whether values of this type are referenced by id or handle
    pub fn is_entity_reference(&self) -> bool {
        matches!(self, DataType::EntityReference { .. })
    }
}

/// Wire form of [`DataType`] before the type tag is interpreted
#[derive(Deserialize)]
struct TaggedDataType {
    #[serde(rename = "type")]
    tag: String,
    #[serde(default)]
    item: Option<Box<ParameterDefinition>>,
    #[serde(default)]
    properties: Vec<ParameterDefinition>,
    #[serde(default)]
    target: Option<String>,
}

impl TryFrom<TaggedDataType> for DataType {
    type Error = String;

    fn try_from(raw: TaggedDataType) -> Result<Self, Self::Error> {
        let tag = raw.tag.trim().to_ascii_lowercase();
        let data_type = match tag.as_str() {
            "string" => DataType::String,
            "integer" => DataType::Integer,
            "float" => DataType::Float,
            "boolean" => DataType::Boolean,
            "email" => DataType::Email,
            "uri" => DataType::Uri,
            "datetime" => DataType::Datetime,
            "timestamp" => DataType::Timestamp,
            "list" => DataType::List { item: raw.item },
            "map" => DataType::Map {
                properties: raw.properties,
            },
            other if other.contains("entity") => DataType::EntityReference {
                target: raw.target.or_else(|| {
                    other
                        .split_once(':')
                        .map(|(_, target)| target.trim())
                        .filter(|target| !target.is_empty())
                        .map(str::to_string)
                }),
            },
            other => return Err(format!("unknown parameter type '{other}'")),
        };
        Ok(data_type)
    }
}

/// Minimum and maximum string length
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LengthConstraint {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<u64>,
}

/// Inclusive numeric bounds
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RangeConstraint {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<Number>,
}

/// Value constraints attached to a parameter
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Constraints {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<LengthConstraint>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<RangeConstraint>,

    /// Regular expression the value must match
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,

    /// Closed set of accepted values
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allowed_values: Vec<Value>,
}

impl Constraints {
    pub fn is_empty(&self) -> bool {
        self.length.is_none()
            && self.range.is_none()
            && self.pattern.is_none()
            && self.allowed_values.is_empty()
    }
}

/// A single named, typed parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterDefinition {
    /// Parameter name; unused for list items
    #[serde(default)]
    pub name: String,

    #[serde(flatten)]
    pub data_type: DataType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub required: bool,

    /// Accepts several values of `data_type`
    #[serde(default)]
    pub multiple: bool,

    #[serde(default, skip_serializing_if = "Constraints::is_empty")]
    pub constraints: Constraints,
}

impl ParameterDefinition {
    /// Create an optional parameter of the given type
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            description: None,
            required: false,
            multiple: false,
            constraints: Constraints::default(),
        }
    }

    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, DataType::String)
    }

    pub fn integer(name: impl Into<String>) -> Self {
        Self::new(name, DataType::Integer)
    }

    pub fn float(name: impl Into<String>) -> Self {
        Self::new(name, DataType::Float)
    }

    pub fn boolean(name: impl Into<String>) -> Self {
        Self::new(name, DataType::Boolean)
    }

    /// A list whose items follow `item`
    pub fn list(name: impl Into<String>, item: ParameterDefinition) -> Self {
        Self::new(
            name,
            DataType::List {
                item: Some(Box::new(item)),
            },
        )
    }

    /// A map with declared properties
    pub fn map(name: impl Into<String>, properties: Vec<ParameterDefinition>) -> Self {
        Self::new(name, DataType::Map { properties })
    }

    /// A reference to an entity of the given type
    pub fn entity(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self::new(
            name,
            DataType::EntityReference {
                target: Some(target.into()),
            },
        )
    }

    /// Mark the parameter as required
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Accept several values
    pub fn multiple(mut self) -> Self {
        self.multiple = true;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_length(mut self, min: Option<u64>, max: Option<u64>) -> Self {
        self.constraints.length = Some(LengthConstraint { min, max });
        self
    }

    pub fn with_range(mut self, min: Option<Number>, max: Option<Number>) -> Self {
        self.constraints.range = Some(RangeConstraint { min, max });
        self
    }

    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.constraints.pattern = Some(pattern.into());
        self
    }

    pub fn with_allowed_values(mut self, values: impl IntoIterator<Item = Value>) -> Self {
        self.constraints.allowed_values = values.into_iter().collect();
        self
    }

    /// Whether the value is carried as an array on the wire
    pub fn is_list(&self) -> bool {
        self.multiple || matches!(self.data_type, DataType::List { .. })
    }
}

/// Description of a registered operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationDefinition {
    /// Unique id; may contain `:` separators
    pub id: String,

    pub label: String,

    #[serde(default)]
    pub description: String,

    /// Provider namespace, matched against the allow-list prefix
    #[serde(default)]
    pub provider: String,

    #[serde(default)]
    pub kind: OperationKind,

    #[serde(default)]
    pub destructive: bool,

    /// Parameters in declaration order
    #[serde(default)]
    pub parameters: Vec<ParameterDefinition>,
}

impl OperationDefinition {
    /// Create a read operation with no parameters
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            description: String::new(),
            provider: String::new(),
            kind: OperationKind::Read,
            destructive: false,
            parameters: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = provider.into();
        self
    }

    pub fn with_kind(mut self, kind: OperationKind) -> Self {
        self.kind = kind;
        self
    }

    /// Mark the operation as destructive
    pub fn destructive(mut self) -> Self {
        self.destructive = true;
        self
    }

    pub fn with_parameter(mut self, parameter: ParameterDefinition) -> Self {
        self.parameters.push(parameter);
        self
    }

    /// Look up a declared parameter by name
    pub fn parameter(&self, name: &str) -> Option<&ParameterDefinition> {
        self.parameters.iter().find(|p| p.name == name)
    }
}
