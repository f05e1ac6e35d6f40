//! Best-effort argument coercion
//!
//! Wire callers often send scalars as strings (`"5"`, `"false"`). Before an
//! operation sees its values, each argument with a declared parameter is
//! coerced towards the declared type. Coercion never fails: values it cannot
//! convert are passed through (numbers) or fall back to `false` (booleans).

use crate::operation::{DataType, OperationDefinition, ParameterDefinition};
use serde_json::{Map, Number, Value};

/// Coerce every argument that matches a declared parameter.
///
/// Keys without a declared parameter are kept unchanged.
pub fn coerce_arguments(
    definition: &OperationDefinition,
    mut arguments: Map<String, Value>,
) -> Map<String, Value> {
    for parameter in &definition.parameters {
        if let Some(value) = arguments.get_mut(&parameter.name) {
            *value = coerce_value(parameter, value.take());
        }
    }
    arguments
}

/// Coerce a single value towards its parameter definition
pub fn coerce_value(parameter: &ParameterDefinition, value: Value) -> Value {
    if parameter.is_list() {
        let value = match value {
            Value::Array(_) | Value::Null => value,
            Value::String(ref s) if s.is_empty() => value,
            other => Value::Array(vec![other]),
        };

        return match value {
            Value::Array(items) => {
                Value::Array(items.into_iter().map(|item| coerce_item(parameter, item)).collect())
            }
            other => other,
        };
    }

    coerce_single(&parameter.data_type, value)
}

/// Coerce one element of a list parameter
fn coerce_item(parameter: &ParameterDefinition, item: Value) -> Value {
    match &parameter.data_type {
        DataType::List { item: Some(definition) } => coerce_value(definition, item),
        DataType::List { item: None } => item,
        // `multiple` on a scalar type: items share the parameter's type
        other => coerce_single(other, item),
    }
}

fn coerce_single(data_type: &DataType, value: Value) -> Value {
    match data_type {
        DataType::Boolean => Value::Bool(to_bool(&value).unwrap_or(false)),
        DataType::Integer => to_integer(&value).map(Value::Number).unwrap_or(value),
        DataType::Float => to_float(&value).map(Value::Number).unwrap_or(value),
        DataType::Map { properties } => match value {
            Value::Object(mut map) => {
                for property in properties {
                    if let Some(nested) = map.get_mut(&property.name) {
                        *nested = coerce_value(property, nested.take());
                    }
                }
                Value::Object(map)
            }
            other => other,
        },
        _ => value,
    }
}

/// Boolean reading of a value; `None` when it is not recognisably boolean
fn to_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => match n.as_f64() {
            Some(f) if f == 1.0 => Some(true),
            Some(f) if f == 0.0 => Some(false),
            _ => None,
        },
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Some(true),
            "false" | "0" | "no" | "off" | "" => Some(false),
            _ => None,
        },
        Value::Null => Some(false),
        _ => None,
    }
}

/// Integer reading of a numeric value or numeric string
fn to_integer(value: &Value) -> Option<Number> {
    match value {
        Value::Number(n) if n.is_i64() || n.is_u64() => Some(n.clone()),
        Value::Number(n) => n.as_f64().and_then(truncate),
        Value::String(s) => {
            let s = s.trim();
            if let Ok(i) = s.parse::<i64>() {
                return Some(Number::from(i));
            }
            s.parse::<f64>().ok().filter(|f| f.is_finite()).and_then(truncate)
        }
        _ => None,
    }
}

fn truncate(f: f64) -> Option<Number> {
    if f.is_finite() && f >= i64::MIN as f64 && f <= i64::MAX as f64 {
        Some(Number::from(f.trunc() as i64))
    } else {
        None
    }
}

/// Float reading of a numeric value or numeric string
fn to_float(value: &Value) -> Option<Number> {
    match value {
        Value::Number(n) => Some(n.clone()),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .and_then(Number::from_f64),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn args(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("arguments must be an object"),
        }
    }

    #[test]
    fn test_count_and_flag_coerced() {
        let definition = OperationDefinition::new("acme:sync", "Sync")
            .with_parameter(ParameterDefinition::integer("count"))
            .with_parameter(ParameterDefinition::boolean("dry_run"));

        let coerced = coerce_arguments(&definition, args(json!({"count": "5", "dry_run": "false"})));
        assert_eq!(Value::Object(coerced), json!({"count": 5, "dry_run": false}));
    }

    #[test]
    fn test_unmatched_keys_pass_through() {
        let definition =
            OperationDefinition::new("acme:sync", "Sync").with_parameter(ParameterDefinition::integer("count"));

        let coerced = coerce_arguments(&definition, args(json!({"count": "2", "extra": "7"})));
        assert_eq!(Value::Object(coerced), json!({"count": 2, "extra": "7"}));
    }

    #[test]
    fn test_boolean_variants() {
        let flag = ParameterDefinition::boolean("flag");
        for (input, expected) in [
            (json!("TRUE"), true),
            (json!("yes"), true),
            (json!("On"), true),
            (json!("1"), true),
            (json!(1), true),
            (json!(true), true),
            (json!("false"), false),
            (json!("No"), false),
            (json!("0"), false),
            (json!(0), false),
            (json!(false), false),
            (json!("maybe"), false),
            (json!(7), false),
            (json!(["true"]), false),
        ] {
            assert_eq!(coerce_value(&flag, input.clone()), Value::Bool(expected), "input {input}");
        }
    }

    #[test]
    fn test_numbers() {
        let count = ParameterDefinition::integer("count");
        assert_eq!(coerce_value(&count, json!(" 42 ")), json!(42));
        assert_eq!(coerce_value(&count, json!("-3")), json!(-3));
        assert_eq!(coerce_value(&count, json!("5.9")), json!(5));
        assert_eq!(coerce_value(&count, json!(7)), json!(7));
        assert_eq!(coerce_value(&count, json!("many")), json!("many"));
        assert_eq!(coerce_value(&count, json!(null)), json!(null));

        let ratio = ParameterDefinition::float("ratio");
        assert_eq!(coerce_value(&ratio, json!("0.25")), json!(0.25));
        assert_eq!(coerce_value(&ratio, json!("1e3")), json!(1000.0));
        assert_eq!(coerce_value(&ratio, json!("NaN")), json!("NaN"));
        assert_eq!(coerce_value(&ratio, json!("abc")), json!("abc"));
    }

    #[test]
    fn test_typed_numbers_unchanged() {
        let ratio = ParameterDefinition::float("ratio");
        let coerced = coerce_value(&ratio, json!(5));
        assert_eq!(coerced, json!(5));
        assert!(coerced.is_i64());
        assert_eq!(coerce_value(&ratio, json!(0.5)), json!(0.5));

        let count = ParameterDefinition::integer("count");
        assert!(coerce_value(&count, json!(5)).is_i64());
    }

    #[test]
    fn test_list_wraps_scalar() {
        let tags = ParameterDefinition::list("tags", ParameterDefinition::string(""));
        assert_eq!(coerce_value(&tags, json!("news")), json!(["news"]));
        assert_eq!(coerce_value(&tags, json!(["a", "b"])), json!(["a", "b"]));
        assert_eq!(coerce_value(&tags, json!(null)), json!(null));
        assert_eq!(coerce_value(&tags, json!("")), json!(""));
    }

    #[test]
    fn test_multiple_coerces_items() {
        let ids = ParameterDefinition::integer("ids").multiple();
        assert_eq!(coerce_value(&ids, json!("4")), json!([4]));
        assert_eq!(coerce_value(&ids, json!(["1", 2, "x"])), json!([1, 2, "x"]));
    }

    #[test]
    fn test_nested_list_of_maps() {
        let fields = ParameterDefinition::list(
            "fields",
            ParameterDefinition::map(
                "",
                vec![
                    ParameterDefinition::boolean("required"),
                    ParameterDefinition::list("weights", ParameterDefinition::integer("")),
                ],
            ),
        );

        let coerced = coerce_value(
            &fields,
            json!([
                {"required": "yes", "weights": "3", "label": "Title"},
                {"required": 0}
            ]),
        );
        assert_eq!(
            coerced,
            json!([
                {"required": true, "weights": [3], "label": "Title"},
                {"required": false}
            ])
        );
    }

    #[test]
    fn test_map_of_non_object_passes_through() {
        let options = ParameterDefinition::map("options", vec![ParameterDefinition::integer("depth")]);
        assert_eq!(coerce_value(&options, json!("depth=2")), json!("depth=2"));
        assert_eq!(coerce_value(&options, json!({"depth": "2"})), json!({"depth": 2}));
    }

    #[test]
    fn test_other_types_unchanged() {
        let email = ParameterDefinition::new("email", DataType::Email);
        assert_eq!(coerce_value(&email, json!(12)), json!(12));
        let node = ParameterDefinition::entity("node", "node");
        assert_eq!(coerce_value(&node, json!(12)), json!(12));
    }
}
