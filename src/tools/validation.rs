//! Validate tool call arguments against JSON Schema before execution.

use crate::error::HrAgentError;

/// Validate tool arguments against a JSON Schema.
///
/// Top-level only: schema type, required field presence, and property
/// types. Returns the first violation found.
pub fn validate_arguments(
    args: &serde_json::Value,
    schema: &serde_json::Value,
) -> Result<(), HrAgentError> {
    if schema.get("type").and_then(|v| v.as_str()) == Some("object") && !args.is_object() {
        return Err(invalid(format!(
            "expected object arguments, got {}",
            json_type_name(args)
        )));
    }

    let Some(obj) = args.as_object() else {
        return Ok(());
    };

    if let Some(required) = schema.get("required").and_then(|v| v.as_array()) {
        if let Some(name) = required
            .iter()
            .filter_map(|field| field.as_str())
            .find(|name| !obj.contains_key(*name))
        {
            return Err(invalid(format!("missing required field '{name}'")));
        }
    }

    if let Some(properties) = schema.get("properties").and_then(|v| v.as_object()) {
        for (key, value) in obj {
            let expected = properties
                .get(key)
                .and_then(|prop| prop.get("type"))
                .and_then(|t| t.as_str());
            if let Some(expected) = expected {
                if !value_matches_type(value, expected) {
                    return Err(invalid(format!(
                        "field '{key}' expected type '{expected}', got {}",
                        json_type_name(value)
                    )));
                }
            }
        }
    }

    Ok(())
}

fn invalid(message: String) -> HrAgentError {
    HrAgentError::InvalidArgument(message)
}

fn value_matches_type(value: &serde_json::Value, expected: &str) -> bool {
    match expected {
        "string" => value.is_string(),
        "number" => value.is_number(),
        "integer" => value.is_i64() || value.is_u64(),
        "boolean" => value.is_boolean(),
        "object" => value.is_object(),
        "array" => value.is_array(),
        "null" => value.is_null(),
        _ => true,
    }
}

fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
