//! JSON Schema for tool inputs.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// The `input_schema` a tool advertises to the model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentToolParameters {
    pub schema: Value,
}

impl AgentToolParameters {
    /// A tool that takes no input.
    pub fn empty() -> Self {
        Self::object().build()
    }

    pub fn object() -> ParameterBuilder {
        ParameterBuilder::default()
    }

    /// Names listed under `required`.
    pub fn required(&self) -> Vec<&str> {
        self.schema["required"]
            .as_array()
            .map(|names| names.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }
}

/// Collects string properties into an object schema.
#[derive(Debug, Default)]
pub struct ParameterBuilder {
    properties: Map<String, Value>,
    required: Vec<String>,
}

impl ParameterBuilder {
    pub fn string(self, name: &str, description: &str, required: bool) -> Self {
        self.add(name, json!({ "type": "string", "description": description }), required)
    }

    /// A string that must match `pattern`, e.g. a `YYYY-MM-DD` date.
    pub fn string_pattern(self, name: &str, description: &str, pattern: &str, required: bool) -> Self {
        self.add(
            name,
            json!({ "type": "string", "description": description, "pattern": pattern }),
            required,
        )
    }

    fn add(mut self, name: &str, property: Value, required: bool) -> Self {
        if required {
            self.required.push(name.to_string());
        }
        self.properties.insert(name.to_string(), property);
        self
    }

    pub fn build(self) -> AgentToolParameters {
        AgentToolParameters {
            schema: json!({
                "type": "object",
                "properties": self.properties,
                "required": self.required,
            }),
        }
    }
}
