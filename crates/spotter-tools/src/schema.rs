//! Tool definitions for the LLM tool layer.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

/// A capability definition as exposed to the LLM tool layer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    /// Capability name.
    pub name: String,
    /// What the capability does, phrased for the model.
    pub description: String,
    /// JSON-schema object describing the arguments.
    pub parameters: Value,
}

/// Builder for the JSON-schema `parameters` object.
pub struct ToolSchemaBuilder {
    name: String,
    description: String,
    properties: Map<String, Value>,
    required: Vec<String>,
}

impl ToolSchemaBuilder {
    /// Start a definition.
    #[must_use]
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            properties: Map::new(),
            required: Vec::new(),
        }
    }

    /// Add an optional property.
    #[must_use]
    pub fn property(mut self, key: &str, schema: Value) -> Self {
        let _ = self.properties.insert(key.to_string(), schema);
        self
    }

    /// Add a required property.
    #[must_use]
    pub fn required_property(mut self, key: &str, schema: Value) -> Self {
        self.required.push(key.to_string());
        self.property(key, schema)
    }

    /// Finish the definition.
    #[must_use]
    pub fn build(self) -> ToolDefinition {
        ToolDefinition {
            name: self.name,
            description: self.description,
            parameters: json!({
                "type": "object",
                "properties": self.properties,
                "required": self.required,
            }),
        }
    }
}
