//! Tool input schemas.
//!
//! A [`Schema`] is an ordered list of parameters, each with a type and a
//! required flag. It is attached to a tool descriptor once at startup and
//! interpreted by the validator on every call. The same value renders to a
//! JSON-Schema object for capability discovery.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::fmt;

/// The JSON shape a parameter is expected to have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    String,
    Integer,
    Number,
    Boolean,
    Object,
    Array,
}

impl ParamType {
    /// The JSON-Schema type keyword for this parameter type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Object => "object",
            Self::Array => "array",
        }
    }

    /// Check whether a JSON value conforms to this type.
    ///
    /// `Integer` only accepts integral JSON numbers, while `Number` accepts
    /// any JSON number.
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Integer => value.is_i64() || value.is_u64(),
            Self::Number => value.is_number(),
            Self::Boolean => value.is_boolean(),
            Self::Object => value.is_object(),
            Self::Array => value.is_array(),
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Name of the runtime shape of a JSON value, for error reporting.
pub fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_i64() || n.is_u64() => "integer",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Declaration of a single tool parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub param_type: ParamType,
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Ordered parameter declarations for one tool.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    params: Vec<ParamSpec>,
}

impl Schema {
    /// Create an empty schema (a tool without parameters).
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a required parameter.
    pub fn required(self, name: &str, param_type: ParamType, description: &str) -> Self {
        self.param(name, param_type, true, Some(description))
    }

    /// Add an optional parameter.
    pub fn optional(self, name: &str, param_type: ParamType, description: &str) -> Self {
        self.param(name, param_type, false, Some(description))
    }

    /// Add a parameter.
    ///
    /// Redeclaring a name replaces the earlier declaration in place.
    pub fn param(
        mut self,
        name: &str,
        param_type: ParamType,
        required: bool,
        description: Option<&str>,
    ) -> Self {
        let spec = ParamSpec {
            name: name.to_string(),
            param_type,
            required,
            description: description.map(str::to_string),
        };
        match self.params.iter_mut().find(|p| p.name == name) {
            Some(existing) => *existing = spec,
            None => self.params.push(spec),
        }
        self
    }

    /// Parameters in declaration order.
    pub fn params(&self) -> &[ParamSpec] {
        &self.params
    }

    /// Look up a parameter by name.
    pub fn get(&self, name: &str) -> Option<&ParamSpec> {
        self.params.iter().find(|p| p.name == name)
    }

    /// Names of the required parameters, in declaration order.
    pub fn required_names(&self) -> Vec<&str> {
        self.params
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name.as_str())
            .collect()
    }

    /// Render as a JSON-Schema object for tool discovery.
    pub fn to_json_schema(&self) -> Map<String, Value> {
        let mut properties = Map::new();
        for param in &self.params {
            let mut property = Map::new();
            property.insert("type".to_string(), json!(param.param_type.as_str()));
            if let Some(description) = &param.description {
                property.insert("description".to_string(), json!(description));
            }
            properties.insert(param.name.clone(), Value::Object(property));
        }

        let mut schema = Map::new();
        schema.insert("type".to_string(), json!("object"));
        schema.insert("properties".to_string(), Value::Object(properties));
        schema.insert("required".to_string(), json!(self.required_names()));
        schema
    }
}
