//! Parameter validation against a tool schema.

use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;

use super::schema::{ParamType, Schema, value_kind};

/// Caller-supplied tool arguments.
pub type Arguments = Map<String, Value>;

/// A single schema violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Violation {
    /// A required parameter is absent (or explicitly `null`).
    Missing { field: String },

    /// A parameter is present but has the wrong JSON shape.
    TypeMismatch {
        field: String,
        expected: ParamType,
        actual: String,
    },
}

impl Violation {
    /// The parameter this violation is about.
    pub fn field(&self) -> &str {
        match self {
            Self::Missing { field } | Self::TypeMismatch { field, .. } => field,
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing { field } => write!(f, "missing required parameter '{}'", field),
            Self::TypeMismatch {
                field,
                expected,
                actual,
            } => write!(
                f,
                "parameter '{}' must be of type {}, got {}",
                field, expected, actual
            ),
        }
    }
}

/// Outcome of validating one argument map.
pub type ValidationResult = Result<(), Vec<Violation>>;

/// Validate arguments against a schema.
///
/// Every violation is collected, in schema declaration order. Arguments that
/// the schema does not declare are ignored.
pub fn validate(schema: &Schema, arguments: &Arguments) -> ValidationResult {
    let mut violations = Vec::new();

    for param in schema.params() {
        match arguments.get(&param.name) {
            None | Some(Value::Null) => {
                if param.required {
                    violations.push(Violation::Missing {
                        field: param.name.clone(),
                    });
                }
            }
            Some(value) if !param.param_type.matches(value) => {
                violations.push(Violation::TypeMismatch {
                    field: param.name.clone(),
                    expected: param.param_type,
                    actual: value_kind(value).to_string(),
                });
            }
            Some(_) => {}
        }
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(violations)
    }
}
