//! The uniform request and response shapes of a tool call.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::error::{ErrorCode, ToolError};
use super::validator::Arguments;

/// A tool invocation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolRequest {
    pub tool_name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub arguments: Arguments,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Arguments, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<Arguments>::deserialize(deserializer).map(Option::unwrap_or_default)
}

impl ToolRequest {
    pub fn new(tool_name: impl Into<String>, arguments: Arguments) -> Self {
        Self {
            tool_name: tool_name.into(),
            arguments,
        }
    }
}

/// Structured error carried by a failure envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: i32,
    pub message: String,
    pub data: Option<Value>,
}

impl ErrorBody {
    /// The taxonomy entry for this error's code.
    pub fn error_code(&self) -> Option<ErrorCode> {
        ErrorCode::from_code(self.code)
    }
}

/// The result of every dispatch: either content or an error, never both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

impl ResponseEnvelope {
    /// Wrap a handler result.
    pub fn success(content: Value) -> Self {
        Self {
            success: true,
            content: Some(content),
            error: None,
        }
    }

    /// Wrap a structured error.
    pub fn failure(error: ErrorBody) -> Self {
        Self {
            success: false,
            content: None,
            error: Some(error),
        }
    }

    /// The error code of a failure envelope.
    pub fn error_code(&self) -> Option<ErrorCode> {
        self.error.as_ref().and_then(ErrorBody::error_code)
    }

    /// Render the envelope as human-readable text (pretty JSON content, or
    /// the error message).
    pub fn to_text(&self) -> String {
        match (&self.content, &self.error) {
            (_, Some(error)) => error.message.clone(),
            (Some(Value::String(text)), None) => text.clone(),
            (Some(content), None) => {
                serde_json::to_string_pretty(content).unwrap_or_else(|_| content.to_string())
            }
            (None, None) => String::new(),
        }
    }
}

impl From<ToolError> for ResponseEnvelope {
    fn from(err: ToolError) -> Self {
        Self::failure(err.to_error_body())
    }
}
