//! Tool-specific error types and the stable error-code taxonomy.

use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

use super::envelope::ErrorBody;
use super::validator::Violation;
use crate::domains::backend::BackendError;

/// Stable error codes returned to callers.
///
/// Clients pattern-match on these values, so they never change meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    Unauthorized,
    UnknownTool,
    InvalidArguments,
    BackendFailure,
    NotImplemented,
    InternalError,
}

impl ErrorCode {
    /// Numeric wire value.
    pub const fn code(self) -> i32 {
        match self {
            Self::Unauthorized => -32001,
            Self::UnknownTool => -32601,
            Self::InvalidArguments => -32602,
            Self::BackendFailure => -32000,
            Self::NotImplemented => -32002,
            Self::InternalError => -32603,
        }
    }

    /// Reverse lookup from a wire value.
    pub fn from_code(code: i32) -> Option<Self> {
        [
            Self::Unauthorized,
            Self::UnknownTool,
            Self::InvalidArguments,
            Self::BackendFailure,
            Self::NotImplemented,
            Self::InternalError,
        ]
        .into_iter()
        .find(|c| c.code() == code)
    }
}

/// Errors that can occur while dispatching a tool call.
#[derive(Debug, Error)]
pub enum ToolError {
    /// The requested tool is not registered.
    #[error("Unknown tool: '{0}'")]
    UnknownTool(String),

    /// The arguments violate the tool's schema.
    #[error("Invalid arguments for tool '{tool}': {}", format_violations(.violations))]
    InvalidArguments {
        tool: String,
        violations: Vec<Violation>,
    },

    /// The backend call failed.
    #[error("Backend call failed: {0}")]
    Backend(#[from] BackendError),

    /// The tool is advertised but its backend operation does not exist yet.
    #[error("Tool '{0}' is not implemented by the backend yet")]
    NotImplemented(String),

    /// Unexpected failure inside a handler.
    #[error("Internal error: {0}")]
    Internal(String),
}

fn format_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl ToolError {
    /// Create an "unknown tool" error.
    pub fn unknown_tool(name: impl Into<String>) -> Self {
        Self::UnknownTool(name.into())
    }

    /// Create an "invalid arguments" error.
    pub fn invalid_arguments(tool: impl Into<String>, violations: Vec<Violation>) -> Self {
        Self::InvalidArguments {
            tool: tool.into(),
            violations,
        }
    }

    /// Create an "internal" error.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// The taxonomy entry for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::UnknownTool(_) => ErrorCode::UnknownTool,
            Self::InvalidArguments { .. } => ErrorCode::InvalidArguments,
            Self::Backend(_) => ErrorCode::BackendFailure,
            Self::NotImplemented(_) => ErrorCode::NotImplemented,
            Self::Internal(_) => ErrorCode::InternalError,
        }
    }

    /// Convert into the structured error carried by a failure envelope.
    pub fn to_error_body(&self) -> ErrorBody {
        let data = match self {
            Self::UnknownTool(name) => Some(json!({ "tool_name": name })),
            Self::InvalidArguments { tool, violations } => Some(json!({
                "tool_name": tool,
                "violations": violations,
            })),
            Self::Backend(e) => Some(json!({
                "kind": e.kind(),
                "operation": e.operation(),
                "status_code": e.status_code(),
            })),
            Self::NotImplemented(name) => Some(json!({ "tool_name": name })),
            Self::Internal(_) => None,
        };

        ErrorBody {
            code: self.code().code(),
            message: self.to_string(),
            data,
        }
    }
}
