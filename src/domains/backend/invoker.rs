//! The backend call abstraction shared by tool handlers.

use async_trait::async_trait;
use serde_json::Value;
use std::fmt;

use super::BackendError;

/// HTTP methods used by backend routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let method = match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
        };
        f.write_str(method)
    }
}

/// A fully resolved backend request.
///
/// Path segments are kept unencoded; the invoker is responsible for
/// percent-encoding them when it builds the final URL.
#[derive(Debug, Clone, PartialEq)]
pub struct BackendCall {
    /// Operation name, used for logging and error reporting.
    pub operation: String,
    pub method: HttpMethod,
    pub segments: Vec<String>,
    pub body: Option<Value>,
}

impl BackendCall {
    /// Create a call without a body.
    pub fn new(operation: impl Into<String>, method: HttpMethod, segments: Vec<String>) -> Self {
        Self {
            operation: operation.into(),
            method,
            segments,
            body: None,
        }
    }

    /// The unencoded request path, e.g. `/story-command/42`.
    pub fn path(&self) -> String {
        format!("/{}", self.segments.join("/"))
    }
}

/// Performs remote calls on behalf of tool handlers.
#[async_trait]
pub trait BackendInvoker: Send + Sync {
    /// Execute the call and return the decoded response body.
    async fn invoke(&self, call: BackendCall) -> Result<Value, BackendError>;
}
