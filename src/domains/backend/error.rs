//! Backend-specific error types.

use thiserror::Error;

/// Errors returned by a [`BackendInvoker`](super::BackendInvoker).
#[derive(Debug, Error)]
pub enum BackendError {
    /// The request never produced a response (connect, timeout, TLS...).
    #[error("{operation}: request failed: {message}")]
    Transport { operation: String, message: String },

    /// The backend answered with a non-success status code.
    #[error("{operation}: backend returned HTTP {status}: {body}")]
    Status {
        operation: String,
        status: u16,
        body: String,
    },

    /// The backend declared a JSON body that could not be parsed.
    #[error("{operation}: malformed backend response: {message}")]
    Malformed { operation: String, message: String },

    /// The request URL could not be built from the base URL and path.
    #[error("{operation}: invalid request URL: {message}")]
    InvalidUrl { operation: String, message: String },
}

impl BackendError {
    /// Create a transport error.
    pub fn transport(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Transport {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Create a status error.
    pub fn status(operation: impl Into<String>, status: u16, body: impl Into<String>) -> Self {
        Self::Status {
            operation: operation.into(),
            status,
            body: body.into(),
        }
    }

    /// Create a malformed-response error.
    pub fn malformed(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Malformed {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Short machine-readable label for the failure kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Transport { .. } => "transport",
            Self::Status { .. } => "status",
            Self::Malformed { .. } => "malformed_response",
            Self::InvalidUrl { .. } => "invalid_url",
        }
    }

    /// The backend operation that failed.
    pub fn operation(&self) -> &str {
        match self {
            Self::Transport { operation, .. }
            | Self::Status { operation, .. }
            | Self::Malformed { operation, .. }
            | Self::InvalidUrl { operation, .. } => operation,
        }
    }

    /// The backend's own HTTP status, when it answered at all.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
