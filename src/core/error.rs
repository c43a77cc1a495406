//! Error types and handling for the gateway.
//!
//! Failures of a single tool call never reach this type: the dispatcher turns
//! them into envelopes. This covers startup and transport failures.

use thiserror::Error;

/// A specialized Result type for gateway operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for the gateway.
#[derive(Debug, Error)]
pub enum Error {
    /// The tool catalog could not be built.
    #[error("Registry error: {0}")]
    Registry(#[from] crate::domains::tools::RegistryError),

    /// Transport failure.
    #[error("Transport error: {0}")]
    Transport(#[from] super::transport::TransportError),

    /// Configuration-related errors.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create a new configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::tools::RegistryError;

    #[test]
    fn test_registry_error_converts() {
        let err: Error = RegistryError::DuplicateTool("echo".to_string()).into();
        assert!(matches!(err, Error::Registry(_)));
        assert!(err.to_string().contains("echo"));
    }
}
