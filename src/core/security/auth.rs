//! Shared-secret authentication.

use serde_json::json;
use subtle::ConstantTimeEq;
use thiserror::Error;
use tracing::warn;

use crate::core::config::AuthConfig;
use crate::domains::tools::{ErrorBody, ErrorCode, ResponseEnvelope};

/// Number of leading characters of a rejected key that may appear in logs.
const LOGGED_PREFIX_LEN: usize = 8;

/// Reasons a caller is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// No credential was presented.
    #[error("Missing API key")]
    Missing,

    /// The credential does not match, or no secret is configured.
    #[error("Invalid API key")]
    Invalid,
}

impl AuthError {
    /// Structured error for a rejected caller. Both variants share the
    /// `Unauthorized` code.
    pub fn to_error_body(&self) -> ErrorBody {
        ErrorBody {
            code: ErrorCode::Unauthorized.code(),
            message: format!("Unauthorized: {}", self),
            data: Some(json!({ "reason": self.reason() })),
        }
    }

    fn reason(&self) -> &'static str {
        match self {
            Self::Missing => "missing",
            Self::Invalid => "invalid",
        }
    }
}

impl From<AuthError> for ResponseEnvelope {
    fn from(err: AuthError) -> Self {
        Self::failure(err.to_error_body())
    }
}

/// Compares presented credentials against the configured secret.
#[derive(Clone)]
pub struct AuthGate {
    expected: Option<String>,
    header_name: String,
}

impl std::fmt::Debug for AuthGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthGate")
            .field("configured", &self.expected.is_some())
            .field("header_name", &self.header_name)
            .finish()
    }
}

impl AuthGate {
    /// Create a gate. An empty expected secret counts as unset.
    pub fn new(expected: Option<String>, header_name: impl Into<String>) -> Self {
        Self {
            expected: expected.filter(|key| !key.is_empty()),
            header_name: header_name.into(),
        }
    }

    /// Create a gate from the auth section of the configuration.
    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(config.api_key.clone(), config.header_name.clone())
    }

    /// Name of the header the credential is read from.
    pub fn header_name(&self) -> &str {
        &self.header_name
    }

    /// Whether a secret is configured at all.
    pub fn is_configured(&self) -> bool {
        self.expected.is_some()
    }

    /// Check a presented credential.
    ///
    /// With no secret configured every caller is rejected.
    pub fn authenticate(&self, credential: Option<&str>) -> Result<(), AuthError> {
        let Some(presented) = credential.filter(|c| !c.is_empty()) else {
            warn!("Rejected request: no '{}' header", self.header_name);
            return Err(AuthError::Missing);
        };

        let Some(expected) = self.expected.as_deref() else {
            warn!("Rejected request: no API key configured on the server");
            return Err(AuthError::Invalid);
        };

        if bool::from(presented.as_bytes().ct_eq(expected.as_bytes())) {
            Ok(())
        } else {
            warn!("Rejected request: invalid API key '{}...'", key_prefix(presented));
            Err(AuthError::Invalid)
        }
    }
}

fn key_prefix(key: &str) -> String {
    key.chars().take(LOGGED_PREFIX_LEN).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gate() -> AuthGate {
        AuthGate::new(Some("s3cret-value".to_string()), "x-mcp-key")
    }

    #[test]
    fn test_accepts_matching_key() {
        assert_eq!(gate().authenticate(Some("s3cret-value")), Ok(()));
    }

    #[test]
    fn test_rejects_missing_and_wrong_keys() {
        assert_eq!(gate().authenticate(None), Err(AuthError::Missing));
        assert_eq!(gate().authenticate(Some("")), Err(AuthError::Missing));
        assert_eq!(gate().authenticate(Some("s3cret")), Err(AuthError::Invalid));
        assert_eq!(gate().authenticate(Some("s3cret-valuf")), Err(AuthError::Invalid));
    }

    #[test]
    fn test_unconfigured_gate_rejects_everything() {
        let unset = AuthGate::new(None, "x-mcp-key");
        assert!(!unset.is_configured());
        assert_eq!(unset.authenticate(Some("anything")), Err(AuthError::Invalid));

        let empty = AuthGate::new(Some(String::new()), "x-mcp-key");
        assert!(!empty.is_configured());
        assert_eq!(empty.authenticate(Some("")), Err(AuthError::Missing));
        assert_eq!(empty.authenticate(Some("x")), Err(AuthError::Invalid));
    }

    #[test]
    fn test_error_body_is_unauthorized() {
        for err in [AuthError::Missing, AuthError::Invalid] {
            let body = err.to_error_body();
            assert_eq!(body.code, ErrorCode::Unauthorized.code());
            assert_eq!(body.error_code(), Some(ErrorCode::Unauthorized));
        }
        let envelope: ResponseEnvelope = AuthError::Missing.into();
        assert!(!envelope.success);
        assert_eq!(envelope.error_code(), Some(ErrorCode::Unauthorized));
    }

    #[test]
    fn test_key_prefix_is_bounded() {
        assert_eq!(key_prefix("abcdefghijklmnop"), "abcdefgh");
        assert_eq!(key_prefix("abc"), "abc");
    }

    #[test]
    fn test_debug_hides_secret() {
        let debug_str = format!("{:?}", gate());
        assert!(!debug_str.contains("s3cret"));
    }
}
