//! Configuration management for the gateway.
//!
//! This module provides a centralized configuration structure populated from
//! environment variables (and a `.env` file) or defaults. It is built once at
//! startup and passed by reference to the auth gate and the backend client.

use super::error::{Error, Result};
use super::transport::TransportConfig;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Default header carrying the caller's shared secret.
pub const DEFAULT_API_KEY_HEADER: &str = "x-mcp-key";

/// Default backend request timeout, in seconds.
pub const DEFAULT_BACKEND_TIMEOUT_SECS: u64 = 30;

/// Main configuration structure for the gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server identification and metadata.
    pub server: ServerConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,

    /// Transport configuration.
    pub transport: TransportConfig,

    /// Caller authentication.
    pub auth: AuthConfig,

    /// Backlog API client configuration.
    pub backend: BackendConfig,
}

/// Server identification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The name of the server as reported to clients.
    pub name: String,

    /// The version of the server.
    pub version: String,

    /// Human-readable description shown by the info endpoint.
    pub description: String,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "trace").
    pub level: String,

    /// Whether to include timestamps in log output.
    pub with_timestamps: bool,
}

/// Shared-secret authentication for incoming requests.
#[derive(Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// The secret callers must present. `None` rejects every caller.
    pub api_key: Option<String>,

    /// Name of the request header carrying the secret.
    pub header_name: String,
}

/// Configuration for the backlog API client.
#[derive(Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL of the backlog API.
    pub base_url: Option<String>,

    /// API key sent to the backend as `x-api-key`.
    pub api_key: Option<String>,

    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

/// Custom Debug implementation to redact secrets from logs.
impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("header_name", &self.header_name)
            .finish()
    }
}

impl std::fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            header_name: DEFAULT_API_KEY_HEADER.to_string(),
        }
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            api_key: None,
            timeout_secs: DEFAULT_BACKEND_TIMEOUT_SECS,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                name: "backlog-mcp-gateway".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                description: "MCP gateway for projects, diagrams and backlog management"
                    .to_string(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                with_timestamps: true,
            },
            transport: TransportConfig::default(),
            auth: AuthConfig::default(),
            backend: BackendConfig::default(),
        }
    }
}

/// Read the first set, non-empty variable among `names`.
fn env_any(names: &[&str]) -> Option<String> {
    names
        .iter()
        .filter_map(|name| std::env::var(name).ok())
        .find(|value| !value.trim().is_empty())
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Environment variables are expected to be prefixed with `MCP_`.
    /// For example: `MCP_SERVER_NAME`, `MCP_LOG_LEVEL`. The unprefixed
    /// `API_KEY`, `BASE_URL` and `GOOGLE_API_KEY` are accepted as fallbacks.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let mut config = Self::default();

        if let Ok(name) = std::env::var("MCP_SERVER_NAME") {
            config.server.name = name;
        }

        if let Ok(description) = std::env::var("MCP_SERVER_DESCRIPTION") {
            config.server.description = description;
        }

        if let Ok(level) = std::env::var("MCP_LOG_LEVEL") {
            config.logging.level = level;
        }

        if let Ok(timestamps) = std::env::var("MCP_LOG_TIMESTAMPS") {
            config.logging.with_timestamps =
                timestamps.to_lowercase() != "false" && timestamps != "0";
        }

        // Load transport configuration from environment
        config.transport = TransportConfig::from_env();

        config.auth.api_key = env_any(&["MCP_API_KEY", "API_KEY"]);
        if let Ok(header) = std::env::var("MCP_API_KEY_HEADER") {
            config.auth.header_name = header.to_lowercase();
        }

        config.backend.base_url = env_any(&["MCP_BACKEND_URL", "BASE_URL"]);
        config.backend.api_key = env_any(&["MCP_BACKEND_API_KEY", "GOOGLE_API_KEY"]);
        if let Some(timeout) = env_any(&["MCP_BACKEND_TIMEOUT_SECS"]) {
            match timeout.parse() {
                Ok(secs) => config.backend.timeout_secs = secs,
                Err(_) => warn!(
                    "Ignoring invalid MCP_BACKEND_TIMEOUT_SECS '{}', using {}s",
                    timeout, DEFAULT_BACKEND_TIMEOUT_SECS
                ),
            }
        }

        if config.backend.api_key.is_some() {
            info!("Backend API key loaded from environment");
        } else {
            warn!("MCP_BACKEND_API_KEY not set - backend calls will be unauthenticated");
        }

        config
    }

    /// Check that the configuration is complete enough to serve requests.
    pub fn validate(&self) -> Result<()> {
        if self.transport.requires_auth() && self.auth.api_key.is_none() {
            return Err(Error::config(
                "MCP_API_KEY must be set when serving over the network",
            ));
        }
        if self.backend.base_url.is_none() {
            return Err(Error::config("MCP_BACKEND_URL (or BASE_URL) must be set"));
        }
        if self.backend.timeout_secs == 0 {
            return Err(Error::config("backend timeout must be greater than zero"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Mutex to ensure env var tests run serially
    static ENV_TEST_LOCK: Mutex<()> = Mutex::new(());

    fn clear_env() {
        for name in [
            "MCP_API_KEY",
            "API_KEY",
            "MCP_BACKEND_URL",
            "BASE_URL",
            "MCP_BACKEND_API_KEY",
            "GOOGLE_API_KEY",
            "MCP_BACKEND_TIMEOUT_SECS",
            "MCP_API_KEY_HEADER",
        ] {
            unsafe {
                std::env::remove_var(name);
            }
        }
    }

    #[test]
    fn test_auth_and_backend_from_env() {
        let _lock = ENV_TEST_LOCK.lock().unwrap();
        clear_env();
        unsafe {
            std::env::set_var("MCP_API_KEY", "caller_secret");
            std::env::set_var("MCP_BACKEND_URL", "http://backend.local/api");
            std::env::set_var("MCP_BACKEND_API_KEY", "backend_secret");
            std::env::set_var("MCP_BACKEND_TIMEOUT_SECS", "12");
            std::env::set_var("MCP_API_KEY_HEADER", "X-Gateway-Key");
        }
        let config = Config::from_env();
        assert_eq!(config.auth.api_key.as_deref(), Some("caller_secret"));
        assert_eq!(config.auth.header_name, "x-gateway-key");
        assert_eq!(config.backend.base_url.as_deref(), Some("http://backend.local/api"));
        assert_eq!(config.backend.api_key.as_deref(), Some("backend_secret"));
        assert_eq!(config.backend.timeout_secs, 12);
        clear_env();
    }

    #[test]
    fn test_unprefixed_fallbacks() {
        let _lock = ENV_TEST_LOCK.lock().unwrap();
        clear_env();
        unsafe {
            std::env::set_var("API_KEY", "legacy_key");
            std::env::set_var("BASE_URL", "http://legacy.local");
        }
        let config = Config::from_env();
        assert_eq!(config.auth.api_key.as_deref(), Some("legacy_key"));
        assert_eq!(config.backend.base_url.as_deref(), Some("http://legacy.local"));
        clear_env();
    }

    #[test]
    fn test_invalid_timeout_keeps_default() {
        let _lock = ENV_TEST_LOCK.lock().unwrap();
        clear_env();
        unsafe {
            std::env::set_var("MCP_BACKEND_TIMEOUT_SECS", "soon");
        }
        let config = Config::from_env();
        assert_eq!(config.backend.timeout_secs, DEFAULT_BACKEND_TIMEOUT_SECS);
        clear_env();
    }

    #[test]
    fn test_secrets_redacted_in_debug() {
        let auth = AuthConfig {
            api_key: Some("super_secret_key".to_string()),
            header_name: DEFAULT_API_KEY_HEADER.to_string(),
        };
        let backend = BackendConfig {
            base_url: Some("http://backend.local".to_string()),
            api_key: Some("other_secret".to_string()),
            timeout_secs: 5,
        };
        let debug_str = format!("{:?} {:?}", auth, backend);
        assert!(debug_str.contains("REDACTED"));
        assert!(!debug_str.contains("super_secret_key"));
        assert!(!debug_str.contains("other_secret"));
    }

    #[test]
    fn test_validate() {
        let mut config = Config::default();
        config.backend.base_url = Some("http://backend.local".to_string());
        if config.transport.requires_auth() {
            assert!(config.validate().is_err());
        }

        config.auth.api_key = Some("secret".to_string());
        assert!(config.validate().is_ok());

        config.backend.base_url = None;
        assert!(config.validate().is_err());
    }
}
