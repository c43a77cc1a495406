//! Core module containing shared infrastructure components.
//!
//! This module provides the foundational building blocks for the gateway,
//! including error handling, configuration, caller authentication, the server
//! handle and the transport layer.

pub mod config;
pub mod error;
pub mod security;
pub mod server;
pub mod transport;

pub use config::Config;
pub use error::{Error, Result};
pub use security::{AuthError, AuthGate};
pub use server::McpServer;
pub use transport::{TransportConfig, TransportService};
