//! Backlog MCP Gateway Library
//!
//! This crate exposes a catalog of backlog operations (projects, diagrams,
//! stories, features, actors) as MCP tools and forwards validated calls to
//! the backlog HTTP API.
//!
//! # Architecture
//!
//! The gateway is organized into the following modules:
//!
//! - **core**: Configuration, error handling, the auth gate, the server and transports
//! - **domains**: Business logic organized by bounded contexts
//!   - **tools**: Tool registry, argument validation and the dispatcher
//!   - **backend**: The backend invoker and its HTTP implementation
//!
//! # Example
//!
//! ```rust,no_run
//! use backlog_mcp_gateway::core::{Config, McpServer, TransportService};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env();
//!     config.validate()?;
//!     let server = McpServer::new(config.clone())?;
//!     TransportService::new(config.transport).run(server).await?;
//!     Ok(())
//! }
//! ```

pub mod core;
pub mod domains;

// Re-export commonly used types for convenience
pub use core::{Config, Error, McpServer, Result};
