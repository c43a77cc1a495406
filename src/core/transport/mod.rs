//! Transport layer for the gateway.
//!
//! This module provides two transport implementations:
//! - **HTTP**: axum server exposing JSON-RPC on POST plus REST dispatch and
//!   discovery routes - feature: `http` (default)
//! - **STDIO**: rmcp over standard input/output for a locally spawned
//!   client - feature: `stdio`
//!
//! Both transports hand tool calls to the same dispatcher.

mod config;
mod error;
mod service;

#[cfg(feature = "http")]
pub mod http;

#[cfg(feature = "stdio")]
pub mod stdio;

pub use config::TransportConfig;
pub use error::{TransportError, TransportResult};
pub use service::TransportService;

#[cfg(feature = "http")]
pub use config::HttpConfig;
