//! Tools domain module.
//!
//! This module handles all tool-related functionality for the gateway.
//! Tools are named backlog operations that MCP clients call with a JSON
//! argument map.
//!
//! ## Architecture
//!
//! - `schema.rs` - Parameter declarations attached to each tool
//! - `validator.rs` - Checks arguments against a schema, collecting every violation
//! - `registry.rs` - Name → (descriptor, handler), frozen after startup
//! - `handlers.rs` - Backend routes, in-process functions and not-implemented stubs
//! - `dispatcher.rs` - Lookup, validation, invocation and error normalization
//! - `envelope.rs` - Request and response envelope shapes
//! - `error.rs` - Tool error types and the stable error-code taxonomy
//! - `router.rs` - rmcp tool listing and calls for the STDIO transport
//! - `definitions/` - The tool catalog, one file per backlog resource
//!
//! ## Adding a New Tool
//!
//! Add a `registry.register(...)` call to the matching file in
//! `definitions/`. Both transports pick it up; nothing else changes.

pub mod definitions;
mod dispatcher;
mod envelope;
mod error;
mod handlers;
mod registry;
pub mod router;
mod schema;
mod validator;

pub use definitions::build_registry;
pub use dispatcher::Dispatcher;
pub use envelope::{ErrorBody, ResponseEnvelope, ToolRequest};
pub use error::{ErrorCode, ToolError};
pub use handlers::{BackendRoute, HandlerFn, Payload, ToolHandler};
pub use registry::{RegisteredTool, RegistryError, ToolDescriptor, ToolRegistry};
pub use schema::{ParamSpec, ParamType, Schema};
pub use validator::{Arguments, ValidationResult, Violation, validate};
