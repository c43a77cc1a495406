//! MCP server implementation and lifecycle management.
//!
//! This module contains the server handle shared by both transports. It owns
//! the configuration, the dispatcher over the frozen tool registry and the
//! auth gate.
//!
//! ## Tool Architecture
//!
//! Tools are declared in `domains/tools/definitions/` and registered once at
//! startup. The `ServerHandler` tool methods used by STDIO go through
//! `domains/tools/router.rs`, and the HTTP transport calls
//! [`McpServer::dispatch`] directly. Both end in the same dispatcher, so an
//! unregistered name is answered with an `UnknownTool` envelope everywhere.
//! **Adding a new tool does NOT require modifying this file!**

use rmcp::{ErrorData as McpError, RoleServer, ServerHandler, model::*, service::RequestContext};
use std::sync::Arc;
use tracing::{info, instrument};

use super::config::Config;
use super::security::AuthGate;
use crate::domains::backend::{BackendInvoker, HttpBackend};
use crate::domains::tools::{
    Dispatcher, ResponseEnvelope, ToolRegistry, ToolRequest, build_registry, router,
};

const INSTRUCTIONS: &str = "Gateway to the backlog API. Use the tools to manage projects, \
diagrams, stories, features and actors. Every call returns an envelope with either content \
or a structured error.";

/// The main MCP server handler.
///
/// This struct implements the `ServerHandler` trait from rmcp for STDIO and
/// exposes the same dispatcher to the HTTP transport.
#[derive(Clone)]
pub struct McpServer {
    /// Server configuration.
    config: Arc<Config>,

    /// Dispatcher over the tool registry.
    dispatcher: Dispatcher,

    /// Gate applied by network transports.
    auth: Arc<AuthGate>,
}

impl McpServer {
    /// Create a server with the full tool catalog and the HTTP backend client.
    pub fn new(config: Config) -> crate::core::Result<Self> {
        let registry = build_registry()?;
        let backend = Arc::new(HttpBackend::new(&config.backend)?);
        info!(
            "Registered {} tools, backend at {}",
            registry.len(),
            backend.base_url()
        );
        Ok(Self::from_parts(config, registry, backend))
    }

    /// Create a server from an explicit registry and backend.
    pub fn from_parts(
        config: Config,
        registry: ToolRegistry,
        backend: Arc<dyn BackendInvoker>,
    ) -> Self {
        let auth = Arc::new(AuthGate::from_config(&config.auth));
        if !auth.is_configured() {
            info!("No API key configured - authenticated routes will reject every caller");
        }

        Self {
            config: Arc::new(config),
            dispatcher: Dispatcher::new(Arc::new(registry), backend),
            auth,
        }
    }

    /// Get the server name.
    pub fn name(&self) -> &str {
        &self.config.server.name
    }

    /// Get the server version.
    pub fn version(&self) -> &str {
        &self.config.server.version
    }

    /// Get the server description.
    pub fn description(&self) -> &str {
        &self.config.server.description
    }

    /// Get the server configuration.
    pub fn config(&self) -> &Arc<Config> {
        &self.config
    }

    /// The auth gate for network transports.
    pub fn auth(&self) -> &AuthGate {
        &self.auth
    }

    /// The dispatcher shared by both transports.
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Discovery listing of every tool, in registration order.
    pub fn list_tools(&self) -> Vec<serde_json::Value> {
        self.dispatcher
            .registry()
            .list()
            .map(|descriptor| descriptor.to_json())
            .collect()
    }

    /// Dispatch one tool request. Authentication is the caller's concern.
    pub async fn dispatch(&self, request: ToolRequest) -> ResponseEnvelope {
        self.dispatcher.dispatch(request).await
    }
}

impl ServerHandler for McpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(INSTRUCTIONS.to_string()),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }

    #[instrument(skip(self, _request, _context))]
    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        Ok(ListToolsResult {
            tools: router::list_tools(&self.dispatcher),
            next_cursor: None,
            meta: None,
        })
    }

    /// Every name, registered or not, is answered with an envelope.
    #[instrument(skip(self, request, _context), fields(tool = %request.name))]
    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        Ok(router::call_tool(&self.dispatcher, request.name, request.arguments).await)
    }
}
