//! HTTP transport implementation.
//!
//! HTTP server exposing the gateway three ways:
//! - JSON-RPC 2.0 over `POST {rpc_path}` for MCP clients
//! - `POST /dispatch` and `POST /tool/{name}` returning the raw envelope
//! - unauthenticated discovery routes (`/tools`, `/mcp/info`, `/health`, `/`)
//!
//! Tool calls are checked against the auth gate before the dispatcher sees
//! them.

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use bytes::Bytes;
use http::{HeaderMap, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, instrument, warn};

use super::{TransportError, TransportResult, config::HttpConfig};
use crate::core::McpServer;
use crate::core::security::AuthError;
use crate::domains::tools::{
    Arguments, ErrorBody, ErrorCode, ResponseEnvelope, ToolRequest, router::to_call_tool_result,
};

/// MCP protocol revision reported when the client does not ask for one.
const DEFAULT_PROTOCOL_VERSION: &str = "2024-11-05";

/// HTTP transport handler.
pub struct HttpTransport {
    config: HttpConfig,
}

/// JSON-RPC request structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    #[serde(default)]
    pub id: Option<Value>,
    pub method: String,
    #[serde(default)]
    pub params: Option<Value>,
}

/// JSON-RPC response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

/// JSON-RPC error structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl From<ErrorBody> for JsonRpcError {
    fn from(body: ErrorBody) -> Self {
        Self {
            code: body.code,
            message: body.message,
            data: body.data,
        }
    }
}

impl JsonRpcResponse {
    /// Create a success response.
    pub fn success(id: Option<Value>, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    /// Create an error response.
    pub fn error(id: Option<Value>, error: JsonRpcError) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(error),
        }
    }

    fn simple_error(id: Option<Value>, code: i32, message: impl Into<String>) -> Self {
        Self::error(
            id,
            JsonRpcError {
                code,
                message: message.into(),
                data: None,
            },
        )
    }

    /// Parse error.
    pub fn parse_error(msg: impl Into<String>) -> Self {
        Self::simple_error(None, -32700, msg)
    }

    /// Method not found error.
    pub fn method_not_found(id: Option<Value>) -> Self {
        Self::simple_error(id, -32601, "Method not found")
    }

    /// Invalid request error.
    pub fn invalid_request(id: Option<Value>) -> Self {
        Self::simple_error(id, -32600, "Invalid Request")
    }

    /// Invalid params error.
    pub fn invalid_params(id: Option<Value>, msg: impl Into<String>) -> Self {
        Self::simple_error(id, ErrorCode::InvalidArguments.code(), msg)
    }

    /// Internal error.
    pub fn internal_error(id: Option<Value>, msg: impl Into<String>) -> Self {
        Self::simple_error(id, ErrorCode::InternalError.code(), msg)
    }
}

/// Application state shared across HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    server: McpServer,
    rpc_path: String,
}

impl HttpTransport {
    /// Create a new HTTP transport with the given config.
    pub fn new(config: HttpConfig) -> Self {
        Self { config }
    }

    /// Get the bind address.
    pub fn address(&self) -> String {
        format!("{}:{}", self.config.host, self.config.port)
    }

    /// Run the HTTP transport.
    pub async fn run(self, server: McpServer) -> TransportResult<()> {
        let addr = self.address();
        let app = build_router(server, &self.config);

        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| TransportError::bind(&addr, e))?;

        let cors_status = if self.config.enable_cors {
            "enabled"
        } else {
            "disabled"
        };
        info!("Ready - listening on {} (CORS {})", addr, cors_status);
        info!("  → JSON-RPC: POST {}", self.config.rpc_path);
        info!("  → Dispatch: POST /dispatch, POST /tool/{{name}}");
        info!("  → Tools:    GET /tools");
        info!("  → Health:   GET /health");

        axum::serve(listener, app)
            .await
            .map_err(|e| TransportError::http(e.to_string()))?;

        Ok(())
    }
}

/// Build the axum router for the gateway.
pub fn build_router(server: McpServer, config: &HttpConfig) -> Router {
    let state = AppState {
        server,
        rpc_path: config.rpc_path.clone(),
    };

    let mut app = Router::new()
        .route(&config.rpc_path, post(handle_rpc))
        .route("/dispatch", post(handle_dispatch))
        .route("/tool/{name}", post(handle_tool))
        .route("/tools", get(list_tools))
        .route("/mcp/info", get(server_info))
        .route("/health", get(health_check))
        .route("/", get(root_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    if config.enable_cors {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
        app = app.layer(cors);
    }

    app
}

/// HTTP status for an envelope on the REST dispatch routes.
pub fn status_for(envelope: &ResponseEnvelope) -> StatusCode {
    if envelope.success {
        return StatusCode::OK;
    }
    match envelope.error_code() {
        Some(ErrorCode::Unauthorized) => StatusCode::UNAUTHORIZED,
        Some(ErrorCode::UnknownTool) => StatusCode::NOT_FOUND,
        Some(ErrorCode::InvalidArguments) => StatusCode::BAD_REQUEST,
        Some(ErrorCode::NotImplemented) => StatusCode::NOT_IMPLEMENTED,
        Some(ErrorCode::BackendFailure) => StatusCode::BAD_GATEWAY,
        Some(ErrorCode::InternalError) | None => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn envelope_response(envelope: ResponseEnvelope) -> Response {
    (status_for(&envelope), Json(envelope)).into_response()
}

fn bad_request(message: impl Into<String>) -> Response {
    envelope_response(ResponseEnvelope::failure(ErrorBody {
        code: ErrorCode::InvalidArguments.code(),
        message: message.into(),
        data: None,
    }))
}

/// Run the auth gate on the configured header.
fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<(), AuthError> {
    let gate = state.server.auth();
    let credential = headers
        .get(gate.header_name())
        .and_then(|value| value.to_str().ok());
    gate.authenticate(credential)
}

/// Turn a `/tool/{name}` body into arguments. An empty body or `null` means
/// no arguments.
fn parse_arguments(body: &[u8]) -> Result<Arguments, String> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Arguments::new());
    }
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(Value::Null) => Ok(Arguments::new()),
        Ok(_) => Err("arguments must be a JSON object".to_string()),
        Err(e) => Err(format!("invalid JSON body: {}", e)),
    }
}

/// Root handler - provides API info.
async fn root_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "name": state.server.name(),
        "version": state.server.version(),
        "transport": "HTTP",
        "endpoints": {
            "rpc": state.rpc_path,
            "dispatch": "/dispatch",
            "tool": "/tool/{name}",
            "tools": "/tools",
            "info": "/mcp/info",
            "health": "/health"
        },
        "protocol": "JSON-RPC 2.0",
        "documentation": format!(
            "Send JSON-RPC messages to POST {}; tool calls need the '{}' header",
            state.rpc_path,
            state.server.auth().header_name()
        )
    }))
}

/// Health check endpoint.
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "tools": state.server.dispatcher().registry().len(),
        "dispatched": state.server.dispatcher().dispatch_count(),
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// Server metadata for MCP clients.
async fn server_info(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "name": state.server.name(),
        "version": state.server.version(),
        "description": state.server.description(),
        "protocolVersion": DEFAULT_PROTOCOL_VERSION,
        "capabilities": { "tools": {} },
        "auth": { "header": state.server.auth().header_name() }
    }))
}

/// Discovery listing.
async fn list_tools(State(state): State<AppState>) -> impl IntoResponse {
    let tools = state.server.list_tools();
    Json(json!({
        "count": tools.len(),
        "tools": tools
    }))
}

/// Dispatch a full `{tool_name, arguments}` request.
#[instrument(skip_all)]
async fn handle_dispatch(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<ToolRequest>, JsonRejection>,
) -> Response {
    if let Err(e) = authenticate(&state, &headers) {
        return envelope_response(e.into());
    }

    match body {
        Ok(Json(request)) => envelope_response(state.server.dispatch(request).await),
        Err(rejection) => {
            warn!("Rejected dispatch body: {}", rejection.body_text());
            bad_request(rejection.body_text())
        }
    }
}

/// Dispatch a call to the tool named in the path; the body is the argument
/// object.
#[instrument(skip_all, fields(tool))]
async fn handle_tool(
    State(state): State<AppState>,
    Path(name): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    tracing::Span::current().record("tool", name.as_str());

    if let Err(e) = authenticate(&state, &headers) {
        return envelope_response(e.into());
    }

    match parse_arguments(&body) {
        Ok(arguments) => {
            let request = ToolRequest::new(name, arguments);
            envelope_response(state.server.dispatch(request).await)
        }
        Err(message) => bad_request(message),
    }
}

/// Handle JSON-RPC requests.
#[instrument(skip_all, fields(method))]
async fn handle_rpc(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<JsonRpcRequest>, JsonRejection>,
) -> Response {
    let request = match body {
        Ok(Json(request)) => request,
        Err(rejection) => {
            warn!("Unparseable JSON-RPC body: {}", rejection.body_text());
            let response = JsonRpcResponse::parse_error(rejection.body_text());
            return (StatusCode::BAD_REQUEST, Json(response)).into_response();
        }
    };

    tracing::Span::current().record("method", request.method.as_str());
    info!("Received JSON-RPC request: {}", request.method);

    let (status, response) = process_request(&state, &headers, request).await;
    (status, Json(response)).into_response()
}

/// Process a JSON-RPC request and return the status and response.
async fn process_request(
    state: &AppState,
    headers: &HeaderMap,
    request: JsonRpcRequest,
) -> (StatusCode, JsonRpcResponse) {
    if request.jsonrpc != "2.0" {
        return (StatusCode::OK, JsonRpcResponse::invalid_request(request.id));
    }

    let response = match request.method.as_str() {
        "initialize" => handle_initialize(state, request),

        "ping" => JsonRpcResponse::success(request.id, json!({})),

        "tools/list" => {
            let tools = state.server.list_tools();
            JsonRpcResponse::success(request.id, json!({ "tools": tools }))
        }

        "tools/call" => {
            if let Err(e) = authenticate(state, headers) {
                let response = JsonRpcResponse::error(request.id, e.to_error_body().into());
                return (StatusCode::UNAUTHORIZED, response);
            }
            handle_tools_call(state, request).await
        }

        // Notifications need no answer over stateless HTTP
        method if method.starts_with("notifications/") => {
            info!("Received notification: {}", method);
            JsonRpcResponse::success(request.id, Value::Null)
        }

        _ => {
            warn!("Unknown method: {}", request.method);
            JsonRpcResponse::method_not_found(request.id)
        }
    };

    (StatusCode::OK, response)
}

/// Handle initialize request.
fn handle_initialize(state: &AppState, request: JsonRpcRequest) -> JsonRpcResponse {
    let protocol_version = request
        .params
        .as_ref()
        .and_then(|p| p.get("protocolVersion"))
        .and_then(Value::as_str)
        .unwrap_or(DEFAULT_PROTOCOL_VERSION)
        .to_string();
    info!("Processing initialize request (protocol {})", protocol_version);

    JsonRpcResponse::success(
        request.id,
        json!({
            "protocolVersion": protocol_version,
            "capabilities": { "tools": {} },
            "serverInfo": {
                "name": state.server.name(),
                "version": state.server.version()
            },
            "instructions": state.server.description()
        }),
    )
}

/// Handle tools/call request.
async fn handle_tools_call(state: &AppState, request: JsonRpcRequest) -> JsonRpcResponse {
    let Some(params) = request.params else {
        return JsonRpcResponse::invalid_params(request.id, "Missing params");
    };

    let Some(name) = params.get("name").and_then(Value::as_str) else {
        return JsonRpcResponse::invalid_params(request.id, "Missing tool name");
    };

    let arguments = match params.get("arguments") {
        None | Some(Value::Null) => Arguments::new(),
        Some(Value::Object(map)) => map.clone(),
        Some(_) => {
            return JsonRpcResponse::invalid_params(request.id, "arguments must be an object");
        }
    };

    let envelope = state
        .server
        .dispatch(ToolRequest::new(name, arguments))
        .await;

    match serde_json::to_value(to_call_tool_result(&envelope)) {
        Ok(result) => JsonRpcResponse::success(request.id, result),
        Err(e) => JsonRpcResponse::internal_error(request.id, e.to_string()),
    }
}
