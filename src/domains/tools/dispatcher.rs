//! Dispatcher - resolves, validates and invokes one tool call.
//!
//! `dispatch` is the single chokepoint of the tools domain: whatever the
//! handler does (returns, fails, panics), the caller gets exactly one
//! well-formed [`ResponseEnvelope`].

use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tracing::{error, info, instrument, warn};

use super::envelope::{ResponseEnvelope, ToolRequest};
use super::error::ToolError;
use super::registry::{ToolDescriptor, ToolRegistry};
use super::validator::validate;
use crate::domains::backend::BackendInvoker;

/// Routes tool requests to their handlers.
#[derive(Clone)]
pub struct Dispatcher {
    registry: Arc<ToolRegistry>,
    backend: Arc<dyn BackendInvoker>,
    /// Requests that reached lookup, shared by every clone.
    dispatched: Arc<AtomicU64>,
}

impl Dispatcher {
    /// Create a dispatcher over a frozen registry.
    pub fn new(registry: Arc<ToolRegistry>, backend: Arc<dyn BackendInvoker>) -> Self {
        Self {
            registry,
            backend,
            dispatched: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Number of requests that have reached tool lookup.
    pub fn dispatch_count(&self) -> u64 {
        self.dispatched.load(Ordering::Relaxed)
    }

    /// The registry this dispatcher serves.
    pub fn registry(&self) -> &Arc<ToolRegistry> {
        &self.registry
    }

    /// Descriptors of every registered tool, in registration order.
    pub fn list_tools(&self) -> Vec<ToolDescriptor> {
        self.registry.list().cloned().collect()
    }

    /// Dispatch one request and normalize the outcome.
    #[instrument(skip(self, request), fields(tool = %request.tool_name))]
    pub async fn dispatch(&self, request: ToolRequest) -> ResponseEnvelope {
        let started = Instant::now();
        let tool_name = request.tool_name;
        self.dispatched.fetch_add(1, Ordering::Relaxed);

        let Some(tool) = self.registry.lookup(&tool_name) else {
            warn!("Unknown tool requested: {}", tool_name);
            return ToolError::unknown_tool(tool_name).into();
        };

        if let Err(violations) = validate(&tool.descriptor.input_schema, &request.arguments) {
            warn!(
                "Rejected call to '{}': {} argument violation(s)",
                tool_name,
                violations.len()
            );
            return ToolError::invalid_arguments(tool_name, violations).into();
        }

        // `invoke` itself runs inside the guard: a function handler may panic
        // before it has built its future.
        let tool = tool.clone();
        let backend = self.backend.clone();
        let name = tool_name.clone();
        let arguments = request.arguments;
        let invocation = async move {
            let schema = &tool.descriptor.input_schema;
            tool.handler.invoke(&name, schema, backend, arguments).await
        };
        let outcome = AssertUnwindSafe(invocation).catch_unwind().await;
        let elapsed_ms = started.elapsed().as_millis();

        match outcome {
            Ok(Ok(content)) => {
                info!("Tool '{}' succeeded in {}ms", tool_name, elapsed_ms);
                ResponseEnvelope::success(content)
            }
            Ok(Err(e)) => {
                match &e {
                    ToolError::NotImplemented(_) => {
                        warn!("Tool '{}' is not implemented by the backend", tool_name)
                    }
                    _ => error!("Tool '{}' failed after {}ms: {}", tool_name, elapsed_ms, e),
                }
                e.into()
            }
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                error!("Tool '{}' panicked: {}", tool_name, message);
                ToolError::internal(format!("tool '{}' panicked: {}", tool_name, message)).into()
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::domains::backend::{BackendCall, BackendError};
    use crate::domains::tools::error::ErrorCode;
    use crate::domains::tools::handlers::{BackendRoute, Payload, ToolHandler};
    use crate::domains::tools::schema::{ParamType, Schema};
    use crate::domains::tools::validator::Arguments;
    use async_trait::async_trait;
    use serde_json::{Value, json};
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Backend fake that records every call and answers with a fixed result.
    pub(crate) struct RecordingBackend {
        pub calls: Mutex<Vec<BackendCall>>,
        pub status: Option<u16>,
    }

    impl RecordingBackend {
        pub fn ok() -> Arc<Self> {
            Arc::new(Self {
                calls: Mutex::new(Vec::new()),
                status: None,
            })
        }

        pub fn failing(status: u16) -> Arc<Self> {
            Arc::new(Self {
                calls: Mutex::new(Vec::new()),
                status: Some(status),
            })
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl BackendInvoker for RecordingBackend {
        async fn invoke(&self, call: BackendCall) -> Result<Value, BackendError> {
            self.calls.lock().unwrap().push(call.clone());
            match self.status {
                Some(status) => Err(BackendError::status(&call.operation, status, "boom")),
                None => Ok(json!({ "path": call.path(), "body": call.body })),
            }
        }
    }

    fn args(value: Value) -> Arguments {
        value.as_object().cloned().unwrap_or_default()
    }

    fn echo_schema() -> Schema {
        Schema::new().required("text", ParamType::String, "Text to echo")
    }

    /// Registry with `echo`, two panicking tools, story routes and the
    /// not-implemented `delete_story`, plus a counter of how many times
    /// `echo` ran.
    fn registry_with_counter() -> (ToolRegistry, Arc<AtomicUsize>) {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut registry = ToolRegistry::new();

        let echo_counter = counter.clone();
        registry
            .register(
                ToolDescriptor::new("echo", "Echo the input", echo_schema()),
                ToolHandler::function(move |args| {
                    echo_counter.fetch_add(1, Ordering::SeqCst);
                    async move { Ok(Value::Object(args)) }
                }),
            )
            .unwrap();
        registry
            .register(
                ToolDescriptor::new("panic", "Always panics", Schema::new()),
                ToolHandler::function(|_| async move {
                    if true {
                        panic!("handler exploded");
                    }
                    Ok(Value::Null)
                }),
            )
            .unwrap();
        registry
            .register(
                ToolDescriptor::new("panic_eagerly", "Panics before it is polled", Schema::new()),
                ToolHandler::function(|args: Arguments| {
                    let per_field = 10 / args.len();
                    async move { Ok(json!(per_field)) }
                }),
            )
            .unwrap();
        registry
            .register(
                ToolDescriptor::new(
                    "get_story",
                    "Get a story",
                    Schema::new().required("story_id", ParamType::String, "Story ID"),
                ),
                ToolHandler::Backend(BackendRoute::get("/story-command/{story_id}")),
            )
            .unwrap();
        registry
            .register(
                ToolDescriptor::new(
                    "update_story",
                    "Update a story",
                    Schema::new().required("story_data", ParamType::Object, "Story data"),
                ),
                ToolHandler::Backend(BackendRoute::put(
                    "/story-command/update",
                    Payload::Field("story_data"),
                )),
            )
            .unwrap();
        registry
            .register(
                ToolDescriptor::new(
                    "rename_story",
                    "Rename a story",
                    Schema::new()
                        .required("story_id", ParamType::String, "Story ID")
                        .required("title", ParamType::String, "New title"),
                ),
                ToolHandler::Backend(BackendRoute::patch(
                    "/story-command/{story_id}/rename",
                    Payload::Json,
                )),
            )
            .unwrap();
        registry
            .register(
                ToolDescriptor::new(
                    "delete_story",
                    "Delete a story",
                    Schema::new().required("story_id", ParamType::String, "Story ID"),
                ),
                ToolHandler::NotImplemented,
            )
            .unwrap();

        (registry, counter)
    }

    fn dispatcher(backend: Arc<RecordingBackend>) -> (Dispatcher, Arc<AtomicUsize>) {
        let (registry, counter) = registry_with_counter();
        (Dispatcher::new(Arc::new(registry), backend), counter)
    }

    #[tokio::test]
    async fn test_echo_success() {
        let (dispatcher, _) = dispatcher(RecordingBackend::ok());
        let envelope = dispatcher
            .dispatch(ToolRequest::new("echo", args(json!({"text": "hi"}))))
            .await;
        assert_eq!(envelope, ResponseEnvelope::success(json!({"text": "hi"})));
    }

    #[tokio::test]
    async fn test_missing_required_field() {
        let (dispatcher, counter) = dispatcher(RecordingBackend::ok());
        let envelope = dispatcher
            .dispatch(ToolRequest::new("echo", Arguments::new()))
            .await;

        assert!(!envelope.success);
        assert!(envelope.content.is_none());
        let error = envelope.error.unwrap();
        assert_eq!(error.code, ErrorCode::InvalidArguments.code());
        assert!(error.message.contains("text"));
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_unknown_tool_never_invokes() {
        let backend = RecordingBackend::ok();
        let (dispatcher, counter) = dispatcher(backend.clone());
        let envelope = dispatcher
            .dispatch(ToolRequest::new("nope", Arguments::new()))
            .await;

        assert!(!envelope.success);
        assert_eq!(envelope.error_code(), Some(ErrorCode::UnknownTool));
        assert_eq!(counter.load(Ordering::SeqCst), 0);
        assert_eq!(backend.call_count(), 0);
    }

    #[tokio::test]
    async fn test_extra_fields_do_not_block_invocation() {
        let (dispatcher, counter) = dispatcher(RecordingBackend::ok());
        let envelope = dispatcher
            .dispatch(ToolRequest::new(
                "echo",
                args(json!({"text": "hi", "verbose": true, "tags": ["a"]})),
            ))
            .await;
        assert!(envelope.success);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_dispatch_twice_is_structurally_identical() {
        let (dispatcher, counter) = dispatcher(RecordingBackend::ok());
        let request = ToolRequest::new("echo", args(json!({"text": "again"})));
        let first = dispatcher.dispatch(request.clone()).await;
        let second = dispatcher.dispatch(request).await;
        assert_eq!(first, second);
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_panicking_handler_becomes_internal_error() {
        let (dispatcher, _) = dispatcher(RecordingBackend::ok());
        let envelope = dispatcher
            .dispatch(ToolRequest::new("panic", Arguments::new()))
            .await;

        assert!(!envelope.success);
        assert_eq!(envelope.error_code(), Some(ErrorCode::InternalError));
        assert!(envelope.error.unwrap().message.contains("handler exploded"));

        // The dispatcher is still usable afterwards.
        let envelope = dispatcher
            .dispatch(ToolRequest::new("echo", args(json!({"text": "still here"}))))
            .await;
        assert!(envelope.success);
    }

    #[tokio::test]
    async fn test_handler_panicking_before_its_future_is_internal_error() {
        let (dispatcher, _) = dispatcher(RecordingBackend::ok());
        let envelope = dispatcher
            .dispatch(ToolRequest::new("panic_eagerly", Arguments::new()))
            .await;

        assert!(!envelope.success);
        assert_eq!(envelope.error_code(), Some(ErrorCode::InternalError));
        assert!(envelope.error.unwrap().message.contains("panic_eagerly"));

        let envelope = dispatcher
            .dispatch(ToolRequest::new("panic_eagerly", args(json!({"a": 1, "b": 2}))))
            .await;
        assert_eq!(envelope, ResponseEnvelope::success(json!(5)));
    }

    #[tokio::test]
    async fn test_eager_panic_inside_spawned_task_still_yields_envelope() {
        let (dispatcher, _) = dispatcher(RecordingBackend::ok());
        let handle = tokio::spawn(async move {
            dispatcher
                .dispatch(ToolRequest::new("panic_eagerly", Arguments::new()))
                .await
        });
        let envelope = handle.await.unwrap();
        assert_eq!(envelope.error_code(), Some(ErrorCode::InternalError));
    }

    #[tokio::test]
    async fn test_json_body_carries_only_declared_fields() {
        let backend = RecordingBackend::ok();
        let (dispatcher, _) = dispatcher(backend.clone());
        let envelope = dispatcher
            .dispatch(ToolRequest::new(
                "rename_story",
                args(json!({"story_id": "s-1", "title": "New", "admin": true})),
            ))
            .await;

        assert!(envelope.success);
        let calls = backend.calls.lock().unwrap();
        assert_eq!(calls[0].path(), "/story-command/s-1/rename");
        assert_eq!(calls[0].body, Some(json!({"title": "New"})));
    }

    #[tokio::test]
    async fn test_dispatch_count_includes_rejected_requests() {
        let (dispatcher, _) = dispatcher(RecordingBackend::ok());
        assert_eq!(dispatcher.dispatch_count(), 0);

        dispatcher
            .dispatch(ToolRequest::new("echo", args(json!({"text": "hi"}))))
            .await;
        dispatcher
            .dispatch(ToolRequest::new("nope", Arguments::new()))
            .await;
        let clone = dispatcher.clone();
        clone.dispatch(ToolRequest::new("echo", Arguments::new())).await;

        assert_eq!(dispatcher.dispatch_count(), 3);
    }

    #[tokio::test]
    async fn test_backend_route_forwards_call() {
        let backend = RecordingBackend::ok();
        let (dispatcher, _) = dispatcher(backend.clone());
        let envelope = dispatcher
            .dispatch(ToolRequest::new("get_story", args(json!({"story_id": "s-1"}))))
            .await;

        assert!(envelope.success);
        assert_eq!(envelope.content.unwrap()["path"], "/story-command/s-1");
        let calls = backend.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].operation, "get_story");
    }

    #[tokio::test]
    async fn test_backend_field_payload() {
        let backend = RecordingBackend::ok();
        let (dispatcher, _) = dispatcher(backend.clone());
        let envelope = dispatcher
            .dispatch(ToolRequest::new(
                "update_story",
                args(json!({"story_data": {"id": "s-1", "title": "New"}})),
            ))
            .await;

        assert!(envelope.success);
        assert_eq!(
            envelope.content.unwrap()["body"],
            json!({"id": "s-1", "title": "New"})
        );
    }

    #[tokio::test]
    async fn test_backend_failure_is_normalized() {
        let backend = RecordingBackend::failing(503);
        let (dispatcher, _) = dispatcher(backend.clone());
        let envelope = dispatcher
            .dispatch(ToolRequest::new("get_story", args(json!({"story_id": "s-1"}))))
            .await;

        assert_eq!(envelope.error_code(), Some(ErrorCode::BackendFailure));
        let data = envelope.error.unwrap().data.unwrap();
        assert_eq!(data["status_code"], 503);
        // Failures are surfaced, not retried.
        assert_eq!(backend.call_count(), 1);
    }

    #[tokio::test]
    async fn test_not_implemented_is_structured_error() {
        let backend = RecordingBackend::ok();
        let (dispatcher, _) = dispatcher(backend.clone());
        let envelope = dispatcher
            .dispatch(ToolRequest::new("delete_story", args(json!({"story_id": "s-1"}))))
            .await;

        assert!(!envelope.success);
        assert_eq!(envelope.error_code(), Some(ErrorCode::NotImplemented));
        assert_eq!(backend.call_count(), 0);
    }

    #[tokio::test]
    async fn test_type_mismatch_reports_expected_and_actual() {
        let (dispatcher, _) = dispatcher(RecordingBackend::ok());
        let envelope = dispatcher
            .dispatch(ToolRequest::new("echo", args(json!({"text": 42}))))
            .await;

        let error = envelope.error.unwrap();
        assert_eq!(error.code, ErrorCode::InvalidArguments.code());
        let violation = &error.data.unwrap()["violations"][0];
        assert_eq!(violation["field"], "text");
        assert_eq!(violation["expected"], "string");
        assert_eq!(violation["actual"], "integer");
    }

    #[tokio::test]
    async fn test_concurrent_dispatches() {
        let (dispatcher, counter) = dispatcher(RecordingBackend::ok());
        let mut handles = Vec::new();
        for i in 0..16 {
            let dispatcher = dispatcher.clone();
            handles.push(tokio::spawn(async move {
                dispatcher
                    .dispatch(ToolRequest::new("echo", args(json!({"text": i.to_string()}))))
                    .await
            }));
        }
        for handle in handles {
            assert!(handle.await.unwrap().success);
        }
        assert_eq!(counter.load(Ordering::SeqCst), 16);
    }
}
