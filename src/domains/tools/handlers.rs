//! Tool handlers.
//!
//! A handler turns validated arguments into a result. Most catalog tools are
//! declarative [`BackendRoute`]s that map arguments onto a single backend
//! HTTP call; in-process tools use [`ToolHandler::function`]; operations the
//! backend does not offer yet are registered as [`ToolHandler::NotImplemented`].

use futures::FutureExt;
use futures::future::BoxFuture;
use serde_json::Value;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use super::error::ToolError;
use super::schema::Schema;
use super::validator::Arguments;
use crate::domains::backend::{BackendCall, BackendInvoker, HttpMethod};

/// Boxed async handler function.
pub type HandlerFn =
    Arc<dyn Fn(Arguments) -> BoxFuture<'static, Result<Value, ToolError>> + Send + Sync>;

/// How the arguments not consumed by the path become part of the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Payload {
    /// Nothing beyond the path is sent.
    None,
    /// Remaining arguments as a JSON object body.
    Json,
    /// The value of one named argument is the JSON body.
    Field(&'static str),
}

/// Declarative mapping of a tool onto a backend endpoint.
///
/// The path template uses `{param}` placeholders, each filling one whole
/// segment, e.g. `/actor-command/{project_id}/add`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendRoute {
    pub method: HttpMethod,
    pub path: &'static str,
    pub payload: Payload,
}

impl BackendRoute {
    pub const fn new(method: HttpMethod, path: &'static str, payload: Payload) -> Self {
        Self {
            method,
            path,
            payload,
        }
    }

    pub const fn get(path: &'static str) -> Self {
        Self::new(HttpMethod::Get, path, Payload::None)
    }

    pub const fn post(path: &'static str, payload: Payload) -> Self {
        Self::new(HttpMethod::Post, path, payload)
    }

    pub const fn put(path: &'static str, payload: Payload) -> Self {
        Self::new(HttpMethod::Put, path, payload)
    }

    pub const fn patch(path: &'static str, payload: Payload) -> Self {
        Self::new(HttpMethod::Patch, path, payload)
    }

    /// Names of the `{param}` placeholders in the path template.
    pub fn placeholders(&self) -> Vec<&'static str> {
        self.path
            .split('/')
            .filter_map(|segment| segment.strip_prefix('{')?.strip_suffix('}'))
            .collect()
    }

    /// Resolve the template against validated arguments.
    ///
    /// A JSON body carries only the parameters `schema` declares.
    pub fn render(
        &self,
        operation: &str,
        schema: &Schema,
        mut arguments: Arguments,
    ) -> Result<BackendCall, ToolError> {
        let mut segments = Vec::new();
        for segment in self.path.split('/').filter(|s| !s.is_empty()) {
            match segment.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
                Some(param) => {
                    let value = arguments.remove(param).ok_or_else(|| {
                        ToolError::internal(format!(
                            "route for '{}' references undeclared argument '{}'",
                            operation, param
                        ))
                    })?;
                    segments.push(scalar_to_string(&value).ok_or_else(|| {
                        ToolError::internal(format!(
                            "argument '{}' of '{}' cannot be used in a path",
                            param, operation
                        ))
                    })?);
                }
                None => segments.push(segment.to_string()),
            }
        }

        let mut call = BackendCall::new(operation, self.method, segments);
        match self.payload {
            Payload::None => {}
            Payload::Json => {
                arguments.retain(|name, _| schema.get(name).is_some());
                call.body = Some(Value::Object(arguments));
            }
            Payload::Field(name) => {
                call.body = Some(arguments.remove(name).unwrap_or(Value::Null));
            }
        }
        Ok(call)
    }
}

/// Render a scalar JSON value for use in a path segment.
fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// The behavior bound to a registered tool.
#[derive(Clone)]
pub enum ToolHandler {
    /// Forward to a backend endpoint.
    Backend(BackendRoute),
    /// Run an in-process async function.
    Function(HandlerFn),
    /// Advertised, but the backend operation does not exist yet.
    NotImplemented,
}

impl ToolHandler {
    /// Wrap an async closure as a handler.
    pub fn function<F, Fut>(f: F) -> Self
    where
        F: Fn(Arguments) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, ToolError>> + Send + 'static,
    {
        Self::Function(Arc::new(move |args| f(args).boxed()))
    }

    /// Run the handler.
    pub fn invoke(
        &self,
        tool_name: &str,
        schema: &Schema,
        backend: Arc<dyn BackendInvoker>,
        arguments: Arguments,
    ) -> BoxFuture<'static, Result<Value, ToolError>> {
        match self {
            Self::Backend(route) => match route.render(tool_name, schema, arguments) {
                Ok(call) => {
                    async move { backend.invoke(call).await.map_err(ToolError::from) }.boxed()
                }
                Err(e) => futures::future::ready(Err(e)).boxed(),
            },
            Self::Function(f) => f(arguments),
            Self::NotImplemented => {
                let err = ToolError::NotImplemented(tool_name.to_string());
                futures::future::ready(Err(err)).boxed()
            }
        }
    }
}

impl fmt::Debug for ToolHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Backend(route) => f.debug_tuple("Backend").field(route).finish(),
            Self::Function(_) => f.write_str("Function(..)"),
            Self::NotImplemented => f.write_str("NotImplemented"),
        }
    }
}
