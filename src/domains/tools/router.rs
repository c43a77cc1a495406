//! Tool Router - maps rmcp tool requests onto the dispatcher.
//!
//! The STDIO transport lists and calls tools through these functions. Every
//! call, including one for an unregistered name, goes through the same
//! [`Dispatcher`] the HTTP transport uses, so both transports share lookup,
//! validation and error normalization.

use rmcp::model::{CallToolResult, Content, JsonObject, Tool};
use std::sync::Arc;

use super::dispatcher::Dispatcher;
use super::envelope::{ResponseEnvelope, ToolRequest};
use super::registry::ToolDescriptor;

/// Tool models for every registered tool, in registration order.
pub fn list_tools(dispatcher: &Dispatcher) -> Vec<Tool> {
    dispatcher.registry().list().map(to_tool).collect()
}

/// Dispatch an rmcp tool call and wrap the envelope.
pub async fn call_tool(
    dispatcher: &Dispatcher,
    name: impl Into<String>,
    arguments: Option<JsonObject>,
) -> CallToolResult {
    let request = ToolRequest::new(name, arguments.unwrap_or_default());
    let envelope = dispatcher.dispatch(request).await;
    to_call_tool_result(&envelope)
}

/// Create a Tool model for a descriptor (metadata).
pub fn to_tool(descriptor: &ToolDescriptor) -> Tool {
    Tool {
        name: descriptor.name.clone().into(),
        description: Some(descriptor.description.clone().into()),
        input_schema: Arc::new(descriptor.input_schema.to_json_schema()),
        annotations: None,
        output_schema: None,
        icons: None,
        meta: None,
        title: None,
    }
}

/// Convert an envelope into an MCP tool result.
///
/// The text content is the pretty-printed result (or the error message); the
/// full envelope travels as structured content.
pub fn to_call_tool_result(envelope: &ResponseEnvelope) -> CallToolResult {
    let content = vec![Content::text(envelope.to_text())];
    let mut result = if envelope.success {
        CallToolResult::success(content)
    } else {
        CallToolResult::error(content)
    };
    result.structured_content = serde_json::to_value(envelope).ok();
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::tools::definitions::build_registry;
    use crate::domains::tools::dispatcher::tests::RecordingBackend;
    use crate::domains::tools::error::{ErrorCode, ToolError};
    use serde_json::json;

    fn test_dispatcher() -> (Dispatcher, Arc<RecordingBackend>) {
        let backend = RecordingBackend::ok();
        let registry = Arc::new(build_registry().unwrap());
        (Dispatcher::new(registry, backend.clone()), backend)
    }

    #[test]
    fn test_list_tools() {
        let (dispatcher, _) = test_dispatcher();
        let tools = list_tools(&dispatcher);
        assert_eq!(tools.len(), 44);

        let names: Vec<_> = tools.iter().map(|t| t.name.as_ref()).collect();
        assert_eq!(names, dispatcher.registry().names());
        assert!(names.contains(&"create_diagram"));
        assert!(names.contains(&"add_feature_to_story"));
        assert!(names.contains(&"add_actor"));
    }

    #[test]
    fn test_tool_model_carries_schema() {
        let (dispatcher, _) = test_dispatcher();
        let tools = list_tools(&dispatcher);
        let get_story = tools.iter().find(|t| t.name == "get_story").unwrap();
        assert_eq!(get_story.input_schema["required"], json!(["story_id"]));
    }

    #[tokio::test]
    async fn test_call_tool_dispatches_to_backend() {
        let (dispatcher, backend) = test_dispatcher();
        let arguments = json!({"story_id": "S-9"}).as_object().cloned();
        let result = call_tool(&dispatcher, "get_story", arguments).await;

        assert_eq!(result.is_error, Some(false));
        assert_eq!(result.structured_content.unwrap()["content"]["path"], "/story-command/S-9");
        assert_eq!(backend.call_count(), 1);
    }

    #[tokio::test]
    async fn test_call_tool_unknown_name_is_unknown_tool_envelope() {
        let (dispatcher, backend) = test_dispatcher();
        let result = call_tool(&dispatcher, "no_such_tool", None).await;

        assert_eq!(result.is_error, Some(true));
        let envelope = result.structured_content.unwrap();
        assert_eq!(envelope["success"], false);
        assert_eq!(envelope["error"]["code"], ErrorCode::UnknownTool.code());
        assert_ne!(envelope["error"]["code"], ErrorCode::InvalidArguments.code());
        assert_eq!(dispatcher.dispatch_count(), 1);
        assert_eq!(backend.call_count(), 0);
    }

    #[tokio::test]
    async fn test_call_tool_missing_arguments_are_invalid() {
        let (dispatcher, _) = test_dispatcher();
        let result = call_tool(&dispatcher, "get_story", None).await;
        let envelope = result.structured_content.unwrap();
        assert_eq!(envelope["error"]["code"], ErrorCode::InvalidArguments.code());
    }

    #[test]
    fn test_call_tool_result_conversion() {
        let ok = to_call_tool_result(&ResponseEnvelope::success(json!({"id": 1})));
        assert_eq!(ok.is_error, Some(false));
        assert_eq!(ok.structured_content.unwrap()["success"], true);

        let failed = to_call_tool_result(&ToolError::unknown_tool("nope").into());
        assert_eq!(failed.is_error, Some(true));
        assert_eq!(failed.structured_content.unwrap()["success"], false);
    }
}
