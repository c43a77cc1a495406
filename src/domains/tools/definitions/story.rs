//! Story tools.

use crate::domains::tools::handlers::{BackendRoute, Payload, ToolHandler};
use crate::domains::tools::registry::{RegistryError, ToolDescriptor, ToolRegistry};
use crate::domains::tools::schema::{ParamType, Schema};

fn story_id() -> Schema {
    Schema::new().required("story_id", ParamType::String, "Story ID")
}

/// Register the story tools.
pub fn register(registry: &mut ToolRegistry) -> Result<(), RegistryError> {
    registry.register(
        ToolDescriptor::new("get_story_tree", "Get the story tree by story ID", story_id()),
        ToolHandler::Backend(BackendRoute::get("/story-command/{story_id}/tree")),
    )?;

    registry.register(
        ToolDescriptor::new(
            "update_story",
            "Update a story",
            Schema::new().required("story_data", ParamType::Object, "Story data to update"),
        ),
        ToolHandler::Backend(BackendRoute::put(
            "/story-command/update",
            Payload::Field("story_data"),
        )),
    )?;

    registry.register(
        ToolDescriptor::new("get_story", "Get a story by ID", story_id()),
        ToolHandler::Backend(BackendRoute::get("/story-command/{story_id}")),
    )?;

    registry.register(
        ToolDescriptor::new("get_story_features", "Get features of a story", story_id()),
        ToolHandler::NotImplemented,
    )?;

    registry.register(
        ToolDescriptor::new("delete_story", "Delete a story", story_id()),
        ToolHandler::NotImplemented,
    )?;

    registry.register(
        ToolDescriptor::new(
            "move_story",
            "Move a story to another actor",
            story_id().required("new_actor_id", ParamType::String, "Target actor ID"),
        ),
        ToolHandler::NotImplemented,
    )?;

    Ok(())
}
