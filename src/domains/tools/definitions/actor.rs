//! Actor tools.

use crate::domains::tools::handlers::{BackendRoute, Payload, ToolHandler};
use crate::domains::tools::registry::{RegistryError, ToolDescriptor, ToolRegistry};
use crate::domains::tools::schema::{ParamType, Schema};

fn project_actor() -> Schema {
    Schema::new()
        .required("project_id", ParamType::String, "Project ID")
        .required("actor_id", ParamType::String, "Actor ID")
}

/// Register the actor tools.
pub fn register(registry: &mut ToolRegistry) -> Result<(), RegistryError> {
    registry.register(
        ToolDescriptor::new(
            "add_actor",
            "Add an actor to a project",
            Schema::new()
                .required("project_id", ParamType::String, "Project ID")
                .required("actor_data", ParamType::Object, "Actor data"),
        ),
        ToolHandler::Backend(BackendRoute::post(
            "/actor-command/{project_id}/add",
            Payload::Field("actor_data"),
        )),
    )?;

    registry.register(
        ToolDescriptor::new(
            "add_story_to_actor",
            "Add a story to an actor",
            Schema::new()
                .required("project_id", ParamType::String, "Project ID")
                .required("actor_name", ParamType::String, "Actor name")
                .required("story_data", ParamType::Object, "Story data"),
        ),
        ToolHandler::Backend(BackendRoute::post(
            "/actor-command/{project_id}/{actor_name}/add-story",
            Payload::Field("story_data"),
        )),
    )?;

    registry.register(
        ToolDescriptor::new(
            "get_project_actors",
            "Get actors of a project",
            Schema::new().required("project_id", ParamType::String, "Project ID"),
        ),
        ToolHandler::NotImplemented,
    )?;

    registry.register(
        ToolDescriptor::new("get_actor", "Get an actor by ID", project_actor()),
        ToolHandler::NotImplemented,
    )?;

    registry.register(
        ToolDescriptor::new(
            "update_actor",
            "Update an actor",
            project_actor().required("actor_data", ParamType::Object, "Actor data to update"),
        ),
        ToolHandler::NotImplemented,
    )?;

    registry.register(
        ToolDescriptor::new("delete_actor", "Delete an actor", project_actor()),
        ToolHandler::NotImplemented,
    )?;

    registry.register(
        ToolDescriptor::new("get_actor_stories", "Get stories of an actor", project_actor()),
        ToolHandler::NotImplemented,
    )?;

    Ok(())
}
