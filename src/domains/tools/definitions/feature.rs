//! Feature tools.
//!
//! Features hang off stories and can be nested under parent features.

use crate::domains::tools::handlers::{BackendRoute, Payload, ToolHandler};
use crate::domains::tools::registry::{RegistryError, ToolDescriptor, ToolRegistry};
use crate::domains::tools::schema::{ParamType, Schema};

fn feature_id() -> Schema {
    Schema::new().required("feature_id", ParamType::String, "Feature ID")
}

/// Register the feature tools.
pub fn register(registry: &mut ToolRegistry) -> Result<(), RegistryError> {
    registry.register(
        ToolDescriptor::new(
            "add_feature_to_story",
            "Add a feature to a story",
            Schema::new()
                .required("story_id", ParamType::String, "Story ID")
                .required("feature_data", ParamType::Object, "Feature data"),
        ),
        ToolHandler::Backend(BackendRoute::post(
            "/feature-command/{story_id}/add",
            Payload::Field("feature_data"),
        )),
    )?;

    registry.register(
        ToolDescriptor::new(
            "add_child_feature",
            "Add a child feature to a parent feature",
            Schema::new()
                .required("parent_id", ParamType::String, "Parent feature ID")
                .required("feature_data", ParamType::Object, "Child feature data"),
        ),
        ToolHandler::Backend(BackendRoute::post(
            "/feature-command/{parent_id}/add-child",
            Payload::Field("feature_data"),
        )),
    )?;

    registry.register(
        ToolDescriptor::new(
            "adopt_child_feature",
            "Adopt a child feature",
            Schema::new()
                .required("parent_id", ParamType::String, "Parent feature ID")
                .required("child_id", ParamType::String, "Child feature ID"),
        ),
        ToolHandler::Backend(BackendRoute::post(
            "/feature-command/{parent_id}/adopt/{child_id}",
            Payload::None,
        )),
    )?;

    registry.register(
        ToolDescriptor::new("get_feature", "Get a feature by ID", feature_id()),
        ToolHandler::NotImplemented,
    )?;

    registry.register(
        ToolDescriptor::new(
            "update_feature",
            "Update a feature",
            feature_id().required("feature_data", ParamType::Object, "Feature data to update"),
        ),
        ToolHandler::NotImplemented,
    )?;

    registry.register(
        ToolDescriptor::new("delete_feature", "Delete a feature", feature_id()),
        ToolHandler::NotImplemented,
    )?;

    registry.register(
        ToolDescriptor::new(
            "get_feature_children",
            "Get children features of a feature",
            feature_id(),
        ),
        ToolHandler::NotImplemented,
    )?;

    registry.register(
        ToolDescriptor::new(
            "move_feature",
            "Move a feature to another parent",
            feature_id().required("new_parent_id", ParamType::String, "Target parent feature ID"),
        ),
        ToolHandler::NotImplemented,
    )?;

    Ok(())
}
