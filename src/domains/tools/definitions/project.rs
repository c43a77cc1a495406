//! Project tools.

use crate::domains::tools::handlers::{BackendRoute, Payload, ToolHandler};
use crate::domains::tools::registry::{RegistryError, ToolDescriptor, ToolRegistry};
use crate::domains::tools::schema::{ParamType, Schema};

fn project_id() -> Schema {
    Schema::new().required("project_id", ParamType::String, "Project ID")
}

/// Register the project tools.
pub fn register(registry: &mut ToolRegistry) -> Result<(), RegistryError> {
    registry.register(
        ToolDescriptor::new(
            "list_projects",
            "Retrieve the list of projects from the backlog API",
            Schema::new(),
        ),
        ToolHandler::Backend(BackendRoute::get("/project-command/list")),
    )?;

    registry.register(
        ToolDescriptor::new(
            "create_project",
            "Create a new project with name, code, client name and description",
            Schema::new()
                .required("name", ParamType::String, "Project name")
                .required("code", ParamType::String, "Project code")
                .optional("client_name", ParamType::String, "Client name (optional)")
                .optional("description", ParamType::String, "Project description (optional)"),
        ),
        ToolHandler::Backend(BackendRoute::post("/project-command/add", Payload::Json)),
    )?;

    registry.register(
        ToolDescriptor::new(
            "get_projects_tree",
            "Retrieve the component tree of a project",
            Schema::new().required("project", ParamType::String, "Project ID"),
        ),
        ToolHandler::Backend(BackendRoute::get("/project-command/{project}/tree")),
    )?;

    registry.register(
        ToolDescriptor::new(
            "get_feature_types",
            "Retrieve the list of feature types",
            Schema::new(),
        ),
        ToolHandler::Backend(BackendRoute::get("/feature-type/list")),
    )?;

    registry.register(
        ToolDescriptor::new("refresh_feature_types", "Refresh feature types", Schema::new()),
        ToolHandler::Backend(BackendRoute::post("/feature-type/refresh", Payload::None)),
    )?;

    registry.register(
        ToolDescriptor::new("normalize_tasks", "Normalize tasks", Schema::new()),
        ToolHandler::Backend(BackendRoute::post(
            "/project-command/normalize-tasks",
            Payload::None,
        )),
    )?;

    registry.register(
        ToolDescriptor::new("get_project", "Get a project by ID", project_id()),
        ToolHandler::NotImplemented,
    )?;

    registry.register(
        ToolDescriptor::new(
            "update_project",
            "Update a project",
            project_id().required("project_data", ParamType::Object, "Project data to update"),
        ),
        ToolHandler::NotImplemented,
    )?;

    registry.register(
        ToolDescriptor::new("delete_project", "Delete a project", project_id()),
        ToolHandler::NotImplemented,
    )?;

    registry.register(
        ToolDescriptor::new(
            "get_all_project_actors",
            "Get all actors of a project",
            project_id(),
        ),
        ToolHandler::NotImplemented,
    )?;

    registry.register(
        ToolDescriptor::new(
            "get_project_stories",
            "Get all stories of a project",
            project_id(),
        ),
        ToolHandler::NotImplemented,
    )?;

    registry.register(
        ToolDescriptor::new(
            "get_project_features",
            "Get all features of a project",
            project_id(),
        ),
        ToolHandler::NotImplemented,
    )?;

    Ok(())
}
