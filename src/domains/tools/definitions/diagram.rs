//! Diagram tools.
//!
//! Diagrams are addressed by ID for CRUD and by name for rendering
//! (PNG, PlantUML URL, definition).

use crate::domains::tools::handlers::{BackendRoute, Payload, ToolHandler};
use crate::domains::tools::registry::{RegistryError, ToolDescriptor, ToolRegistry};
use crate::domains::tools::schema::{ParamType, Schema};

fn diagram_name() -> Schema {
    Schema::new().required("diagram_name", ParamType::String, "Diagram name")
}

/// Register the diagram tools.
pub fn register(registry: &mut ToolRegistry) -> Result<(), RegistryError> {
    registry.register(
        ToolDescriptor::new("list_diagrams", "Retrieve the list of diagrams", Schema::new()),
        ToolHandler::Backend(BackendRoute::get("/diagram/list")),
    )?;

    registry.register(
        ToolDescriptor::new(
            "create_diagram",
            "Create a new diagram with name and definition",
            Schema::new()
                .required("name", ParamType::String, "Diagram name")
                .required("definition", ParamType::String, "Diagram definition"),
        ),
        ToolHandler::Backend(BackendRoute::post("/diagram/add", Payload::Json)),
    )?;

    registry.register(
        ToolDescriptor::new(
            "get_diagram",
            "Retrieve a diagram by its ID",
            Schema::new().required("id", ParamType::String, "Diagram ID"),
        ),
        ToolHandler::Backend(BackendRoute::get("/diagram/{id}")),
    )?;

    registry.register(
        ToolDescriptor::new(
            "update_diagram",
            "Update a diagram",
            Schema::new()
                .required("id", ParamType::String, "Diagram ID")
                .required("name", ParamType::String, "New diagram name"),
        ),
        ToolHandler::Backend(BackendRoute::put("/diagram/{id}", Payload::Json)),
    )?;

    registry.register(
        ToolDescriptor::new(
            "get_png_diagram",
            "Retrieve a diagram in PNG format",
            diagram_name(),
        ),
        ToolHandler::Backend(BackendRoute::get("/diagram/png/{diagram_name}")),
    )?;

    registry.register(
        ToolDescriptor::new(
            "get_plant_url_diagram",
            "Retrieve the PlantUML URL of a diagram",
            diagram_name(),
        ),
        ToolHandler::Backend(BackendRoute::get("/diagram/plant-url/{diagram_name}")),
    )?;

    registry.register(
        ToolDescriptor::new(
            "get_diagram_definition",
            "Retrieve the definition of a diagram",
            Schema::new().required("name", ParamType::String, "Diagram name"),
        ),
        ToolHandler::Backend(BackendRoute::get("/diagram/definition/{name}")),
    )?;

    registry.register(
        ToolDescriptor::new(
            "update_diagram_definition",
            "Update the definition of a diagram",
            Schema::new()
                .required("name", ParamType::String, "Diagram name")
                .required("definition", ParamType::String, "New diagram definition"),
        ),
        ToolHandler::Backend(BackendRoute::patch("/diagram/definition/{name}", Payload::Json)),
    )?;

    registry.register(
        ToolDescriptor::new(
            "update_diagram_graphic",
            "Update a diagram and return the image",
            diagram_name().required("definition", ParamType::String, "Diagram definition"),
        ),
        ToolHandler::Backend(BackendRoute::patch(
            "/diagram/update-graphic/{diagram_name}",
            Payload::Json,
        )),
    )?;

    registry.register(
        ToolDescriptor::new(
            "export_diagram",
            "Export a diagram in various formats",
            Schema::new()
                .required("diagram_id", ParamType::String, "Diagram ID")
                .optional(
                    "format",
                    ParamType::String,
                    "Export format (png, svg, pdf), defaults to png",
                ),
        ),
        ToolHandler::NotImplemented,
    )?;

    registry.register(
        ToolDescriptor::new(
            "clone_diagram",
            "Clone a diagram",
            Schema::new()
                .required("diagram_id", ParamType::String, "Source diagram ID")
                .required("name", ParamType::String, "Name of the new diagram"),
        ),
        ToolHandler::NotImplemented,
    )?;

    Ok(())
}

