//! Tool definitions module.
//!
//! This module declares the tool catalog. Each file registers the tools for
//! one backlog resource; [`build_registry`] runs them all in a fixed order so
//! discovery listings are stable across restarts.

pub mod actor;
pub mod diagram;
pub mod feature;
pub mod project;
pub mod story;

use super::registry::{RegistryError, ToolRegistry};

/// Build the registry holding the full catalog.
///
/// Fails on a duplicate tool name; callers treat that as fatal at startup.
pub fn build_registry() -> Result<ToolRegistry, RegistryError> {
    let mut registry = ToolRegistry::new();
    project::register(&mut registry)?;
    diagram::register(&mut registry)?;
    story::register(&mut registry)?;
    feature::register(&mut registry)?;
    actor::register(&mut registry)?;
    Ok(registry)
}
