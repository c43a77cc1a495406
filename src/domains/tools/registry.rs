//! Tool Registry - the single source of truth for which tools exist.
//!
//! The registry is filled once at startup through explicit [`ToolRegistry::register`]
//! calls and is read-only afterwards. It is shared behind an `Arc` and
//! needs no locking.

use std::collections::HashMap;
use thiserror::Error;
use tracing::debug;

use super::handlers::ToolHandler;
use super::schema::Schema;

/// Static metadata describing one tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    pub input_schema: Schema,
}

impl ToolDescriptor {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        input_schema: Schema,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema,
        }
    }

    /// Discovery representation: `{name, description, inputSchema}`.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "name": self.name,
            "description": self.description,
            "inputSchema": self.input_schema.to_json_schema(),
        })
    }
}

/// A registered (descriptor, handler) pair.
#[derive(Debug, Clone)]
pub struct RegisteredTool {
    pub descriptor: ToolDescriptor,
    pub handler: ToolHandler,
}

/// Errors raised while building the registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// A tool with this name is already registered.
    #[error("Tool '{0}' is already registered")]
    DuplicateTool(String),
}

/// Registry of all tools, in registration order.
#[derive(Debug, Default)]
pub struct ToolRegistry {
    tools: Vec<RegisteredTool>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool.
    ///
    /// Fails if the name is taken; the existing entry is left untouched.
    pub fn register(
        &mut self,
        descriptor: ToolDescriptor,
        handler: ToolHandler,
    ) -> Result<(), RegistryError> {
        if self.index.contains_key(&descriptor.name) {
            return Err(RegistryError::DuplicateTool(descriptor.name));
        }
        debug!("Registered tool: {}", descriptor.name);
        self.index.insert(descriptor.name.clone(), self.tools.len());
        self.tools.push(RegisteredTool {
            descriptor,
            handler,
        });
        Ok(())
    }

    /// Look up a tool by name.
    pub fn lookup(&self, name: &str) -> Option<&RegisteredTool> {
        self.index.get(name).map(|&i| &self.tools[i])
    }

    /// All descriptors, in registration order.
    pub fn list(&self) -> impl Iterator<Item = &ToolDescriptor> {
        self.tools.iter().map(|t| &t.descriptor)
    }

    /// All tool names, in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.descriptor.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::tools::schema::ParamType;
    use serde_json::json;
    use std::sync::Arc;

    fn echo_descriptor(description: &str) -> ToolDescriptor {
        ToolDescriptor::new(
            "echo",
            description,
            Schema::new().required("text", ParamType::String, "Text to echo"),
        )
    }

    #[test]
    fn test_lookup_returns_registered_pair() {
        let mut registry = ToolRegistry::new();
        let handler = ToolHandler::function(|args| async move { Ok(json!(args)) });
        let ToolHandler::Function(original_fn) = &handler else {
            unreachable!()
        };
        let original_fn = original_fn.clone();

        registry.register(echo_descriptor("Echo"), handler).unwrap();

        let tool = registry.lookup("echo").unwrap();
        assert_eq!(tool.descriptor, echo_descriptor("Echo"));
        match &tool.handler {
            ToolHandler::Function(f) => assert!(Arc::ptr_eq(f, &original_fn)),
            other => panic!("unexpected handler: {:?}", other),
        }
    }

    #[test]
    fn test_lookup_unknown_is_none() {
        let registry = ToolRegistry::new();
        assert!(registry.lookup("nope").is_none());
    }

    #[test]
    fn test_duplicate_rejected_and_original_kept() {
        let mut registry = ToolRegistry::new();
        registry
            .register(echo_descriptor("first"), ToolHandler::NotImplemented)
            .unwrap();

        let err = registry
            .register(echo_descriptor("second"), ToolHandler::NotImplemented)
            .unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateTool(ref name) if name == "echo"));

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.lookup("echo").unwrap().descriptor.description, "first");
    }

    #[test]
    fn test_list_preserves_registration_order() {
        let mut registry = ToolRegistry::new();
        for name in ["zeta", "alpha", "mid"] {
            registry
                .register(
                    ToolDescriptor::new(name, "", Schema::new()),
                    ToolHandler::NotImplemented,
                )
                .unwrap();
        }
        let listed: Vec<_> = registry.list().map(|d| d.name.as_str()).collect();
        assert_eq!(listed, vec!["zeta", "alpha", "mid"]);
        assert_eq!(registry.names(), listed);
    }

    #[test]
    fn test_descriptor_json() {
        let json = echo_descriptor("Echo").to_json();
        assert_eq!(json["name"], "echo");
        assert_eq!(json["inputSchema"]["required"], json!(["text"]));
    }
}
