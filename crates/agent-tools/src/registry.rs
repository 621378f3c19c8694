//! Tool registry for managing and executing tools.

use std::collections::HashMap;
use std::sync::Arc;

use chat_core::ToolDefinition;
use serde_json::Value;
use tracing::{debug, info};

use crate::error::ToolError;
use crate::tool::{Tool, ToolArgs, ToolContext, ToolOutput};

/// Registry for managing tools.
///
/// The registry holds a collection of tools and can dispatch execution
/// requests to the appropriate tool by name.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    /// Registered tools by name.
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool.
    ///
    /// If a tool with the same name already exists, it will be replaced.
    pub fn register<T: Tool + 'static>(&mut self, tool: T) {
        let name = tool.name().to_string();
        info!("Registering tool: {}", name);
        self.tools.insert(name, Arc::new(tool));
    }

    /// Get a sorted list of registered tool names.
    pub fn list_tools(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tools.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// Get a tool by name.
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.get(name)
    }

    /// Check if a tool is registered.
    pub fn has_tool(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Definitions offered to the model, sorted by name.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.list_tools()
            .into_iter()
            .filter_map(|name| self.tools.get(name))
            .map(|tool| ToolDefinition {
                name: tool.name().to_string(),
                description: tool.description().to_string(),
                parameters: tool.parameters(),
            })
            .collect()
    }

    /// Execute a tool by name with the model's JSON arguments.
    pub async fn execute(
        &self,
        name: &str,
        arguments: Value,
        context: ToolContext,
    ) -> Result<ToolOutput, ToolError> {
        let tool = self
            .tools
            .get(name)
            .ok_or_else(|| ToolError::NotFound(name.to_string()))?;

        let params: HashMap<String, Value> = match arguments {
            Value::Object(map) => map.into_iter().collect(),
            Value::Null => HashMap::new(),
            other => {
                return Err(ToolError::InvalidParameter {
                    name: "arguments".to_string(),
                    reason: format!("expected object, got {}", other),
                })
            }
        };

        debug!("Executing tool '{}' with {} params", name, params.len());

        let result = tool.execute(ToolArgs::new(params, context)).await?;

        debug!(
            "Tool '{}' completed: success={}",
            name,
            result.success
        );

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chat_core::UiStreamWriter;
    use serde_json::json;

    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &str {
            "echo"
        }

        fn description(&self) -> &str {
            "Echoes back the input"
        }

        fn parameters(&self) -> Value {
            json!({
                "type": "object",
                "properties": {"message": {"type": "string"}},
                "required": ["message"]
            })
        }

        async fn execute(&self, args: ToolArgs) -> Result<ToolOutput, ToolError> {
            let message = args.get_string("message")?;
            Ok(ToolOutput::success(json!({ "message": message })))
        }
    }

    fn context() -> ToolContext {
        let (writer, _rx) = UiStreamWriter::channel();
        ToolContext::new(writer, None)
    }

    #[tokio::test]
    async fn test_registry_basic() {
        let mut registry = ToolRegistry::new();
        registry.register(EchoTool);

        assert!(registry.has_tool("echo"));
        assert!(!registry.has_tool("nonexistent"));
        assert_eq!(registry.list_tools(), vec!["echo"]);

        let definitions = registry.definitions();
        assert_eq!(definitions.len(), 1);
        assert_eq!(definitions[0].parameters["required"], json!(["message"]));
    }

    #[tokio::test]
    async fn test_registry_execute() {
        let mut registry = ToolRegistry::new();
        registry.register(EchoTool);

        let result = registry
            .execute("echo", json!({"message": "hello"}), context())
            .await
            .unwrap();
        assert!(result.success);
        assert_eq!(result.content, json!({"message": "hello"}));
    }

    #[tokio::test]
    async fn test_registry_rejects_non_object_arguments() {
        let mut registry = ToolRegistry::new();
        registry.register(EchoTool);

        let result = registry.execute("echo", json!("hello"), context()).await;
        assert!(matches!(result, Err(ToolError::InvalidParameter { .. })));
    }

    #[tokio::test]
    async fn test_registry_not_found() {
        let registry = ToolRegistry::new();
        let result = registry.execute("nonexistent", json!({}), context()).await;
        assert!(matches!(result, Err(ToolError::NotFound(_))));
    }
}
