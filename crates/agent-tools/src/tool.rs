//! Tool trait definition and types.

use std::collections::HashMap;

use async_trait::async_trait;
use chat_core::{ArtifactKind, UiStreamWriter};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ToolError;

/// Per-turn state shared with every tool call.
#[derive(Debug, Clone)]
pub struct ToolContext {
    /// Writer for data parts streamed to the client.
    pub writer: UiStreamWriter,
    /// The signed-in caller, if any.
    pub user_id: Option<String>,
}

impl ToolContext {
    pub fn new(writer: UiStreamWriter, user_id: Option<String>) -> Self {
        Self { writer, user_id }
    }
}

/// Arguments passed to a tool for execution.
#[derive(Debug, Clone)]
pub struct ToolArgs {
    /// Parameters as key-value pairs.
    pub params: HashMap<String, Value>,
    /// Per-turn context.
    pub context: ToolContext,
}

impl ToolArgs {
    /// Create new tool arguments with the given parameters.
    pub fn new(params: HashMap<String, Value>, context: ToolContext) -> Self {
        Self { params, context }
    }

    /// Get a string parameter, returning an error if missing or not a string.
    pub fn get_string(&self, key: &str) -> Result<String, ToolError> {
        self.params
            .get(key)
            .ok_or_else(|| ToolError::MissingParameter(key.to_string()))?
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| ToolError::InvalidParameter {
                name: key.to_string(),
                reason: "expected string".to_string(),
            })
    }

    /// Get an f64 parameter, returning an error if missing or not a number.
    pub fn get_f64(&self, key: &str) -> Result<f64, ToolError> {
        self.params
            .get(key)
            .ok_or_else(|| ToolError::MissingParameter(key.to_string()))?
            .as_f64()
            .ok_or_else(|| ToolError::InvalidParameter {
                name: key.to_string(),
                reason: "expected number".to_string(),
            })
    }

    /// Get an artifact kind parameter.
    pub fn get_kind(&self, key: &str) -> Result<ArtifactKind, ToolError> {
        self.get_string(key)?
            .parse()
            .map_err(|reason| ToolError::InvalidParameter {
                name: key.to_string(),
                reason,
            })
    }
}

/// Output from a tool execution, handed back to the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolOutput {
    /// The JSON result.
    pub content: Value,
    /// Whether the execution was successful.
    pub success: bool,
}

impl ToolOutput {
    /// Create a successful output.
    pub fn success(content: Value) -> Self {
        Self {
            content,
            success: true,
        }
    }

    /// Create a failed output carrying `{"error": message}`.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            content: serde_json::json!({ "error": message.into() }),
            success: false,
        }
    }
}

/// Trait for tools the model can call during a chat turn.
#[async_trait]
pub trait Tool: Send + Sync {
    /// The tool's unique name (used for dispatch).
    fn name(&self) -> &str;

    /// Human-readable description of what the tool does.
    fn description(&self) -> &str;

    /// JSON schema of the tool's parameters.
    fn parameters(&self) -> Value;

    /// Execute the tool with the given arguments.
    async fn execute(&self, args: ToolArgs) -> Result<ToolOutput, ToolError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn args(params: Value) -> ToolArgs {
        let (writer, _rx) = UiStreamWriter::channel();
        let params = serde_json::from_value(params).unwrap();
        ToolArgs::new(params, ToolContext::new(writer, None))
    }

    #[test]
    fn test_get_string() {
        let args = args(json!({"title": "Essay", "count": 3}));
        assert_eq!(args.get_string("title").unwrap(), "Essay");
        assert!(matches!(
            args.get_string("missing"),
            Err(ToolError::MissingParameter(_))
        ));
        assert!(matches!(
            args.get_string("count"),
            Err(ToolError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_get_kind() {
        let args = args(json!({"kind": "sheet", "bad": "image"}));
        assert_eq!(args.get_kind("kind").unwrap(), ArtifactKind::Sheet);
        assert!(matches!(
            args.get_kind("bad"),
            Err(ToolError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_failure_output() {
        let output = ToolOutput::failure("Document not found");
        assert!(!output.success);
        assert_eq!(output.content, json!({"error": "Document not found"}));
    }
}
