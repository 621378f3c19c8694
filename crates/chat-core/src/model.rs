//! Language model trait and provider-neutral request/response types.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use futures::stream::BoxStream;
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ModelError;

/// Logical model slots. Providers map each slot to a concrete model name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ModelId {
    /// Default conversational model.
    ChatModel,
    /// Reasoning model; runs without tools.
    ChatModelReasoning,
    /// Short-output model used for chat titles.
    TitleModel,
    /// Model used to write and revise documents.
    ArtifactModel,
}

impl ModelId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelId::ChatModel => "chat-model",
            ModelId::ChatModelReasoning => "chat-model-reasoning",
            ModelId::TitleModel => "title-model",
            ModelId::ArtifactModel => "artifact-model",
        }
    }

    /// Whether the client may select this model for a chat turn.
    pub fn is_selectable(&self) -> bool {
        matches!(self, ModelId::ChatModel | ModelId::ChatModelReasoning)
    }

    /// Whether tools are offered to this model.
    pub fn supports_tools(&self) -> bool {
        !matches!(self, ModelId::ChatModelReasoning)
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "chat-model" => Ok(ModelId::ChatModel),
            "chat-model-reasoning" => Ok(ModelId::ChatModelReasoning),
            "title-model" => Ok(ModelId::TitleModel),
            "artifact-model" => Ok(ModelId::ArtifactModel),
            other => Err(format!("unknown model: {}", other)),
        }
    }
}

/// A tool the model may call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    /// JSON Schema of the tool input.
    pub parameters: Value,
}

/// A tool call requested by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub arguments: Value,
}

/// Content of a user turn.
#[derive(Debug, Clone, PartialEq)]
pub enum UserContent {
    Text(String),
    Image { url: String, media_type: String },
}

/// A provider-neutral conversation message.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelMessage {
    System(String),
    User(Vec<UserContent>),
    Assistant {
        text: String,
        tool_calls: Vec<ToolCall>,
    },
    Tool {
        tool_call_id: String,
        tool_name: String,
        output: Value,
    },
}

impl ModelMessage {
    pub fn user_text(text: impl Into<String>) -> Self {
        ModelMessage::User(vec![UserContent::Text(text.into())])
    }

    pub fn assistant_text(text: impl Into<String>) -> Self {
        ModelMessage::Assistant {
            text: text.into(),
            tool_calls: Vec::new(),
        }
    }
}

/// A streaming completion request.
#[derive(Debug, Clone)]
pub struct ModelRequest {
    pub model: ModelId,
    pub system: Option<String>,
    pub messages: Vec<ModelMessage>,
    pub tools: Vec<ToolDefinition>,
    pub temperature: Option<f32>,
}

impl ModelRequest {
    pub fn new(model: ModelId) -> Self {
        Self {
            model,
            system: None,
            messages: Vec::new(),
            tools: Vec::new(),
            temperature: None,
        }
    }

    pub fn system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn messages(mut self, messages: Vec<ModelMessage>) -> Self {
        self.messages = messages;
        self
    }

    /// Append a single user prompt.
    pub fn prompt(mut self, prompt: impl Into<String>) -> Self {
        self.messages.push(ModelMessage::user_text(prompt));
        self
    }

    pub fn tools(mut self, tools: Vec<ToolDefinition>) -> Self {
        self.tools = tools;
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

/// Why the model stopped generating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishReason {
    Stop,
    Length,
    ToolCalls,
    ContentFilter,
    Other,
}

impl FinishReason {
    pub fn from_provider(reason: &str) -> Self {
        match reason {
            "stop" => FinishReason::Stop,
            "length" => FinishReason::Length,
            "tool_calls" | "function_call" => FinishReason::ToolCalls,
            "content_filter" => FinishReason::ContentFilter,
            _ => FinishReason::Other,
        }
    }
}

/// One event of a model response stream.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelEvent {
    TextDelta(String),
    ReasoningDelta(String),
    /// A fully assembled tool call.
    ToolCall(ToolCall),
    Finish(FinishReason),
}

/// Stream of model events.
pub type ModelStream = BoxStream<'static, Result<ModelEvent, ModelError>>;

/// Trait implemented by every language model provider.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Start a streaming completion.
    async fn stream(&self, request: ModelRequest) -> Result<ModelStream, ModelError>;

    /// Run a request to completion and return the generated text.
    async fn generate_text(&self, request: ModelRequest) -> Result<String, ModelError> {
        let mut stream = self.stream(request).await?;
        let mut text = String::new();
        while let Some(event) = stream.next().await {
            if let ModelEvent::TextDelta(delta) = event? {
                text.push_str(&delta);
            }
        }
        Ok(text)
    }

    /// Human-readable provider name, for logs.
    fn name(&self) -> &str;
}
