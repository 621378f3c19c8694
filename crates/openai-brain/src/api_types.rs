//! Chat completions API request and response types.

use chat_core::{ModelMessage, ToolCall, ToolDefinition, UserContent};
use serde::{Deserialize, Serialize};

/// A chat message in provider format.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum ChatMessage {
    System {
        content: String,
    },
    User {
        content: UserMessageContent,
    },
    Assistant {
        #[serde(skip_serializing_if = "Option::is_none")]
        content: Option<String>,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        tool_calls: Vec<ToolCallMessage>,
    },
    Tool {
        tool_call_id: String,
        content: String,
    },
}

/// User content: plain text or a list of typed parts.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum UserMessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

/// A typed user content part.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageUrl {
    pub url: String,
}

/// A tool call issued by the assistant in an earlier turn.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolCallMessage {
    pub id: String,
    #[serde(rename = "type")]
    pub call_type: &'static str,
    pub function: FunctionCall,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionCall {
    pub name: String,
    /// JSON-encoded arguments.
    pub arguments: String,
}

/// A function tool offered to the model.
#[derive(Debug, Clone, Serialize)]
pub struct FunctionTool {
    #[serde(rename = "type")]
    pub tool_type: &'static str,
    pub function: FunctionSpec,
}

#[derive(Debug, Clone, Serialize)]
pub struct FunctionSpec {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

impl From<&ToolDefinition> for FunctionTool {
    fn from(tool: &ToolDefinition) -> Self {
        Self {
            tool_type: "function",
            function: FunctionSpec {
                name: tool.name.clone(),
                description: tool.description.clone(),
                parameters: tool.parameters.clone(),
            },
        }
    }
}

/// Streaming chat completion request.
#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<FunctionTool>,
}

/// One streamed chunk.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionChunk {
    #[serde(default)]
    pub choices: Vec<ChunkChoice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChunkChoice {
    #[serde(default)]
    pub delta: Delta,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Delta {
    pub content: Option<String>,
    #[serde(alias = "reasoning")]
    pub reasoning_content: Option<String>,
    pub tool_calls: Option<Vec<ToolCallDelta>>,
}

/// A fragment of a tool call; fragments share an `index`.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolCallDelta {
    pub index: u32,
    pub id: Option<String>,
    pub function: Option<FunctionDelta>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FunctionDelta {
    pub name: Option<String>,
    pub arguments: Option<String>,
}

/// API error response.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiError {
    pub error: ApiErrorDetail,
}

/// API error detail.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorDetail {
    pub message: String,
}

/// Build the provider message list, system prompt first.
pub fn to_chat_messages(system: Option<&str>, messages: &[ModelMessage]) -> Vec<ChatMessage> {
    let mut out = Vec::with_capacity(messages.len() + 1);
    if let Some(system) = system {
        out.push(ChatMessage::System {
            content: system.to_string(),
        });
    }

    for message in messages {
        out.push(match message {
            ModelMessage::System(content) => ChatMessage::System {
                content: content.clone(),
            },
            ModelMessage::User(content) => ChatMessage::User {
                content: user_content(content),
            },
            ModelMessage::Assistant { text, tool_calls } => ChatMessage::Assistant {
                content: (!text.is_empty()).then(|| text.clone()),
                tool_calls: tool_calls.iter().map(tool_call_message).collect(),
            },
            ModelMessage::Tool {
                tool_call_id,
                output,
                ..
            } => ChatMessage::Tool {
                tool_call_id: tool_call_id.clone(),
                content: output.to_string(),
            },
        });
    }

    out
}

fn user_content(content: &[UserContent]) -> UserMessageContent {
    if let [UserContent::Text(text)] = content {
        return UserMessageContent::Text(text.clone());
    }

    UserMessageContent::Parts(
        content
            .iter()
            .map(|part| match part {
                UserContent::Text(text) => ContentPart::Text { text: text.clone() },
                UserContent::Image { url, .. } => ContentPart::ImageUrl {
                    image_url: ImageUrl { url: url.clone() },
                },
            })
            .collect(),
    )
}

fn tool_call_message(call: &ToolCall) -> ToolCallMessage {
    ToolCallMessage {
        id: call.id.clone(),
        call_type: "function",
        function: FunctionCall {
            name: call.name.clone(),
            arguments: call.arguments.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_messages_in_provider_format() {
        let messages = vec![
            ModelMessage::user_text("weather?"),
            ModelMessage::Assistant {
                text: String::new(),
                tool_calls: vec![ToolCall {
                    id: "call-1".to_string(),
                    name: "getWeather".to_string(),
                    arguments: json!({"latitude": 1.5}),
                }],
            },
            ModelMessage::Tool {
                tool_call_id: "call-1".to_string(),
                tool_name: "getWeather".to_string(),
                output: json!({"temperature": 20}),
            },
        ];

        let value = serde_json::to_value(to_chat_messages(Some("be brief"), &messages)).unwrap();
        assert_eq!(
            value,
            json!([
                {"role": "system", "content": "be brief"},
                {"role": "user", "content": "weather?"},
                {"role": "assistant", "tool_calls": [{
                    "id": "call-1",
                    "type": "function",
                    "function": {"name": "getWeather", "arguments": "{\"latitude\":1.5}"}
                }]},
                {"role": "tool", "tool_call_id": "call-1", "content": "{\"temperature\":20}"}
            ])
        );
    }

    #[test]
    fn test_image_content_uses_parts() {
        let messages = vec![ModelMessage::User(vec![
            UserContent::Text("what is this".to_string()),
            UserContent::Image {
                url: "https://example.com/a.png".to_string(),
                media_type: "image/png".to_string(),
            },
        ])];

        let value = serde_json::to_value(to_chat_messages(None, &messages)).unwrap();
        assert_eq!(
            value[0]["content"][1],
            json!({"type": "image_url", "image_url": {"url": "https://example.com/a.png"}})
        );
    }

    #[test]
    fn test_chunk_parses_tool_call_delta() {
        let data = r#"{"choices":[{"index":0,"delta":{"tool_calls":[{"index":0,"id":"call_1","type":"function","function":{"name":"getWeather","arguments":""}}]},"finish_reason":null}]}"#;
        let chunk: ChatCompletionChunk = serde_json::from_str(data).unwrap();
        let call = &chunk.choices[0].delta.tool_calls.as_ref().unwrap()[0];
        assert_eq!(call.id.as_deref(), Some("call_1"));
        assert_eq!(
            call.function.as_ref().and_then(|f| f.name.as_deref()),
            Some("getWeather")
        );
    }
}
