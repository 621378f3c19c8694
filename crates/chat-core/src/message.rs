//! UI message types.
//!
//! These mirror the JSON the browser sends and receives. Field names are
//! camelCase on the wire; storage uses its own snake_case rows.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// Author of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "system" => Ok(Role::System),
            "user" => Ok(Role::User),
            "assistant" => Ok(Role::Assistant),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

/// Lifecycle state of a tool invocation part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ToolState {
    InputStreaming,
    InputAvailable,
    OutputAvailable,
    OutputError,
}

/// A tool invocation stored inside a message.
///
/// The part type is `tool-<toolName>`, so it cannot be a fixed serde tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolPart {
    #[serde(rename = "type")]
    pub part_type: String,
    pub tool_call_id: String,
    pub state: ToolState,
    #[serde(default)]
    pub input: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_text: Option<String>,
}

impl ToolPart {
    /// A completed tool call with its output.
    pub fn output_available(
        tool_call_id: impl Into<String>,
        tool_name: &str,
        input: Value,
        output: Value,
    ) -> Self {
        Self {
            part_type: format!("tool-{}", tool_name),
            tool_call_id: tool_call_id.into(),
            state: ToolState::OutputAvailable,
            input,
            output: Some(output),
            error_text: None,
        }
    }

    /// Name of the tool, without the `tool-` prefix.
    pub fn tool_name(&self) -> &str {
        self.part_type
            .strip_prefix("tool-")
            .unwrap_or(&self.part_type)
    }
}

/// One segment of a message's content.
///
/// Serialized with a `type` tag; tool parts carry a dynamic `tool-<name>` tag
/// and are routed to [`ToolPart`].
#[derive(Debug, Clone, PartialEq)]
pub enum MessagePart {
    Text {
        text: String,
    },
    Reasoning {
        text: String,
    },
    File {
        media_type: String,
        filename: Option<String>,
        url: String,
    },
    StepStart,
    Tool(ToolPart),
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
enum TaggedPartRef<'a> {
    Text {
        text: &'a str,
    },
    Reasoning {
        text: &'a str,
    },
    #[serde(rename_all = "camelCase")]
    File {
        media_type: &'a str,
        #[serde(skip_serializing_if = "Option::is_none")]
        filename: Option<&'a str>,
        url: &'a str,
    },
    StepStart,
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
enum TaggedPart {
    Text {
        text: String,
    },
    Reasoning {
        text: String,
    },
    #[serde(rename_all = "camelCase")]
    File {
        media_type: String,
        #[serde(default, alias = "name")]
        filename: Option<String>,
        url: String,
    },
    StepStart,
}

impl Serialize for MessagePart {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            MessagePart::Text { text } => TaggedPartRef::Text { text }.serialize(serializer),
            MessagePart::Reasoning { text } => {
                TaggedPartRef::Reasoning { text }.serialize(serializer)
            }
            MessagePart::File {
                media_type,
                filename,
                url,
            } => TaggedPartRef::File {
                media_type,
                filename: filename.as_deref(),
                url,
            }
            .serialize(serializer),
            MessagePart::StepStart => TaggedPartRef::StepStart.serialize(serializer),
            MessagePart::Tool(tool) => tool.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for MessagePart {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        let is_tool = value
            .get("type")
            .and_then(Value::as_str)
            .is_some_and(|kind| kind.starts_with("tool-"));

        if is_tool {
            return serde_json::from_value(value)
                .map(MessagePart::Tool)
                .map_err(de::Error::custom);
        }

        let tagged: TaggedPart = serde_json::from_value(value).map_err(de::Error::custom)?;
        Ok(match tagged {
            TaggedPart::Text { text } => MessagePart::Text { text },
            TaggedPart::Reasoning { text } => MessagePart::Reasoning { text },
            TaggedPart::File {
                media_type,
                filename,
                url,
            } => MessagePart::File {
                media_type,
                filename,
                url,
            },
            TaggedPart::StepStart => MessagePart::StepStart,
        })
    }
}

impl MessagePart {
    pub fn text(text: impl Into<String>) -> Self {
        MessagePart::Text { text: text.into() }
    }

    pub fn reasoning(text: impl Into<String>) -> Self {
        MessagePart::Reasoning { text: text.into() }
    }
}

/// Metadata attached to messages read back from storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageMetadata {
    pub created_at: DateTime<Utc>,
}

/// A chat message in UI shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiMessage {
    pub id: String,
    pub role: Role,
    pub parts: Vec<MessagePart>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<MessageMetadata>,
}

impl UiMessage {
    pub fn new(id: impl Into<String>, role: Role, parts: Vec<MessagePart>) -> Self {
        Self {
            id: id.into(),
            role,
            parts,
            metadata: None,
        }
    }

    /// Concatenated text of all text parts.
    pub fn text(&self) -> String {
        self.parts
            .iter()
            .filter_map(|part| match part {
                MessagePart::Text { text } => Some(text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Whether any part references an uploaded file.
    pub fn has_files(&self) -> bool {
        self.parts
            .iter()
            .any(|part| matches!(part, MessagePart::File { .. }))
    }
}
