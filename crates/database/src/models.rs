//! Application-facing records.
//!
//! These serialize in camelCase for the HTTP surface. Their storage shape lives
//! in [`crate::rows`].

use std::fmt;
use std::str::FromStr;

use chat_core::{ArtifactKind, MessageMetadata, MessagePart, Role, UiMessage};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Who may read a chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    #[default]
    Private,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Private => "private",
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Visibility {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "public" => Ok(Visibility::Public),
            "private" => Ok(Visibility::Private),
            other => Err(format!("unknown visibility: {}", other)),
        }
    }
}

/// A conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chat {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub title: String,
    pub user_id: Option<String>,
    pub visibility: Visibility,
}

/// A stored chat message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub chat_id: String,
    pub user_id: Option<String>,
    pub role: Role,
    pub parts: Vec<MessagePart>,
    pub attachments: Vec<Value>,
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Build a stored message from a UI message.
    pub fn from_ui(
        message: &UiMessage,
        chat_id: &str,
        user_id: Option<&str>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: message.id.clone(),
            chat_id: chat_id.to_string(),
            user_id: user_id.map(str::to_string),
            role: message.role,
            parts: message.parts.clone(),
            attachments: Vec::new(),
            created_at,
        }
    }

    /// The UI shape sent back to the client and fed to the model.
    pub fn to_ui(&self) -> UiMessage {
        UiMessage {
            id: self.id.clone(),
            role: self.role,
            parts: self.parts.clone(),
            metadata: Some(MessageMetadata {
                created_at: self.created_at,
            }),
        }
    }
}

/// A thumbs up or down on an assistant message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vote {
    pub chat_id: String,
    pub message_id: String,
    pub is_upvoted: bool,
}

/// One revision of a document artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub title: String,
    pub content: Option<String>,
    pub kind: ArtifactKind,
    pub user_id: Option<String>,
}

/// A proposed edit to a document revision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    pub id: String,
    pub document_id: String,
    pub document_created_at: DateTime<Utc>,
    pub original_text: String,
    pub suggested_text: String,
    pub description: Option<String>,
    pub is_resolved: bool,
    pub user_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A page of chats for the history endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatPage {
    pub chats: Vec<Chat>,
    pub has_more: bool,
}

impl ChatPage {
    pub fn empty() -> Self {
        Self {
            chats: Vec::new(),
            has_more: false,
        }
    }
}
