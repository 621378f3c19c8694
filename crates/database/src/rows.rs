//! Storage rows and their mapping to application records.
//!
//! Each entity has one row type with snake_case columns, a `TryFrom<Row>`
//! for reads and a `From<&Record>` for writes. Nothing else in the crate
//! knows about column names or encodings.

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::error::DatabaseError;
use crate::models::{Chat, Document, Message, Suggestion, Vote};
use crate::Result;

/// Current time truncated to the millisecond precision of the store.
pub fn now() -> DateTime<Utc> {
    let now = Utc::now();
    DateTime::from_timestamp_millis(now.timestamp_millis()).unwrap_or(now)
}

pub(crate) fn to_millis(at: DateTime<Utc>) -> i64 {
    at.timestamp_millis()
}

pub(crate) fn from_millis(column: &'static str, millis: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis).ok_or_else(|| DatabaseError::InvalidColumn {
        column,
        value: millis.to_string(),
    })
}

fn parse_column<T: std::str::FromStr>(column: &'static str, value: String) -> Result<T> {
    value
        .parse()
        .map_err(|_| DatabaseError::InvalidColumn { column, value })
}

#[derive(Debug, Clone, FromRow)]
pub(crate) struct ChatRow {
    pub id: String,
    pub created_at: i64,
    pub title: String,
    pub user_id: Option<String>,
    pub visibility: String,
}

impl TryFrom<ChatRow> for Chat {
    type Error = DatabaseError;

    fn try_from(row: ChatRow) -> Result<Self> {
        Ok(Chat {
            id: row.id,
            created_at: from_millis("chats.created_at", row.created_at)?,
            title: row.title,
            user_id: row.user_id,
            visibility: parse_column("chats.visibility", row.visibility)?,
        })
    }
}

impl From<&Chat> for ChatRow {
    fn from(chat: &Chat) -> Self {
        ChatRow {
            id: chat.id.clone(),
            created_at: to_millis(chat.created_at),
            title: chat.title.clone(),
            user_id: chat.user_id.clone(),
            visibility: chat.visibility.as_str().to_string(),
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub(crate) struct MessageRow {
    pub id: String,
    pub chat_id: String,
    pub user_id: Option<String>,
    pub role: String,
    pub parts: String,
    pub attachments: String,
    pub created_at: i64,
}

impl TryFrom<MessageRow> for Message {
    type Error = DatabaseError;

    fn try_from(row: MessageRow) -> Result<Self> {
        Ok(Message {
            id: row.id,
            chat_id: row.chat_id,
            user_id: row.user_id,
            role: parse_column("messages.role", row.role)?,
            parts: serde_json::from_str(&row.parts)?,
            attachments: serde_json::from_str(&row.attachments)?,
            created_at: from_millis("messages.created_at", row.created_at)?,
        })
    }
}

impl TryFrom<&Message> for MessageRow {
    type Error = DatabaseError;

    fn try_from(message: &Message) -> Result<Self> {
        Ok(MessageRow {
            id: message.id.clone(),
            chat_id: message.chat_id.clone(),
            user_id: message.user_id.clone(),
            role: message.role.as_str().to_string(),
            parts: serde_json::to_string(&message.parts)?,
            attachments: serde_json::to_string(&message.attachments)?,
            created_at: to_millis(message.created_at),
        })
    }
}

#[derive(Debug, Clone, FromRow)]
pub(crate) struct VoteRow {
    pub chat_id: String,
    pub message_id: String,
    pub is_upvoted: bool,
}

impl From<VoteRow> for Vote {
    fn from(row: VoteRow) -> Self {
        Vote {
            chat_id: row.chat_id,
            message_id: row.message_id,
            is_upvoted: row.is_upvoted,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub(crate) struct DocumentRow {
    pub id: String,
    pub created_at: i64,
    pub title: String,
    pub content: Option<String>,
    pub kind: String,
    pub user_id: Option<String>,
}

impl TryFrom<DocumentRow> for Document {
    type Error = DatabaseError;

    fn try_from(row: DocumentRow) -> Result<Self> {
        Ok(Document {
            id: row.id,
            created_at: from_millis("documents.created_at", row.created_at)?,
            title: row.title,
            content: row.content,
            kind: parse_column("documents.kind", row.kind)?,
            user_id: row.user_id,
        })
    }
}

impl From<&Document> for DocumentRow {
    fn from(document: &Document) -> Self {
        DocumentRow {
            id: document.id.clone(),
            created_at: to_millis(document.created_at),
            title: document.title.clone(),
            content: document.content.clone(),
            kind: document.kind.as_str().to_string(),
            user_id: document.user_id.clone(),
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub(crate) struct SuggestionRow {
    pub id: String,
    pub document_id: String,
    pub document_created_at: i64,
    pub original_text: String,
    pub suggested_text: String,
    pub description: Option<String>,
    pub is_resolved: bool,
    pub user_id: Option<String>,
    pub created_at: i64,
}

impl TryFrom<SuggestionRow> for Suggestion {
    type Error = DatabaseError;

    fn try_from(row: SuggestionRow) -> Result<Self> {
        Ok(Suggestion {
            id: row.id,
            document_id: row.document_id,
            document_created_at: from_millis(
                "suggestions.document_created_at",
                row.document_created_at,
            )?,
            original_text: row.original_text,
            suggested_text: row.suggested_text,
            description: row.description,
            is_resolved: row.is_resolved,
            user_id: row.user_id,
            created_at: from_millis("suggestions.created_at", row.created_at)?,
        })
    }
}

impl From<&Suggestion> for SuggestionRow {
    fn from(suggestion: &Suggestion) -> Self {
        SuggestionRow {
            id: suggestion.id.clone(),
            document_id: suggestion.document_id.clone(),
            document_created_at: to_millis(suggestion.document_created_at),
            original_text: suggestion.original_text.clone(),
            suggested_text: suggestion.suggested_text.clone(),
            description: suggestion.description.clone(),
            is_resolved: suggestion.is_resolved,
            user_id: suggestion.user_id.clone(),
            created_at: to_millis(suggestion.created_at),
        }
    }
}

/// Convert a batch of rows, failing on the first bad one.
pub(crate) fn collect<R, T>(rows: Vec<R>) -> Result<Vec<T>>
where
    T: TryFrom<R, Error = DatabaseError>,
{
    rows.into_iter().map(T::try_from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Visibility;
    use chat_core::{MessagePart, Role};

    #[test]
    fn test_chat_round_trip() {
        let chat = Chat {
            id: "c1".to_string(),
            created_at: now(),
            title: "Hello".to_string(),
            user_id: Some("u1".to_string()),
            visibility: Visibility::Public,
        };

        let row = ChatRow::from(&chat);
        assert_eq!(row.visibility, "public");
        assert_eq!(Chat::try_from(row).unwrap(), chat);
    }

    #[test]
    fn test_message_row_encodes_parts_as_json() {
        let message = Message {
            id: "m1".to_string(),
            chat_id: "c1".to_string(),
            user_id: None,
            role: Role::User,
            parts: vec![MessagePart::text("hi")],
            attachments: Vec::new(),
            created_at: now(),
        };

        let row = MessageRow::try_from(&message).unwrap();
        assert_eq!(row.parts, r#"[{"type":"text","text":"hi"}]"#);
        assert_eq!(row.role, "user");
        assert_eq!(Message::try_from(row).unwrap(), message);
    }

    #[test]
    fn test_unknown_kind_is_rejected() {
        let row = DocumentRow {
            id: "d1".to_string(),
            created_at: 0,
            title: "t".to_string(),
            content: None,
            kind: "image".to_string(),
            user_id: None,
        };

        let err = Document::try_from(row).unwrap_err();
        assert!(matches!(
            err,
            DatabaseError::InvalidColumn {
                column: "documents.kind",
                ..
            }
        ));
    }
}
