//! SQLite persistence layer for the chat gateway.
//!
//! This crate provides one async function per logical operation on chats,
//! messages, votes, documents, suggestions and stream IDs using SQLx with
//! SQLite. Records are exposed in their camelCase application shape; the
//! snake_case storage shape stays inside the crate.
//!
//! # Example
//!
//! ```no_run
//! use database::{chat, models::{Chat, Visibility}, Database};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Connect and run migrations
//!     let db = Database::connect("sqlite:chat.db?mode=rwc").await?;
//!     db.migrate().await?;
//!
//!     // Create a chat
//!     let chat = Chat {
//!         id: "0d1b4a6e-5c44-4f38-9d53-1c2f1e0a9b11".to_string(),
//!         created_at: database::now(),
//!         title: "Weather in Lisbon".to_string(),
//!         user_id: Some("user-1".to_string()),
//!         visibility: Visibility::Private,
//!     };
//!     chat::save_chat(db.pool(), &chat).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod chat;
pub mod document;
pub mod error;
pub mod message;
pub mod models;
mod rows;
pub mod stream;
pub mod suggestion;
pub mod vote;

pub use chat::Cursor;
pub use error::{DatabaseError, Result};
pub use models::{Chat, ChatPage, Document, Message, Suggestion, Visibility, Vote};
pub use rows::now;
pub use sqlx::SqlitePool;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::str::FromStr;

/// Database connection wrapper.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Default pool size for database connections.
    const DEFAULT_POOL_SIZE: u32 = 10;

    /// Connect to a SQLite database.
    ///
    /// The URL should be in the format `sqlite:path/to/db.sqlite?mode=rwc`.
    /// Use `?mode=rwc` to create the database file if it doesn't exist.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # async fn example() -> database::Result<()> {
    /// // File database
    /// let db = database::Database::connect("sqlite:data/chat.db?mode=rwc").await?;
    ///
    /// // In-memory database (for testing)
    /// let db = database::Database::connect("sqlite::memory:").await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn connect(url: &str) -> Result<Self> {
        Self::connect_with_pool_size(url, Self::DEFAULT_POOL_SIZE).await
    }

    /// Connect to a SQLite database with a custom pool size.
    pub async fn connect_with_pool_size(url: &str, pool_size: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(pool_size)
            .acquire_timeout(std::time::Duration::from_secs(30))
            .connect_with(options)
            .await?;

        tracing::info!(
            "Connected to database: {} (pool size: {})",
            url,
            pool_size
        );

        Ok(Self { pool })
    }

    /// Run database migrations.
    ///
    /// This should be called once after connecting to ensure the schema is up to date.
    pub async fn migrate(&self) -> Result<()> {
        tracing::info!("Running database migrations...");

        sqlx::migrate!("./migrations").run(&self.pool).await?;

        tracing::info!("Migrations complete");
        Ok(())
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close the database connection pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chat_core::{ArtifactKind, MessagePart, Role, ToolPart};
    use chrono::{DateTime, Duration, Utc};
    use serde_json::json;

    async fn test_db() -> Database {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db.migrate().await.unwrap();
        db
    }

    fn at(seconds: i64) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(1_700_000_000_000 + seconds * 1000).unwrap()
    }

    fn chat(id: &str, user_id: &str, created_at: DateTime<Utc>) -> Chat {
        Chat {
            id: id.to_string(),
            created_at,
            title: format!("Chat {}", id),
            user_id: Some(user_id.to_string()),
            visibility: Visibility::Private,
        }
    }

    fn message(id: &str, chat_id: &str, role: Role, created_at: DateTime<Utc>) -> Message {
        Message {
            id: id.to_string(),
            chat_id: chat_id.to_string(),
            user_id: Some("u1".to_string()),
            role,
            parts: vec![MessagePart::text(format!("text of {}", id))],
            attachments: Vec::new(),
            created_at,
        }
    }

    #[tokio::test]
    async fn test_chat_crud() {
        let db = test_db().await;

        // Create
        let record = chat("c1", "u1", at(0));
        chat::save_chat(db.pool(), &record).await.unwrap();

        // Read
        let fetched = chat::get_chat_by_id(db.pool(), "c1").await.unwrap();
        assert_eq!(fetched, Some(record.clone()));
        assert!(chat::get_chat_by_id(db.pool(), "missing").await.unwrap().is_none());

        // Update
        chat::update_chat_visibility_by_id(db.pool(), "c1", Visibility::Public)
            .await
            .unwrap();
        let fetched = chat::get_chat_by_id(db.pool(), "c1").await.unwrap().unwrap();
        assert_eq!(fetched.visibility, Visibility::Public);

        let missing = chat::update_chat_visibility_by_id(db.pool(), "nope", Visibility::Public).await;
        assert!(matches!(missing, Err(DatabaseError::NotFound { .. })));

        // Delete
        let deleted = chat::delete_chat_by_id(db.pool(), "c1").await.unwrap();
        assert_eq!(deleted.map(|c| c.id), Some("c1".to_string()));
        assert!(chat::get_chat_by_id(db.pool(), "c1").await.unwrap().is_none());
        assert!(chat::delete_chat_by_id(db.pool(), "c1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_chat_cascades() {
        let db = test_db().await;
        chat::save_chat(db.pool(), &chat("c1", "u1", at(0))).await.unwrap();
        message::save_messages(db.pool(), &[message("m1", "c1", Role::User, at(1))])
            .await
            .unwrap();
        vote::vote_message(db.pool(), "c1", "m1", true).await.unwrap();
        stream::create_stream_id(db.pool(), "s1", "c1").await.unwrap();

        chat::delete_chat_by_id(db.pool(), "c1").await.unwrap();

        assert!(message::get_messages_by_chat_id(db.pool(), "c1").await.unwrap().is_empty());
        assert!(vote::get_votes_by_chat_id(db.pool(), "c1").await.unwrap().is_empty());
        assert!(stream::get_stream_ids_by_chat_id(db.pool(), "c1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_history_pages_do_not_overlap() {
        let db = test_db().await;
        for i in 0..5 {
            chat::save_chat(db.pool(), &chat(&format!("c{}", i), "u1", at(i)))
                .await
                .unwrap();
        }
        chat::save_chat(db.pool(), &chat("other", "u2", at(10))).await.unwrap();

        let first = chat::get_chats_by_user_id(db.pool(), "u1", 2, Cursor::None)
            .await
            .unwrap();
        let ids: Vec<_> = first.chats.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["c4", "c3"]);
        assert!(first.has_more);

        let second = chat::get_chats_by_user_id(db.pool(), "u1", 2, Cursor::EndingBefore("c3"))
            .await
            .unwrap();
        let ids: Vec<_> = second.chats.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["c2", "c1"]);
        assert!(second.has_more);

        let last = chat::get_chats_by_user_id(db.pool(), "u1", 2, Cursor::EndingBefore("c1"))
            .await
            .unwrap();
        let ids: Vec<_> = last.chats.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["c0"]);
        assert!(!last.has_more);

        let newer = chat::get_chats_by_user_id(db.pool(), "u1", 10, Cursor::StartingAfter("c2"))
            .await
            .unwrap();
        let ids: Vec<_> = newer.chats.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["c4", "c3"]);
        assert!(!newer.has_more);

        let unknown = chat::get_chats_by_user_id(db.pool(), "u1", 2, Cursor::EndingBefore("zz")).await;
        assert!(matches!(unknown, Err(DatabaseError::NotFound { entity: "chat", .. })));
    }

    #[tokio::test]
    async fn test_full_page_reports_more() {
        let db = test_db().await;
        for i in 0..2 {
            chat::save_chat(db.pool(), &chat(&format!("c{}", i), "u1", at(i)))
                .await
                .unwrap();
        }

        let page = chat::get_chats_by_user_id(db.pool(), "u1", 2, Cursor::None)
            .await
            .unwrap();
        assert_eq!(page.chats.len(), 2);
        assert!(page.has_more);

        let next = chat::get_chats_by_user_id(db.pool(), "u1", 2, Cursor::EndingBefore("c0"))
            .await
            .unwrap();
        assert!(next.chats.is_empty());
        assert!(!next.has_more);

        let short = chat::get_chats_by_user_id(db.pool(), "u1", 3, Cursor::None)
            .await
            .unwrap();
        assert_eq!(short.chats.len(), 2);
        assert!(!short.has_more);
    }

    #[tokio::test]
    async fn test_message_round_trip() {
        let db = test_db().await;
        chat::save_chat(db.pool(), &chat("c1", "u1", at(0))).await.unwrap();

        let created_at = now();
        let assistant = Message {
            id: "m2".to_string(),
            chat_id: "c1".to_string(),
            user_id: None,
            role: Role::Assistant,
            parts: vec![
                MessagePart::StepStart,
                MessagePart::reasoning("checking"),
                MessagePart::Tool(ToolPart::output_available(
                    "call-1",
                    "getWeather",
                    json!({"latitude": 38.7, "longitude": -9.1}),
                    json!({"current": {"temperature_2m": 21.5}}),
                )),
                MessagePart::text("It is sunny."),
            ],
            attachments: vec![json!({"url": "https://example.com/a.png"})],
            created_at: created_at + Duration::seconds(1),
        };
        let user = message("m1", "c1", Role::User, created_at);

        message::save_messages(db.pool(), &[assistant.clone(), user.clone()])
            .await
            .unwrap();

        let fetched = message::get_messages_by_chat_id(db.pool(), "c1").await.unwrap();
        assert_eq!(fetched, vec![user, assistant.clone()]);

        let single = message::get_message_by_id(db.pool(), "m2").await.unwrap();
        assert_eq!(single, Some(assistant));
    }

    #[tokio::test]
    async fn test_delete_messages_after_timestamp() {
        let db = test_db().await;
        chat::save_chat(db.pool(), &chat("c1", "u1", at(0))).await.unwrap();
        message::save_messages(
            db.pool(),
            &[
                message("m1", "c1", Role::User, at(1)),
                message("m2", "c1", Role::Assistant, at(2)),
                message("m3", "c1", Role::User, at(3)),
            ],
        )
        .await
        .unwrap();
        vote::vote_message(db.pool(), "c1", "m2", false).await.unwrap();

        let deleted = message::delete_messages_by_chat_id_after_timestamp(db.pool(), "c1", at(2))
            .await
            .unwrap();
        assert_eq!(deleted, 2);

        let remaining = message::get_messages_by_chat_id(db.pool(), "c1").await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert!(vote::get_votes_by_chat_id(db.pool(), "c1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_count_user_messages_since() {
        let db = test_db().await;
        chat::save_chat(db.pool(), &chat("c1", "u1", at(0))).await.unwrap();
        message::save_messages(
            db.pool(),
            &[
                message("m1", "c1", Role::User, at(1)),
                message("m2", "c1", Role::Assistant, at(2)),
                message("m3", "c1", Role::User, at(3)),
            ],
        )
        .await
        .unwrap();

        assert_eq!(message::count_user_messages_since(db.pool(), "u1", at(0)).await.unwrap(), 2);
        assert_eq!(message::count_user_messages_since(db.pool(), "u1", at(2)).await.unwrap(), 1);
        assert_eq!(message::count_user_messages_since(db.pool(), "u2", at(0)).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_vote_upsert() {
        let db = test_db().await;
        chat::save_chat(db.pool(), &chat("c1", "u1", at(0))).await.unwrap();
        message::save_messages(db.pool(), &[message("m1", "c1", Role::Assistant, at(1))])
            .await
            .unwrap();

        vote::vote_message(db.pool(), "c1", "m1", true).await.unwrap();
        vote::vote_message(db.pool(), "c1", "m1", false).await.unwrap();

        let votes = vote::get_votes_by_chat_id(db.pool(), "c1").await.unwrap();
        assert_eq!(
            votes,
            vec![Vote {
                chat_id: "c1".to_string(),
                message_id: "m1".to_string(),
                is_upvoted: false,
            }]
        );
    }

    #[tokio::test]
    async fn test_document_revisions_and_suggestions() {
        let db = test_db().await;
        let revision = |seconds: i64, content: &str| Document {
            id: "d1".to_string(),
            created_at: at(seconds),
            title: "Essay".to_string(),
            content: Some(content.to_string()),
            kind: ArtifactKind::Text,
            user_id: None,
        };

        document::save_document(db.pool(), &revision(0, "first")).await.unwrap();
        document::save_document(db.pool(), &revision(5, "second")).await.unwrap();

        let latest = document::get_document_by_id(db.pool(), "d1").await.unwrap().unwrap();
        assert_eq!(latest.content.as_deref(), Some("second"));
        assert_eq!(document::get_documents_by_id(db.pool(), "d1").await.unwrap().len(), 2);
        assert!(document::get_document_by_id(db.pool(), "d2").await.unwrap().is_none());

        assert!(suggestion::get_suggestions_by_document_id(db.pool(), "d1")
            .await
            .unwrap()
            .is_empty());

        let suggestion = Suggestion {
            id: "s1".to_string(),
            document_id: "d1".to_string(),
            document_created_at: at(5),
            original_text: "second".to_string(),
            suggested_text: "Second.".to_string(),
            description: Some("Capitalise".to_string()),
            is_resolved: false,
            user_id: None,
            created_at: at(6),
        };
        suggestion::save_suggestions(db.pool(), &[suggestion.clone()]).await.unwrap();
        assert_eq!(
            suggestion::get_suggestions_by_document_id(db.pool(), "d1").await.unwrap(),
            vec![suggestion]
        );

        let deleted = document::delete_documents_by_id_after_timestamp(db.pool(), "d1", at(1))
            .await
            .unwrap();
        assert_eq!(deleted.len(), 1);
        assert_eq!(deleted[0].content.as_deref(), Some("second"));
        assert!(suggestion::get_suggestions_by_document_id(db.pool(), "d1")
            .await
            .unwrap()
            .is_empty());

        let latest = document::get_document_by_id(db.pool(), "d1").await.unwrap().unwrap();
        assert_eq!(latest.content.as_deref(), Some("first"));
    }

    #[tokio::test]
    async fn test_delete_suggestions_by_document_id() {
        let db = test_db().await;
        let doc = Document {
            id: "d1".to_string(),
            created_at: at(0),
            title: "Sheet".to_string(),
            content: None,
            kind: ArtifactKind::Sheet,
            user_id: Some("u1".to_string()),
        };
        document::save_document(db.pool(), &doc).await.unwrap();

        let suggestions: Vec<_> = (0..3)
            .map(|i| Suggestion {
                id: format!("s{}", i),
                document_id: "d1".to_string(),
                document_created_at: at(0),
                original_text: "a".to_string(),
                suggested_text: "b".to_string(),
                description: None,
                is_resolved: false,
                user_id: None,
                created_at: at(i + 1),
            })
            .collect();
        suggestion::save_suggestions(db.pool(), &suggestions).await.unwrap();

        let deleted = suggestion::delete_suggestions_by_document_id(db.pool(), "d1")
            .await
            .unwrap();
        assert_eq!(deleted, 3);
    }

    #[tokio::test]
    async fn test_stream_ids_in_creation_order() {
        let db = test_db().await;
        chat::save_chat(db.pool(), &chat("c1", "u1", at(0))).await.unwrap();

        stream::create_stream_id(db.pool(), "s1", "c1").await.unwrap();
        stream::create_stream_id(db.pool(), "s2", "c1").await.unwrap();

        let ids = stream::get_stream_ids_by_chat_id(db.pool(), "c1").await.unwrap();
        assert_eq!(ids, vec!["s1".to_string(), "s2".to_string()]);
    }

    #[test]
    fn test_error_codes() {
        let not_found = DatabaseError::NotFound {
            entity: "chat",
            id: "c1".to_string(),
        };
        assert_eq!(not_found.code(), "not_found:database");
        assert_eq!(
            DatabaseError::Sqlx(sqlx::Error::RowNotFound).code(),
            "bad_request:database"
        );
    }
}
