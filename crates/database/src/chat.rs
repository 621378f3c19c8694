//! Chat persistence.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::models::{Chat, ChatPage, Visibility};
use crate::rows::{collect, to_millis, ChatRow};
use crate::{DatabaseError, Result};

/// Insert a new chat.
pub async fn save_chat(pool: &SqlitePool, chat: &Chat) -> Result<()> {
    let row = ChatRow::from(chat);
    sqlx::query(
        r#"
        INSERT INTO chats (id, created_at, title, user_id, visibility)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(&row.id)
    .bind(row.created_at)
    .bind(&row.title)
    .bind(&row.user_id)
    .bind(&row.visibility)
    .execute(pool)
    .await?;

    Ok(())
}

/// Get a chat by ID.
pub async fn get_chat_by_id(pool: &SqlitePool, id: &str) -> Result<Option<Chat>> {
    let row = sqlx::query_as::<_, ChatRow>(
        r#"
        SELECT id, created_at, title, user_id, visibility
        FROM chats
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    row.map(Chat::try_from).transpose()
}

/// Delete a chat and, through cascading keys, its messages, votes and streams.
///
/// Returns the deleted chat, or `None` if it did not exist.
pub async fn delete_chat_by_id(pool: &SqlitePool, id: &str) -> Result<Option<Chat>> {
    let row = sqlx::query_as::<_, ChatRow>(
        r#"
        DELETE FROM chats
        WHERE id = ?
        RETURNING id, created_at, title, user_id, visibility
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    row.map(Chat::try_from).transpose()
}

/// Change who may read a chat.
pub async fn update_chat_visibility_by_id(
    pool: &SqlitePool,
    id: &str,
    visibility: Visibility,
) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE chats
        SET visibility = ?
        WHERE id = ?
        "#,
    )
    .bind(visibility.as_str())
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "chat",
            id: id.to_string(),
        });
    }

    Ok(())
}

/// Which side of a cursor chat to page towards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cursor<'a> {
    /// Most recent chats first.
    None,
    /// Chats created after the given chat.
    StartingAfter(&'a str),
    /// Chats created before the given chat.
    EndingBefore(&'a str),
}

/// List a user's chats, newest first.
///
/// `has_more` is false exactly when the page is shorter than `limit`, so a
/// full last page is followed by an empty one. An unknown cursor chat is a
/// `NotFound` error.
pub async fn get_chats_by_user_id(
    pool: &SqlitePool,
    user_id: &str,
    limit: i64,
    cursor: Cursor<'_>,
) -> Result<ChatPage> {
    let limit = limit.max(1);

    let rows = match cursor {
        Cursor::None => {
            sqlx::query_as::<_, ChatRow>(
                r#"
                SELECT id, created_at, title, user_id, visibility
                FROM chats
                WHERE user_id = ?
                ORDER BY created_at DESC
                LIMIT ?
                "#,
            )
            .bind(user_id)
            .bind(limit)
            .fetch_all(pool)
            .await?
        }
        Cursor::StartingAfter(id) => {
            let boundary = cursor_created_at(pool, id).await?;
            sqlx::query_as::<_, ChatRow>(
                r#"
                SELECT id, created_at, title, user_id, visibility
                FROM chats
                WHERE user_id = ? AND created_at > ?
                ORDER BY created_at DESC
                LIMIT ?
                "#,
            )
            .bind(user_id)
            .bind(to_millis(boundary))
            .bind(limit)
            .fetch_all(pool)
            .await?
        }
        Cursor::EndingBefore(id) => {
            let boundary = cursor_created_at(pool, id).await?;
            sqlx::query_as::<_, ChatRow>(
                r#"
                SELECT id, created_at, title, user_id, visibility
                FROM chats
                WHERE user_id = ? AND created_at < ?
                ORDER BY created_at DESC
                LIMIT ?
                "#,
            )
            .bind(user_id)
            .bind(to_millis(boundary))
            .bind(limit)
            .fetch_all(pool)
            .await?
        }
    };

    let chats: Vec<Chat> = collect(rows)?;
    let has_more = chats.len() as i64 == limit;

    Ok(ChatPage { chats, has_more })
}

async fn cursor_created_at(pool: &SqlitePool, id: &str) -> Result<DateTime<Utc>> {
    get_chat_by_id(pool, id)
        .await?
        .map(|chat| chat.created_at)
        .ok_or_else(|| DatabaseError::NotFound {
            entity: "chat",
            id: id.to_string(),
        })
}
