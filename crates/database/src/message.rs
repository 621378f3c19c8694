//! Message persistence.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::models::Message;
use crate::rows::{collect, to_millis, MessageRow};
use crate::Result;

/// Insert a batch of messages in one transaction.
pub async fn save_messages(pool: &SqlitePool, messages: &[Message]) -> Result<()> {
    if messages.is_empty() {
        return Ok(());
    }

    let mut tx = pool.begin().await?;
    for message in messages {
        let row = MessageRow::try_from(message)?;
        sqlx::query(
            r#"
            INSERT INTO messages (id, chat_id, user_id, role, parts, attachments, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&row.id)
        .bind(&row.chat_id)
        .bind(&row.user_id)
        .bind(&row.role)
        .bind(&row.parts)
        .bind(&row.attachments)
        .bind(row.created_at)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;

    tracing::debug!(count = messages.len(), "Saved messages");
    Ok(())
}

/// Get every message of a chat, oldest first.
pub async fn get_messages_by_chat_id(pool: &SqlitePool, chat_id: &str) -> Result<Vec<Message>> {
    let rows = sqlx::query_as::<_, MessageRow>(
        r#"
        SELECT id, chat_id, user_id, role, parts, attachments, created_at
        FROM messages
        WHERE chat_id = ?
        ORDER BY created_at ASC, rowid ASC
        "#,
    )
    .bind(chat_id)
    .fetch_all(pool)
    .await?;

    collect(rows)
}

/// Get a single message by ID.
pub async fn get_message_by_id(pool: &SqlitePool, id: &str) -> Result<Option<Message>> {
    let row = sqlx::query_as::<_, MessageRow>(
        r#"
        SELECT id, chat_id, user_id, role, parts, attachments, created_at
        FROM messages
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    row.map(Message::try_from).transpose()
}

/// Delete the messages of a chat created at or after `timestamp`, with their votes.
pub async fn delete_messages_by_chat_id_after_timestamp(
    pool: &SqlitePool,
    chat_id: &str,
    timestamp: DateTime<Utc>,
) -> Result<u64> {
    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        DELETE FROM votes
        WHERE chat_id = ?
          AND message_id IN (
            SELECT id FROM messages WHERE chat_id = ? AND created_at >= ?
          )
        "#,
    )
    .bind(chat_id)
    .bind(chat_id)
    .bind(to_millis(timestamp))
    .execute(&mut *tx)
    .await?;

    let result = sqlx::query(
        r#"
        DELETE FROM messages
        WHERE chat_id = ? AND created_at >= ?
        "#,
    )
    .bind(chat_id)
    .bind(to_millis(timestamp))
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(result.rows_affected())
}

/// Count the user-role messages a user sent since `since`.
pub async fn count_user_messages_since(
    pool: &SqlitePool,
    user_id: &str,
    since: DateTime<Utc>,
) -> Result<i64> {
    let count: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*)
        FROM messages
        WHERE user_id = ? AND role = 'user' AND created_at >= ?
        "#,
    )
    .bind(user_id)
    .bind(to_millis(since))
    .fetch_one(pool)
    .await?;

    Ok(count)
}
