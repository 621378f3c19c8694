//! Resumable stream IDs recorded per chat.

use sqlx::SqlitePool;

use crate::rows::{now, to_millis};
use crate::Result;

/// Record a new stream ID for a chat.
pub async fn create_stream_id(pool: &SqlitePool, stream_id: &str, chat_id: &str) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO streams (id, chat_id, created_at)
        VALUES (?, ?, ?)
        "#,
    )
    .bind(stream_id)
    .bind(chat_id)
    .bind(to_millis(now()))
    .execute(pool)
    .await?;

    Ok(())
}

/// Get the stream IDs of a chat, oldest first.
pub async fn get_stream_ids_by_chat_id(pool: &SqlitePool, chat_id: &str) -> Result<Vec<String>> {
    let ids = sqlx::query_scalar::<_, String>(
        r#"
        SELECT id
        FROM streams
        WHERE chat_id = ?
        ORDER BY created_at ASC, rowid ASC
        "#,
    )
    .bind(chat_id)
    .fetch_all(pool)
    .await?;

    Ok(ids)
}
