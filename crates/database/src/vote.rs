//! Message votes.

use sqlx::SqlitePool;

use crate::models::Vote;
use crate::rows::VoteRow;
use crate::Result;

/// Record an up or down vote, replacing any earlier vote on the message.
pub async fn vote_message(
    pool: &SqlitePool,
    chat_id: &str,
    message_id: &str,
    is_upvoted: bool,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO votes (chat_id, message_id, is_upvoted)
        VALUES (?, ?, ?)
        ON CONFLICT(chat_id, message_id) DO UPDATE SET
            is_upvoted = excluded.is_upvoted
        "#,
    )
    .bind(chat_id)
    .bind(message_id)
    .bind(is_upvoted)
    .execute(pool)
    .await?;

    Ok(())
}

/// Get every vote cast in a chat.
pub async fn get_votes_by_chat_id(pool: &SqlitePool, chat_id: &str) -> Result<Vec<Vote>> {
    let rows = sqlx::query_as::<_, VoteRow>(
        r#"
        SELECT chat_id, message_id, is_upvoted
        FROM votes
        WHERE chat_id = ?
        "#,
    )
    .bind(chat_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(Vote::from).collect())
}
