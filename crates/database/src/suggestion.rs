//! Document suggestions.

use sqlx::SqlitePool;

use crate::models::Suggestion;
use crate::rows::{collect, SuggestionRow};
use crate::Result;

/// Insert a batch of suggestions in one transaction.
pub async fn save_suggestions(pool: &SqlitePool, suggestions: &[Suggestion]) -> Result<()> {
    if suggestions.is_empty() {
        return Ok(());
    }

    let mut tx = pool.begin().await?;
    for suggestion in suggestions {
        let row = SuggestionRow::from(suggestion);
        sqlx::query(
            r#"
            INSERT INTO suggestions (
                id, document_id, document_created_at, original_text, suggested_text,
                description, is_resolved, user_id, created_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&row.id)
        .bind(&row.document_id)
        .bind(row.document_created_at)
        .bind(&row.original_text)
        .bind(&row.suggested_text)
        .bind(&row.description)
        .bind(row.is_resolved)
        .bind(&row.user_id)
        .bind(row.created_at)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;

    Ok(())
}

/// Get every suggestion made on any revision of a document.
pub async fn get_suggestions_by_document_id(
    pool: &SqlitePool,
    document_id: &str,
) -> Result<Vec<Suggestion>> {
    let rows = sqlx::query_as::<_, SuggestionRow>(
        r#"
        SELECT id, document_id, document_created_at, original_text, suggested_text,
               description, is_resolved, user_id, created_at
        FROM suggestions
        WHERE document_id = ?
        ORDER BY created_at ASC
        "#,
    )
    .bind(document_id)
    .fetch_all(pool)
    .await?;

    collect(rows)
}

/// Delete every suggestion made on a document.
pub async fn delete_suggestions_by_document_id(pool: &SqlitePool, document_id: &str) -> Result<u64> {
    let result = sqlx::query(
        r#"
        DELETE FROM suggestions
        WHERE document_id = ?
        "#,
    )
    .bind(document_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}
