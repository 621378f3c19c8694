//! Document revisions.
//!
//! A document is the set of rows sharing an `id`; the newest row is current.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::models::Document;
use crate::rows::{collect, to_millis, DocumentRow};
use crate::Result;

/// Insert a new revision.
pub async fn save_document(pool: &SqlitePool, document: &Document) -> Result<()> {
    let row = DocumentRow::from(document);
    sqlx::query(
        r#"
        INSERT INTO documents (id, created_at, title, content, kind, user_id)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&row.id)
    .bind(row.created_at)
    .bind(&row.title)
    .bind(&row.content)
    .bind(&row.kind)
    .bind(&row.user_id)
    .execute(pool)
    .await?;

    tracing::debug!(document_id = %row.id, kind = %row.kind, "Saved document revision");
    Ok(())
}

/// Get every revision of a document, oldest first.
pub async fn get_documents_by_id(pool: &SqlitePool, id: &str) -> Result<Vec<Document>> {
    let rows = sqlx::query_as::<_, DocumentRow>(
        r#"
        SELECT id, created_at, title, content, kind, user_id
        FROM documents
        WHERE id = ?
        ORDER BY created_at ASC
        "#,
    )
    .bind(id)
    .fetch_all(pool)
    .await?;

    collect(rows)
}

/// Get the current revision of a document.
pub async fn get_document_by_id(pool: &SqlitePool, id: &str) -> Result<Option<Document>> {
    let row = sqlx::query_as::<_, DocumentRow>(
        r#"
        SELECT id, created_at, title, content, kind, user_id
        FROM documents
        WHERE id = ?
        ORDER BY created_at DESC
        LIMIT 1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    row.map(Document::try_from).transpose()
}

/// Delete revisions created after `timestamp` and the suggestions made on them.
///
/// Returns the deleted revisions.
pub async fn delete_documents_by_id_after_timestamp(
    pool: &SqlitePool,
    id: &str,
    timestamp: DateTime<Utc>,
) -> Result<Vec<Document>> {
    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        DELETE FROM suggestions
        WHERE document_id = ? AND document_created_at > ?
        "#,
    )
    .bind(id)
    .bind(to_millis(timestamp))
    .execute(&mut *tx)
    .await?;

    let rows = sqlx::query_as::<_, DocumentRow>(
        r#"
        DELETE FROM documents
        WHERE id = ? AND created_at > ?
        RETURNING id, created_at, title, content, kind, user_id
        "#,
    )
    .bind(id)
    .bind(to_millis(timestamp))
    .fetch_all(&mut *tx)
    .await?;

    tx.commit().await?;
    collect(rows)
}
