//! Document revisions.

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::Json;
use chat_core::ArtifactKind;
use chrono::{DateTime, Utc};
use database::Document;
use serde::Deserialize;

use crate::auth::current_user;
use crate::error::{ApiError, ErrorType, Result, Surface};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct DocumentQuery {
    pub id: Option<String>,
    pub timestamp: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DocumentBody {
    pub content: String,
    pub title: String,
    pub kind: ArtifactKind,
}

fn required_id(query: &DocumentQuery) -> Result<&str> {
    query
        .id
        .as_deref()
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ApiError::bad_request("Parameter id is missing"))
}

/// `GET /api/document?id=`
pub async fn get_document(
    State(state): State<AppState>,
    Query(query): Query<DocumentQuery>,
) -> Result<Json<Vec<Document>>> {
    let id = required_id(&query)?;

    let documents = database::document::get_documents_by_id(state.db.pool(), id).await?;
    if documents.is_empty() {
        return Err(ApiError::new(ErrorType::NotFound, Surface::Document));
    }
    Ok(Json(documents))
}

/// `POST /api/document?id=`
pub async fn save_document(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<DocumentQuery>,
    body: Bytes,
) -> Result<Json<Document>> {
    let id = required_id(&query)?;
    let body: DocumentBody = serde_json::from_slice(&body).map_err(|e| {
        ApiError::with_cause(ErrorType::BadRequest, Surface::Document, e.to_string())
    })?;

    let document = Document {
        id: id.to_string(),
        created_at: database::now(),
        title: body.title,
        content: Some(body.content),
        kind: body.kind,
        user_id: current_user(state.sessions.as_ref(), &headers).await,
    };
    database::document::save_document(state.db.pool(), &document).await?;

    Ok(Json(document))
}

/// `DELETE /api/document?id=&timestamp=`
pub async fn delete_document(
    State(state): State<AppState>,
    Query(query): Query<DocumentQuery>,
) -> Result<Json<Vec<Document>>> {
    let id = required_id(&query)?;
    let timestamp = query
        .timestamp
        .as_deref()
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::bad_request("Parameter timestamp is required."))?;
    let timestamp: DateTime<Utc> = DateTime::parse_from_rfc3339(timestamp)
        .map_err(|_| ApiError::bad_request("Parameter timestamp must be an RFC 3339 date."))?
        .with_timezone(&Utc);

    let deleted =
        database::document::delete_documents_by_id_after_timestamp(state.db.pool(), id, timestamp)
            .await?;
    Ok(Json(deleted))
}
