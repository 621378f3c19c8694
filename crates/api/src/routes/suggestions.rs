//! Suggestions on a document.

use axum::extract::{Query, State};
use axum::Json;
use database::Suggestion;
use serde::Deserialize;

use crate::error::{ApiError, Result};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionsQuery {
    pub document_id: Option<String>,
}

/// `GET /api/suggestions?documentId=`
pub async fn suggestions(
    State(state): State<AppState>,
    Query(query): Query<SuggestionsQuery>,
) -> Result<Json<Vec<Suggestion>>> {
    let document_id = query
        .document_id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ApiError::bad_request("Parameter documentId is required."))?;

    let suggestions =
        database::suggestion::get_suggestions_by_document_id(state.db.pool(), &document_id).await?;
    Ok(Json(suggestions))
}
