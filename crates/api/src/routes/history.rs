//! Chat history for the sidebar.

use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::Json;
use database::{ChatPage, Cursor};
use serde::Deserialize;

use crate::auth::{current_user, PUBLIC_USER};
use crate::error::{ApiError, Result};
use crate::state::AppState;

/// Page size when `limit` is absent.
pub const DEFAULT_LIMIT: i64 = 10;

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<String>,
    pub starting_after: Option<String>,
    pub ending_before: Option<String>,
}

/// `GET /api/history?limit=&starting_after=&ending_before=`
pub async fn history(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<ChatPage>> {
    let starting_after = query.starting_after.as_deref().filter(|id| !id.is_empty());
    let ending_before = query.ending_before.as_deref().filter(|id| !id.is_empty());

    let cursor = match (starting_after, ending_before) {
        (Some(_), Some(_)) => {
            return Err(ApiError::bad_request(
                "Only one of starting_after or ending_before can be provided.",
            ))
        }
        (Some(id), None) => Cursor::StartingAfter(id),
        (None, Some(id)) => Cursor::EndingBefore(id),
        (None, None) => Cursor::None,
    };

    let limit = match query.limit.as_deref().filter(|l| !l.is_empty()) {
        Some(limit) => limit
            .parse::<i64>()
            .map_err(|_| ApiError::bad_request("Parameter limit must be a number."))?,
        None => DEFAULT_LIMIT,
    };

    let user_id = match current_user(state.sessions.as_ref(), &headers).await {
        Some(user) if user != PUBLIC_USER => user,
        _ => return Ok(Json(ChatPage::empty())),
    };

    let page = database::chat::get_chats_by_user_id(state.db.pool(), &user_id, limit, cursor).await?;
    Ok(Json(page))
}
