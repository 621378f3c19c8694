//! Message votes.

use axum::extract::{Query, State};
use axum::Json;
use database::Vote;
use serde::Deserialize;
use tracing::info;

use crate::error::{ApiError, ErrorType, Result, Surface};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteQuery {
    pub chat_id: Option<String>,
}

#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum VoteType {
    Up,
    Down,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteBody {
    pub chat_id: String,
    pub message_id: String,
    #[serde(rename = "type")]
    pub vote_type: VoteType,
}

/// `GET /api/vote?chatId=`
pub async fn get_votes(State(state): State<AppState>, Query(query): Query<VoteQuery>) -> Result<Json<Vec<Vote>>> {
    let chat_id = query
        .chat_id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ApiError::bad_request("Parameter chatId is required."))?;

    if database::chat::get_chat_by_id(state.db.pool(), &chat_id).await?.is_none() {
        return Err(ApiError::new(ErrorType::NotFound, Surface::Chat));
    }

    let votes = database::vote::get_votes_by_chat_id(state.db.pool(), &chat_id).await?;
    Ok(Json(votes))
}

/// `PATCH /api/vote`
pub async fn vote(State(state): State<AppState>, body: axum::body::Bytes) -> Result<&'static str> {
    let body: VoteBody = serde_json::from_slice(&body)
        .map_err(|_| ApiError::bad_request("Parameters chatId, messageId, and type are required."))?;

    if database::chat::get_chat_by_id(state.db.pool(), &body.chat_id).await?.is_none() {
        return Err(ApiError::new(ErrorType::NotFound, Surface::Vote));
    }

    database::vote::vote_message(
        state.db.pool(),
        &body.chat_id,
        &body.message_id,
        body.vote_type == VoteType::Up,
    )
    .await?;

    info!("Vote {:?} on message {}", body.vote_type, body.message_id);
    Ok("Message voted")
}
