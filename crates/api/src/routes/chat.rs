//! Chat routes: send a message, delete a chat, resume a stream.

use std::convert::Infallible;

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::sse::{Event, Sse};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chat_core::{MessagePart, ModelId, RequestHints, Role, UiMessage};
use database::{Chat, Visibility};
use futures::{stream, StreamExt};
use orchestrator::{append_message_chunk, ChatRequest, ChunkStream, OrchestratorError, Resumed};
use serde::Deserialize;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::{current_user, PUBLIC_USER};
use crate::error::{ApiError, ErrorType, Result, Surface};
use crate::state::AppState;

/// Header announcing the UI message stream protocol.
pub const UI_STREAM_HEADER: &str = "x-vercel-ai-ui-message-stream";

const MAX_TEXT_CHARS: usize = 2000;
const MAX_FILE_NAME_CHARS: usize = 100;
const IMAGE_TYPES: [&str; 2] = ["image/jpeg", "image/png"];

/// Body of `POST /api/chat`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostChatBody {
    pub id: String,
    pub message: IncomingMessage,
    pub selected_chat_model: String,
    pub selected_visibility_type: String,
}

/// The new user message.
#[derive(Debug, Deserialize)]
pub struct IncomingMessage {
    pub id: String,
    pub role: String,
    pub parts: Vec<IncomingPart>,
}

/// A part the client may send.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum IncomingPart {
    Text {
        text: String,
    },
    File {
        #[serde(rename = "mediaType")]
        media_type: String,
        name: String,
        url: String,
    },
}

impl IncomingPart {
    fn validate(self) -> std::result::Result<MessagePart, String> {
        match self {
            IncomingPart::Text { text } => {
                let len = text.chars().count();
                if len == 0 || len > MAX_TEXT_CHARS {
                    return Err(format!("text must be 1 to {} characters", MAX_TEXT_CHARS));
                }
                Ok(MessagePart::Text { text })
            }
            IncomingPart::File {
                media_type,
                name,
                url,
            } => {
                if !IMAGE_TYPES.contains(&media_type.as_str()) {
                    return Err(format!("unsupported media type {}", media_type));
                }
                let len = name.chars().count();
                if len == 0 || len > MAX_FILE_NAME_CHARS {
                    return Err(format!("file name must be 1 to {} characters", MAX_FILE_NAME_CHARS));
                }
                match reqwest::Url::parse(&url) {
                    Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => {}
                    _ => return Err(format!("invalid file url {}", url)),
                }
                Ok(MessagePart::File {
                    media_type,
                    filename: Some(name),
                    url,
                })
            }
        }
    }
}

impl PostChatBody {
    /// Check every field and build the orchestrator request.
    pub fn validate(
        self,
        user_id: Option<String>,
        hints: RequestHints,
    ) -> std::result::Result<ChatRequest, String> {
        Uuid::parse_str(&self.id).map_err(|_| "id must be a UUID".to_string())?;
        Uuid::parse_str(&self.message.id).map_err(|_| "message.id must be a UUID".to_string())?;

        if self.message.role != Role::User.as_str() {
            return Err("message.role must be user".to_string());
        }
        if self.message.parts.is_empty() {
            return Err("message.parts must not be empty".to_string());
        }

        let model: ModelId = self.selected_chat_model.parse()?;
        if !model.is_selectable() {
            return Err(format!("{} cannot be selected", model.as_str()));
        }
        let visibility: Visibility = self.selected_visibility_type.parse()?;

        let parts = self
            .message
            .parts
            .into_iter()
            .map(IncomingPart::validate)
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(ChatRequest {
            chat_id: self.id,
            message: UiMessage::new(self.message.id, Role::User, parts),
            model,
            visibility,
            user_id,
            hints,
        })
    }
}

/// Location hints from the geolocation headers set by the edge.
pub fn request_hints(headers: &HeaderMap) -> RequestHints {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    };

    RequestHints {
        latitude: header("x-vercel-ip-latitude"),
        longitude: header("x-vercel-ip-longitude"),
        city: header("x-vercel-ip-city"),
        country: header("x-vercel-ip-country"),
    }
}

/// Wrap serialized chunks as a UI message stream response.
pub fn sse_response(chunks: ChunkStream) -> Response {
    let events = chunks
        .map(|data| Event::default().data(data))
        .chain(stream::once(async { Event::default().data("[DONE]") }))
        .map(Ok::<_, Infallible>);

    ([(UI_STREAM_HEADER, "v1")], Sse::new(events)).into_response()
}

/// `POST /api/chat`
pub async fn post_chat(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> Result<Response> {
    let body: PostChatBody = serde_json::from_slice(&body)
        .map_err(|e| ApiError::bad_request(format!("invalid request body: {}", e)))?;

    let user_id = current_user(state.sessions.as_ref(), &headers).await;
    let request = body
        .validate(user_id, request_hints(&headers))
        .map_err(ApiError::bad_request)?;

    let turn = match tokio::time::timeout(state.pre_stream_timeout, state.orchestrator.start_turn(request)).await {
        Ok(Ok(turn)) => turn,
        Ok(Err(OrchestratorError::RateLimited { .. })) => {
            return Err(ApiError::new(ErrorType::RateLimit, Surface::Chat))
        }
        Ok(Err(e)) => return Err(ApiError::Internal(e.to_string())),
        Err(_) => return Err(ApiError::Internal("Request timed out".to_string())),
    };

    let chunks: ChunkStream = UnboundedReceiverStream::new(turn.chunks)
        .map(|chunk| chunk.to_json())
        .boxed();

    let chunks = match &state.stream_context {
        Some(context) => context
            .resumable_stream(&turn.stream_id, chunks)
            .await
            .map_err(|e| ApiError::Internal(e.to_string()))?,
        None => chunks,
    };

    info!("Streaming reply on stream {}", turn.stream_id);
    Ok(sse_response(chunks))
}

#[derive(Debug, Deserialize)]
pub struct IdQuery {
    pub id: Option<String>,
}

/// `DELETE /api/chat?id=`
///
/// Only chats owned by the public sentinel user can be deleted.
pub async fn delete_chat(State(state): State<AppState>, Query(query): Query<IdQuery>) -> Result<Json<Chat>> {
    let id = query
        .id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ApiError::bad_request("Parameter id is required."))?;

    let chat = database::chat::get_chat_by_id(state.db.pool(), &id).await?;
    match chat {
        Some(chat) if chat.user_id.as_deref() == Some(PUBLIC_USER) => {}
        _ => return Err(ApiError::new(ErrorType::Forbidden, Surface::Chat)),
    }

    let deleted = database::chat::delete_chat_by_id(state.db.pool(), &id)
        .await?
        .ok_or_else(|| ApiError::new(ErrorType::NotFound, Surface::Chat))?;

    info!("Deleted chat {}", id);
    Ok(Json(deleted))
}

/// `GET /api/chat/:id/stream`
pub async fn resume_stream(State(state): State<AppState>, Path(chat_id): Path<String>) -> Result<Response> {
    let Some(context) = &state.stream_context else {
        return Ok(StatusCode::NO_CONTENT.into_response());
    };

    match state.orchestrator.resume(&chat_id, context.as_ref()).await {
        Ok(Resumed::Live(chunks)) => Ok(sse_response(chunks)),
        Ok(Resumed::Restored(message)) => {
            let chunk = append_message_chunk(&message).to_json();
            Ok(sse_response(stream::iter(vec![chunk]).boxed()))
        }
        Ok(Resumed::Finished) => Ok(sse_response(stream::empty::<String>().boxed())),
        Err(OrchestratorError::ChatNotFound(_)) => Err(ApiError::new(ErrorType::NotFound, Surface::Chat)),
        Err(OrchestratorError::StreamNotFound(_)) => {
            Err(ApiError::new(ErrorType::NotFound, Surface::Stream))
        }
        Err(OrchestratorError::Database(e)) => Err(ApiError::Database(e)),
        Err(e) => {
            warn!("Resuming chat {} failed: {}", chat_id, e);
            Err(ApiError::Internal(e.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use serde_json::json;

    fn body(parts: serde_json::Value) -> PostChatBody {
        serde_json::from_value(json!({
            "id": Uuid::new_v4().to_string(),
            "message": {"id": Uuid::new_v4().to_string(), "role": "user", "parts": parts},
            "selectedChatModel": "chat-model",
            "selectedVisibilityType": "private"
        }))
        .unwrap()
    }

    #[test]
    fn test_valid_body() {
        let request = body(json!([
            {"type": "text", "text": "hello"},
            {"type": "file", "mediaType": "image/png", "name": "a.png", "url": "https://x.test/a.png"}
        ]))
        .validate(None, RequestHints::default())
        .unwrap();
        assert_eq!(request.message.parts.len(), 2);
        assert_eq!(request.visibility, Visibility::Private);
    }

    #[test]
    fn test_rejects_bad_parts() {
        let cases = [
            json!([]),
            json!([{"type": "text", "text": ""}]),
            json!([{"type": "text", "text": "x".repeat(2001)}]),
            json!([{"type": "file", "mediaType": "application/pdf", "name": "a", "url": "https://x.test/a"}]),
            json!([{"type": "file", "mediaType": "image/png", "name": "a", "url": "ftp://x.test/a"}]),
        ];
        for parts in cases {
            assert!(body(parts).validate(None, RequestHints::default()).is_err());
        }
    }

    #[test]
    fn test_rejects_title_model() {
        let mut request = body(json!([{"type": "text", "text": "hi"}]));
        request.selected_chat_model = "title-model".to_string();
        assert!(request.validate(None, RequestHints::default()).is_err());
    }

    #[test]
    fn test_request_hints() {
        let mut headers = HeaderMap::new();
        headers.insert("x-vercel-ip-city", HeaderValue::from_static("Lisbon"));
        let hints = request_hints(&headers);
        assert_eq!(hints.city.as_deref(), Some("Lisbon"));
        assert_eq!(hints.country, None);
    }
}
