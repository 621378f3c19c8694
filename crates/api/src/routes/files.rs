//! File uploads for message attachments.

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use serde_json::json;
use tracing::{info, warn};

use crate::state::AppState;

fn error(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(json!({ "error": message.into() }))).into_response()
}

/// `POST /api/files/upload` with a multipart `file` field.
pub async fn upload(State(state): State<AppState>, mut multipart: Multipart) -> Response {
    let mut file = None;
    loop {
        match multipart.next_field().await {
            Ok(Some(field)) if field.name() == Some("file") => {
                let name = field.file_name().unwrap_or("file").to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                match field.bytes().await {
                    Ok(bytes) => file = Some((name, content_type, bytes)),
                    Err(e) => return error(StatusCode::BAD_REQUEST, e.body_text()),
                }
                break;
            }
            Ok(Some(_)) => continue,
            Ok(None) => break,
            Err(e) => return error(StatusCode::BAD_REQUEST, e.body_text()),
        }
    }

    let Some((name, content_type, bytes)) = file else {
        return error(StatusCode::BAD_REQUEST, "No file uploaded");
    };

    let path = format!("uploads/{}-{}", Utc::now().timestamp_millis(), name);
    match state.storage.upload(&path, bytes.to_vec(), &content_type).await {
        Ok(url) => {
            info!("Stored upload {} ({} bytes)", path, bytes.len());
            Json(json!({
                "url": url,
                "name": name,
                "contentType": content_type,
            }))
            .into_response()
        }
        Err(e) => {
            warn!("Upload of {} failed: {}", path, e);
            error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

/// `GET /api/files/upload`
pub async fn method_not_allowed() -> Response {
    (StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed").into_response()
}
