//! Error types for the HTTP surface.
//!
//! Client-facing errors carry a `<type>:<surface>` code, e.g. `forbidden:chat`.

use std::fmt;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use database::DatabaseError;
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

/// What went wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorType {
    BadRequest,
    Unauthorized,
    Forbidden,
    NotFound,
    RateLimit,
    Offline,
}

impl ErrorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::BadRequest => "bad_request",
            ErrorType::Unauthorized => "unauthorized",
            ErrorType::Forbidden => "forbidden",
            ErrorType::NotFound => "not_found",
            ErrorType::RateLimit => "rate_limit",
            ErrorType::Offline => "offline",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ErrorType::BadRequest => StatusCode::BAD_REQUEST,
            ErrorType::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorType::Forbidden => StatusCode::FORBIDDEN,
            ErrorType::NotFound => StatusCode::NOT_FOUND,
            ErrorType::RateLimit => StatusCode::TOO_MANY_REQUESTS,
            ErrorType::Offline => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

/// Where it went wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Surface {
    Chat,
    Auth,
    Api,
    Stream,
    Database,
    History,
    Vote,
    Document,
    Suggestions,
}

impl Surface {
    pub fn as_str(&self) -> &'static str {
        match self {
            Surface::Chat => "chat",
            Surface::Auth => "auth",
            Surface::Api => "api",
            Surface::Stream => "stream",
            Surface::Database => "database",
            Surface::History => "history",
            Surface::Vote => "vote",
            Surface::Document => "document",
            Surface::Suggestions => "suggestions",
        }
    }
}

/// A `<type>:<surface>` error code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorCode {
    pub error_type: ErrorType,
    pub surface: Surface,
}

impl ErrorCode {
    pub const fn new(error_type: ErrorType, surface: Surface) -> Self {
        Self {
            error_type,
            surface,
        }
    }

    /// Message shown to the user for this code.
    pub fn message(&self) -> &'static str {
        use ErrorType::*;
        use Surface::*;

        match (self.error_type, self.surface) {
            (_, Database) => "Something went wrong while executing a database query.",
            (BadRequest, Api) => {
                "The request couldn't be processed. Please check your input and try again."
            }
            (Unauthorized, Auth) => "You need to sign in before continuing.",
            (Forbidden, Auth) => "Your account does not have access to this feature.",
            (RateLimit, Chat) => {
                "You have exceeded your maximum number of messages for the day. Please try again later."
            }
            (NotFound, Chat) => {
                "The requested chat was not found. Please check the chat ID and try again."
            }
            (Forbidden, Chat) => {
                "This chat belongs to another user. Please check the chat ID and try again."
            }
            (Unauthorized, Chat) => "You need to sign in to view this chat. Please sign in and try again.",
            (Offline, Chat) => {
                "We're having trouble sending your message. Please check your internet connection and try again."
            }
            (NotFound, Document) => {
                "The requested document was not found. Please check the document ID and try again."
            }
            (Forbidden, Document) => {
                "This document belongs to another user. Please check the document ID and try again."
            }
            (BadRequest, Document) => {
                "The request to create or update the document was invalid. Please check your input and try again."
            }
            _ => "Something went wrong. Please try again later.",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.error_type.as_str(), self.surface.as_str())
    }
}

/// Errors returned by route handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// A categorized client-facing error.
    #[error("{code}")]
    Coded { code: ErrorCode, cause: Option<String> },

    /// Persistence failed; the underlying text is only logged.
    #[error("database error: {0}")]
    Database(#[from] DatabaseError),

    /// Unexpected failure, reported as `{"error": message}` with status 500.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn new(error_type: ErrorType, surface: Surface) -> Self {
        ApiError::Coded {
            code: ErrorCode::new(error_type, surface),
            cause: None,
        }
    }

    pub fn with_cause(error_type: ErrorType, surface: Surface, cause: impl Into<String>) -> Self {
        ApiError::Coded {
            code: ErrorCode::new(error_type, surface),
            cause: Some(cause.into()),
        }
    }

    pub fn bad_request(cause: impl Into<String>) -> Self {
        Self::with_cause(ErrorType::BadRequest, Surface::Api, cause)
    }
}

fn coded_response(code: ErrorCode, cause: Option<String>) -> Response {
    let mut body = json!({
        "code": code.to_string(),
        "message": code.message(),
    });
    if let Some(cause) = cause {
        body["cause"] = json!(cause);
    }
    (code.error_type.status(), Json(body)).into_response()
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Coded { code, cause } => {
                warn!(%code, cause = cause.as_deref().unwrap_or(""), "Request failed");
                coded_response(code, cause)
            }
            ApiError::Database(err) => {
                error!("Database error: {}", err);
                let error_type = match err {
                    DatabaseError::NotFound { .. } => ErrorType::NotFound,
                    _ => ErrorType::BadRequest,
                };
                coded_response(ErrorCode::new(error_type, Surface::Database), None)
            }
            ApiError::Internal(message) => {
                error!("Internal error: {}", message);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": message })),
                )
                    .into_response()
            }
        }
    }
}

/// Result type for route handlers.
pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_display() {
        let code = ErrorCode::new(ErrorType::RateLimit, Surface::Chat);
        assert_eq!(code.to_string(), "rate_limit:chat");
        assert_eq!(code.error_type.status(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[test]
    fn test_database_message_is_generic() {
        let code = ErrorCode::new(ErrorType::NotFound, Surface::Database);
        assert_eq!(
            code.message(),
            "Something went wrong while executing a database query."
        );
    }

    #[test]
    fn test_database_not_found_status() {
        let err = ApiError::Database(DatabaseError::NotFound {
            entity: "chat",
            id: "x".to_string(),
        });
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }
}
