//! Caller identity.
//!
//! A failed lookup never fails the request: the caller is treated as
//! anonymous instead.

use async_trait::async_trait;
use axum::http::{header, HeaderMap};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

/// Owner id of chats anyone may delete.
pub const PUBLIC_USER: &str = "public-user";

/// Errors from the session provider.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("session provider returned status {0}")]
    Status(u16),
}

/// Resolves the signed-in user of a request.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// The caller's user id, `None` when signed out.
    async fn user_id(&self, headers: &HeaderMap) -> Result<Option<String>, AuthError>;
}

/// Every caller is anonymous.
#[derive(Debug, Clone, Default)]
pub struct AnonymousSessions;

#[async_trait]
impl SessionProvider for AnonymousSessions {
    async fn user_id(&self, _headers: &HeaderMap) -> Result<Option<String>, AuthError> {
        Ok(None)
    }
}

#[derive(Debug, Deserialize)]
struct UserResponse {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    user: Option<Box<UserResponse>>,
}

impl UserResponse {
    fn into_id(self) -> Option<String> {
        self.id.or_else(|| self.user.and_then(|u| u.into_id()))
    }
}

/// Looks the bearer token up at a hosted user endpoint.
///
/// The endpoint answers `{"id": ..}` or `{"user": {"id": ..}}` for a valid
/// token and an error status otherwise.
#[derive(Debug, Clone)]
pub struct HttpSessionProvider {
    client: reqwest::Client,
    url: String,
    api_key: Option<String>,
}

impl HttpSessionProvider {
    pub fn new(url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
            api_key,
        }
    }
}

/// Bearer token from the `Authorization` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ").unwrap_or(value).trim();
    (!token.is_empty()).then_some(token)
}

#[async_trait]
impl SessionProvider for HttpSessionProvider {
    async fn user_id(&self, headers: &HeaderMap) -> Result<Option<String>, AuthError> {
        let Some(token) = bearer_token(headers) else {
            return Ok(None);
        };

        let mut request = self.client.get(&self.url).bearer_auth(token);
        if let Some(key) = &self.api_key {
            request = request.header("apikey", key);
        }

        let response = request.send().await?;
        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(AuthError::Status(response.status().as_u16()));
        }

        let user: UserResponse = response.json().await?;
        Ok(user.into_id())
    }
}

/// Resolve the caller, falling back to anonymous on any error.
pub async fn current_user(sessions: &dyn SessionProvider, headers: &HeaderMap) -> Option<String> {
    match sessions.user_id(headers).await {
        Ok(user) => {
            debug!("Caller: {:?}", user);
            user
        }
        Err(e) => {
            warn!("Session lookup failed, continuing anonymously: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_bearer_token() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc"));
        assert_eq!(bearer_token(&headers), Some("abc"));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert_eq!(bearer_token(&headers), None);
    }

    #[test]
    fn test_user_response_shapes() {
        let flat: UserResponse = serde_json::from_str(r#"{"id": "u1"}"#).unwrap();
        assert_eq!(flat.into_id().as_deref(), Some("u1"));

        let nested: UserResponse = serde_json::from_str(r#"{"user": {"id": "u2"}}"#).unwrap();
        assert_eq!(nested.into_id().as_deref(), Some("u2"));
    }

    #[tokio::test]
    async fn test_unreachable_provider_is_anonymous() {
        let sessions = HttpSessionProvider::new("http://127.0.0.1:9/user", None);
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc"));
        assert_eq!(current_user(&sessions, &headers).await, None);
    }
}
