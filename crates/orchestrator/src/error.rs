//! Error types for orchestrator operations.

use agent_tools::ToolError;
use chat_core::ModelError;
use database::DatabaseError;
use thiserror::Error;

/// Errors that can occur while running a chat turn.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// The caller exceeded their daily message allowance.
    #[error("rate limited: {count} messages in the last 24 hours")]
    RateLimited { count: i64 },

    /// The chat does not exist.
    #[error("chat not found: {0}")]
    ChatNotFound(String),

    /// The chat has no recorded streams.
    #[error("no stream recorded for chat {0}")]
    StreamNotFound(String),

    /// Persistence failed.
    #[error("database error: {0}")]
    Database(#[from] DatabaseError),

    /// The model call failed.
    #[error("model error: {0}")]
    Model(#[from] ModelError),

    /// A tool failed outside of its own error handling.
    #[error("tool execution failed: {0}")]
    Tool(#[from] ToolError),

    /// The resumable stream backend failed.
    #[error("stream backend error: {0}")]
    StreamBackend(String),
}

impl From<bb8_redis::redis::RedisError> for OrchestratorError {
    fn from(e: bb8_redis::redis::RedisError) -> Self {
        OrchestratorError::StreamBackend(e.to_string())
    }
}

impl From<bb8_redis::bb8::RunError<bb8_redis::redis::RedisError>> for OrchestratorError {
    fn from(e: bb8_redis::bb8::RunError<bb8_redis::redis::RedisError>) -> Self {
        OrchestratorError::StreamBackend(e.to_string())
    }
}

/// Result alias for orchestrator operations.
pub type Result<T> = std::result::Result<T, OrchestratorError>;
