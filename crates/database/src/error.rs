//! Database error types.

use thiserror::Error;

/// Errors that can occur during database operations.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// SQLx error (connection, query, etc.)
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// Migration error
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// JSON column could not be encoded or decoded
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A stored value does not map onto the application type
    #[error("invalid {column} value: {value}")]
    InvalidColumn { column: &'static str, value: String },

    /// Record not found
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },
}

impl DatabaseError {
    /// Machine-readable `<type>:<surface>` code.
    pub fn code(&self) -> &'static str {
        match self {
            DatabaseError::NotFound { .. } => "not_found:database",
            _ => "bad_request:database",
        }
    }
}

/// Result type for database operations.
pub type Result<T> = std::result::Result<T, DatabaseError>;
