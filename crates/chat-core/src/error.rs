//! Error types for model providers.

use thiserror::Error;

/// Errors that can occur while talking to a language model.
#[derive(Debug, Clone, Error)]
pub enum ModelError {
    /// Provider is misconfigured (missing key, bad URL, unknown model).
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Request could not be delivered.
    #[error("network error: {0}")]
    Network(String),

    /// Provider answered with an error status or an unusable body.
    #[error("provider error ({status}): {message}")]
    Provider { status: u16, message: String },

    /// The response stream broke off or carried malformed events.
    #[error("stream error: {0}")]
    Stream(String),
}
