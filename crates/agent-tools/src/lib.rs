//! Model-callable tools for the chat gateway.
//!
//! Tools implement [`Tool`] and are dispatched by name through a
//! [`ToolRegistry`]. The document tools delegate drafting to the
//! [`artifacts`] handlers, one per [`chat_core::ArtifactKind`], which
//! stream progress to the client as data parts.
//!
//! # Built-in Tools
//!
//! - [`GetWeather`] - Current weather via Open-Meteo (no API key needed).
//! - [`CreateDocument`] - Draft and store a new document.
//! - [`UpdateDocument`] - Store a revised revision of a document.
//! - [`RequestSuggestions`] - Stream and store edit suggestions for a document.
//!
//! # Example
//!
//! ```rust,ignore
//! use agent_tools::{default_registry, ToolContext};
//!
//! let registry = default_registry(pool, model, GetWeather::new());
//! let output = registry
//!     .execute("getWeather", json!({"latitude": 52.5, "longitude": 13.4}), context)
//!     .await?;
//! ```

pub mod artifacts;
mod error;
mod registry;
mod tool;
pub mod tools;

use std::sync::Arc;

use chat_core::LanguageModel;
use database::SqlitePool;

pub use artifacts::{ArtifactHandlers, DocumentHandler};
pub use error::ToolError;
pub use registry::ToolRegistry;
pub use tool::{Tool, ToolArgs, ToolContext, ToolOutput};
pub use tools::{CreateDocument, GetWeather, RequestSuggestions, UpdateDocument};

/// Create a registry with every chat tool.
///
/// `model` drafts documents and suggestions.
pub fn default_registry(
    pool: SqlitePool,
    model: Arc<dyn LanguageModel>,
    weather: GetWeather,
) -> ToolRegistry {
    let handlers = ArtifactHandlers::new(model.clone());
    let mut registry = ToolRegistry::new();

    registry.register(weather);
    registry.register(CreateDocument::new(pool.clone(), handlers.clone()));
    registry.register(UpdateDocument::new(pool.clone(), handlers));
    registry.register(RequestSuggestions::new(pool, model));

    registry
}
