//! Core types shared by every crate of the chat gateway.
//!
//! This crate defines:
//!
//! - [`UiMessage`] / [`MessagePart`] - the message shape exchanged with the
//!   browser and stored in the database
//! - [`LanguageModel`] - the trait every model provider implements
//! - [`UiChunk`] / [`UiStreamWriter`] - the UI message stream relayed to the client
//! - [`to_model_messages`] - conversion from UI messages to provider messages
//! - prompt builders for chat, titles and artifacts
//!
//! # Example
//!
//! ```rust
//! use chat_core::{MessagePart, Role, UiMessage};
//!
//! let message = UiMessage::new("m1", Role::User, vec![MessagePart::text("hi")]);
//! assert_eq!(message.text(), "hi");
//! ```

mod artifact;
mod convert;
mod elements;
mod error;
mod message;
mod model;
mod prompt;
mod stream;

pub use artifact::ArtifactKind;
pub use convert::to_model_messages;
pub use elements::JsonLinesParser;
pub use error::ModelError;
pub use message::{MessageMetadata, MessagePart, Role, ToolPart, ToolState, UiMessage};
pub use model::{
    FinishReason, LanguageModel, ModelEvent, ModelId, ModelMessage, ModelRequest, ModelStream,
    ToolCall, ToolDefinition, UserContent,
};
pub use prompt::{
    system_prompt, update_document_prompt, RequestHints, ARTIFACTS_PROMPT,
    CODE_PROMPT, REGULAR_PROMPT, SHEET_PROMPT, SUGGESTIONS_PROMPT, TEXT_PROMPT, TITLE_PROMPT,
};
pub use stream::{ControlChunk, DataPart, UiChunk, UiStreamWriter, WordChunker};

// Re-export async_trait for convenience
pub use async_trait::async_trait;
