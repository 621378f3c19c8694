//! Mock language models for testing the chat gateway.
//!
//! This crate provides mock implementations of the `LanguageModel` trait:
//! - `EchoModel` - Streams the last user message back
//! - `ScriptedModel` - Replays prepared responses per logical model
//! - `DelayedModel` - Wraps another model with artificial delay
//!
//! For a real provider, use the `openai-brain` crate instead.
//!
//! # Example
//!
//! ```rust
//! use mock_brain::{LanguageModel, ModelId, ModelRequest, Script, ScriptedModel};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), mock_brain::ModelError> {
//!     let model = ScriptedModel::new().on(ModelId::ChatModel, Script::text("Hello!"));
//!
//!     let text = model
//!         .generate_text(ModelRequest::new(ModelId::ChatModel).prompt("hi"))
//!         .await?;
//!     println!("Response: {}", text);
//!     Ok(())
//! }
//! ```

mod delayed;
mod echo;
mod scripted;

// Re-export chat-core types for convenience
pub use chat_core::{async_trait, LanguageModel, ModelError, ModelEvent, ModelId, ModelRequest};

pub use delayed::DelayedModel;
pub use echo::EchoModel;
pub use scripted::{Script, ScriptedModel};
