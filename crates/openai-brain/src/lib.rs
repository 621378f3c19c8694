//! OpenAI-compatible language model provider.
//!
//! This crate implements [`chat_core::LanguageModel`] over the streaming chat
//! completions API. Any provider that speaks the same wire format can be used
//! by pointing `MODEL_API_URL` at it.
//!
//! # Features
//!
//! - Server-sent event streaming of text, reasoning and tool calls
//! - Tool call fragments reassembled into whole calls
//! - One provider model name per logical model (chat, reasoning, title, artifact)
//! - Configurable via environment variables
//!
//! # Usage
//!
//! ```rust,no_run
//! use chat_core::{LanguageModel, ModelId, ModelRequest};
//! use openai_brain::OpenAiModel;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let model = OpenAiModel::from_env()?;
//!     let title = model
//!         .generate_text(ModelRequest::new(ModelId::TitleModel).prompt("Plan a trip to Porto"))
//!         .await?;
//!     println!("{}", title);
//!     Ok(())
//! }
//! ```

mod api_types;
mod brain;
mod config;

pub use brain::OpenAiModel;
pub use config::{ModelNames, OpenAiConfig, OpenAiConfigBuilder};
