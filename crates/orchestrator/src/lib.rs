//! Chat turn orchestration.
//!
//! This crate provides the [`Orchestrator`] type which runs one chat turn:
//! it stores the chat and the user's message, then drives the model through
//! up to [`MAX_STEPS`] calls, executing the tools it requests and streaming
//! UI chunks back to the caller. The reply is stored once complete.
//!
//! # Architecture
//!
//! ```text
//! POST /api/chat (api crate)
//!          ↓
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      ORCHESTRATOR                           │
//! │                                                             │
//! │  1. Check the daily allowance (signed-in callers)           │
//! │  2. Create the chat with a generated title if new           │
//! │  3. Load history, store the user message                    │
//! │  4. Record a stream id                                      │
//! │  5. Spawn the step loop:                                    │
//! │     • stream text/reasoning, re-chunked on words            │
//! │     • run requested tools, feed results back                │
//! │     • store the assistant message on finish                 │
//! └─────────────────────────────────────────────────────────────┘
//!          ↓
//! UI chunks → optional StreamContext → SSE
//! ```

mod error;
mod orchestrator;
pub mod resumable;
mod title;
mod turn;

pub use error::{OrchestratorError, Result};
pub use orchestrator::{
    append_message_chunk, ChatRequest, Orchestrator, Resumed, StartedTurn,
    DEFAULT_MAX_MESSAGES_PER_DAY,
};
pub use resumable::{ChunkStream, MemoryStreamContext, RedisStreamContext, StreamContext};
pub use title::{fallback_title, generate_title, DEFAULT_TITLE, MAX_TITLE_CHARS};
pub use turn::{TurnInput, TurnRunner, MAX_STEPS, STREAM_ERROR_TEXT};
