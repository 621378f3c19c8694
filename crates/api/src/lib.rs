//! HTTP surface of the chat gateway.
//!
//! | Route | Purpose |
//! |-------|---------|
//! | `POST /api/chat` | Send a message, stream the reply as SSE |
//! | `DELETE /api/chat?id=` | Delete a public chat |
//! | `GET /api/chat/:id/stream` | Resume the latest stream of a chat |
//! | `GET /api/history` | Page through the caller's chats |
//! | `GET, PATCH /api/vote` | Read and cast message votes |
//! | `GET, POST, DELETE /api/document` | Document revisions |
//! | `GET /api/suggestions` | Suggestions on a document |
//! | `POST /api/files/upload` | Upload an attachment |
//! | `GET /ping`, `GET /health` | Liveness |

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;
pub mod state;
pub mod storage;

use axum::Router;
use tower_http::trace::TraceLayer;

pub use config::{Config, ConfigError};
pub use error::{ApiError, ErrorCode, ErrorType, Surface};
pub use state::AppState;

/// Build the application with tracing.
pub fn app(state: AppState) -> Router {
    routes::router()
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
