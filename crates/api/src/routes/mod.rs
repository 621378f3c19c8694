//! Route handlers for the chat gateway.

pub mod chat;
pub mod document;
pub mod files;
pub mod health;
pub mod history;
pub mod suggestions;
pub mod vote;

use axum::routing::{get, post};
use axum::Router;

use crate::state::AppState;

/// Build the router with all routes.
pub fn router() -> Router<AppState> {
    Router::new()
        // Chat
        .route("/api/chat", post(chat::post_chat).delete(chat::delete_chat))
        .route("/api/chat/:id/stream", get(chat::resume_stream))
        .route("/api/history", get(history::history))
        .route("/api/vote", get(vote::get_votes).patch(vote::vote))
        // Documents
        .route(
            "/api/document",
            get(document::get_document)
                .post(document::save_document)
                .delete(document::delete_document),
        )
        .route("/api/suggestions", get(suggestions::suggestions))
        // Uploads
        .route(
            "/api/files/upload",
            post(files::upload).get(files::method_not_allowed),
        )
        // Health check
        .route("/ping", get(health::ping))
        .route("/health", get(health::health))
}
