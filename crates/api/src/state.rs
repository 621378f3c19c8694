//! Application state shared across handlers.

use std::sync::Arc;
use std::time::Duration;

use database::Database;
use orchestrator::{Orchestrator, StreamContext};

use crate::auth::SessionProvider;
use crate::storage::ObjectStore;

/// Ceiling for the work done before a chat stream starts.
pub const DEFAULT_PRE_STREAM_TIMEOUT: Duration = Duration::from_secs(60);

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Database connection.
    pub db: Database,
    /// Runs chat turns.
    pub orchestrator: Orchestrator,
    /// Resumable stream backend; `None` streams directly.
    pub stream_context: Option<Arc<dyn StreamContext>>,
    /// Caller identity.
    pub sessions: Arc<dyn SessionProvider>,
    /// Upload storage.
    pub storage: Arc<dyn ObjectStore>,
    /// Limit on rate checks, titling and persistence before streaming.
    pub pre_stream_timeout: Duration,
}

impl AppState {
    /// Create new application state with anonymous sessions and no storage.
    pub fn new(db: Database, orchestrator: Orchestrator) -> Self {
        Self {
            db,
            orchestrator,
            stream_context: None,
            sessions: Arc::new(crate::auth::AnonymousSessions),
            storage: Arc::new(crate::storage::UnconfiguredStore),
            pre_stream_timeout: DEFAULT_PRE_STREAM_TIMEOUT,
        }
    }

    pub fn with_stream_context(mut self, context: Arc<dyn StreamContext>) -> Self {
        self.stream_context = Some(context);
        self
    }

    pub fn with_sessions(mut self, sessions: Arc<dyn SessionProvider>) -> Self {
        self.sessions = sessions;
        self
    }

    pub fn with_storage(mut self, storage: Arc<dyn ObjectStore>) -> Self {
        self.storage = storage;
        self
    }

    pub fn with_pre_stream_timeout(mut self, timeout: Duration) -> Self {
        self.pre_stream_timeout = timeout;
        self
    }
}
