//! Chat turn ingestion.

use std::sync::Arc;

use agent_tools::ToolRegistry;
use chat_core::{LanguageModel, ModelId, RequestHints, Role, UiChunk, UiMessage};
use chrono::Duration;
use database::{Chat, Message, SqlitePool, Visibility};
use serde_json::json;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{OrchestratorError, Result};
use crate::resumable::{ChunkStream, StreamContext};
use crate::title::generate_title;
use crate::turn::{TurnInput, TurnRunner};

/// Default daily allowance of user messages for a signed-in caller.
pub const DEFAULT_MAX_MESSAGES_PER_DAY: i64 = 100;

/// How recent a finished reply must be to be replayed on resume, in seconds.
const RESUME_WINDOW_SECS: i64 = 15;

/// A validated chat request.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub chat_id: String,
    pub message: UiMessage,
    pub model: ModelId,
    pub visibility: Visibility,
    pub user_id: Option<String>,
    pub hints: RequestHints,
}

/// A turn whose writes are done and whose reply is streaming.
#[derive(Debug)]
pub struct StartedTurn {
    pub stream_id: String,
    pub chunks: UnboundedReceiver<UiChunk>,
}

/// Outcome of a resume request.
pub enum Resumed {
    /// The latest stream is still live.
    Live(ChunkStream),
    /// The latest stream finished moments ago with this reply.
    Restored(UiMessage),
    /// Nothing left to replay.
    Finished,
}

/// Coordinates persistence, the model and the tools for each chat turn.
#[derive(Clone)]
pub struct Orchestrator {
    pool: SqlitePool,
    model: Arc<dyn LanguageModel>,
    runner: TurnRunner,
    max_messages_per_day: i64,
}

impl Orchestrator {
    pub fn new(pool: SqlitePool, model: Arc<dyn LanguageModel>, tools: ToolRegistry) -> Self {
        let runner = TurnRunner::new(pool.clone(), model.clone(), tools);
        Self {
            pool,
            model,
            runner,
            max_messages_per_day: DEFAULT_MAX_MESSAGES_PER_DAY,
        }
    }

    pub fn with_max_messages_per_day(mut self, max: i64) -> Self {
        self.max_messages_per_day = max;
        self
    }

    /// Store the chat and the user message, then start streaming the reply.
    pub async fn start_turn(&self, request: ChatRequest) -> Result<StartedTurn> {
        let ChatRequest {
            chat_id,
            message,
            model,
            visibility,
            user_id,
            hints,
        } = request;

        info!("Chat turn for {} (user: {:?}, model: {})", chat_id, user_id, model.as_str());

        if let Some(user) = user_id.as_deref() {
            let since = database::now() - Duration::hours(24);
            let count = database::message::count_user_messages_since(&self.pool, user, since).await?;
            if count > self.max_messages_per_day {
                warn!("User {} over the daily limit ({} messages)", user, count);
                return Err(OrchestratorError::RateLimited { count });
            }
        }

        if database::chat::get_chat_by_id(&self.pool, &chat_id).await?.is_none() {
            let title = generate_title(self.model.as_ref(), &message).await;
            debug!("New chat {} titled {:?}", chat_id, title);
            let chat = Chat {
                id: chat_id.clone(),
                created_at: database::now(),
                title,
                user_id: user_id.clone(),
                visibility,
            };
            database::chat::save_chat(&self.pool, &chat).await?;
        }

        let mut messages: Vec<UiMessage> = database::message::get_messages_by_chat_id(&self.pool, &chat_id)
            .await?
            .iter()
            .map(Message::to_ui)
            .collect();

        let stored = Message::from_ui(&message, &chat_id, user_id.as_deref(), database::now());
        database::message::save_messages(&self.pool, &[stored]).await?;
        messages.push(message);

        let stream_id = Uuid::new_v4().to_string();
        database::stream::create_stream_id(&self.pool, &stream_id, &chat_id).await?;

        let chunks = self.runner.spawn(TurnInput {
            chat_id,
            user_id,
            model,
            hints,
            messages,
        });

        Ok(StartedTurn { stream_id, chunks })
    }

    /// Reattach to the latest stream of a chat.
    pub async fn resume(&self, chat_id: &str, context: &dyn StreamContext) -> Result<Resumed> {
        if database::chat::get_chat_by_id(&self.pool, chat_id).await?.is_none() {
            return Err(OrchestratorError::ChatNotFound(chat_id.to_string()));
        }

        let stream_ids = database::stream::get_stream_ids_by_chat_id(&self.pool, chat_id).await?;
        let Some(stream_id) = stream_ids.last() else {
            return Err(OrchestratorError::StreamNotFound(chat_id.to_string()));
        };

        if let Some(stream) = context.resume_existing_stream(stream_id).await? {
            debug!("Resuming live stream {}", stream_id);
            return Ok(Resumed::Live(stream));
        }

        let messages = database::message::get_messages_by_chat_id(&self.pool, chat_id).await?;
        let recent = messages.last().filter(|m| {
            m.role == Role::Assistant
                && database::now() - m.created_at <= Duration::seconds(RESUME_WINDOW_SECS)
        });

        Ok(match recent {
            Some(message) => Resumed::Restored(message.to_ui()),
            None => Resumed::Finished,
        })
    }
}

/// The chunk replayed to a client that reconnects after the reply was stored.
pub fn append_message_chunk(message: &UiMessage) -> UiChunk {
    UiChunk::data("appendMessage", json!(serde_json::to_string(message).unwrap_or_default()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resumable::MemoryStreamContext;
    use chat_core::MessagePart;
    use database::Database;
    use futures::StreamExt;
    use mock_brain::{Script, ScriptedModel};
    use tokio_stream::wrappers::UnboundedReceiverStream;

    async fn database() -> Database {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db.migrate().await.unwrap();
        db
    }

    fn request(chat_id: &str, user_id: Option<&str>) -> ChatRequest {
        ChatRequest {
            chat_id: chat_id.to_string(),
            message: UiMessage::new(
                Uuid::new_v4().to_string(),
                Role::User,
                vec![MessagePart::text("hello")],
            ),
            model: ModelId::ChatModel,
            visibility: Visibility::Private,
            user_id: user_id.map(str::to_string),
            hints: RequestHints::default(),
        }
    }

    async fn drain(mut turn: StartedTurn) -> Vec<UiChunk> {
        let mut chunks = Vec::new();
        while let Some(chunk) = turn.chunks.recv().await {
            chunks.push(chunk);
        }
        chunks
    }

    #[tokio::test]
    async fn test_new_chat_is_created_before_messages() {
        let db = database().await;
        let model = ScriptedModel::new()
            .on(ModelId::TitleModel, Script::text("Greeting"))
            .on(ModelId::ChatModel, Script::text("Hi!"));
        let orchestrator = Orchestrator::new(db.pool().clone(), Arc::new(model), ToolRegistry::new());

        let turn = orchestrator.start_turn(request("c1", None)).await.unwrap();
        let stream_id = turn.stream_id.clone();
        drain(turn).await;

        let chat = database::chat::get_chat_by_id(db.pool(), "c1").await.unwrap().unwrap();
        assert_eq!(chat.title, "Greeting");
        assert_eq!(chat.user_id, None);

        let messages = database::message::get_messages_by_chat_id(db.pool(), "c1").await.unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::User);
        assert_eq!(messages[1].role, Role::Assistant);
        assert!(chat.created_at <= messages[0].created_at);

        let streams = database::stream::get_stream_ids_by_chat_id(db.pool(), "c1").await.unwrap();
        assert_eq!(streams, vec![stream_id]);
    }

    #[tokio::test]
    async fn test_existing_chat_history_is_sent() {
        let db = database().await;
        let model = Arc::new(
            ScriptedModel::new()
                .on(ModelId::ChatModel, Script::text("one"))
                .on(ModelId::ChatModel, Script::text("two")),
        );
        let orchestrator = Orchestrator::new(db.pool().clone(), model.clone(), ToolRegistry::new());

        drain(orchestrator.start_turn(request("c1", None)).await.unwrap()).await;
        drain(orchestrator.start_turn(request("c1", None)).await.unwrap()).await;

        let requests = model.requests_for(ModelId::ChatModel).await;
        // user, assistant, user
        assert_eq!(requests[1].messages.len(), 3);
        assert_eq!(model.requests_for(ModelId::TitleModel).await.len(), 1);
    }

    #[tokio::test]
    async fn test_rate_limit() {
        let db = database().await;
        let model = Arc::new(ScriptedModel::new());
        let orchestrator = Orchestrator::new(db.pool().clone(), model, ToolRegistry::new())
            .with_max_messages_per_day(1);

        drain(orchestrator.start_turn(request("c1", Some("u1"))).await.unwrap()).await;
        drain(orchestrator.start_turn(request("c1", Some("u1"))).await.unwrap()).await;

        let result = orchestrator.start_turn(request("c1", Some("u1"))).await;
        assert!(matches!(result, Err(OrchestratorError::RateLimited { count: 2 })));

        // Anonymous callers are not metered.
        drain(orchestrator.start_turn(request("c1", None)).await.unwrap()).await;
    }

    #[tokio::test]
    async fn test_resume() {
        let db = database().await;
        let model = ScriptedModel::new().on(ModelId::ChatModel, Script::text("restored"));
        let orchestrator = Orchestrator::new(db.pool().clone(), Arc::new(model), ToolRegistry::new());
        let context = MemoryStreamContext::new();

        assert!(matches!(
            orchestrator.resume("c1", &context).await,
            Err(OrchestratorError::ChatNotFound(_))
        ));

        let turn = orchestrator.start_turn(request("c1", None)).await.unwrap();
        let source = UnboundedReceiverStream::new(turn.chunks)
            .map(|chunk| chunk.to_json())
            .boxed();
        let live: Vec<String> = context
            .resumable_stream(&turn.stream_id, source)
            .await
            .unwrap()
            .collect()
            .await;
        assert!(!live.is_empty());

        while context.live_streams() > 0 {
            tokio::task::yield_now().await;
        }

        match orchestrator.resume("c1", &context).await.unwrap() {
            Resumed::Restored(message) => assert_eq!(message.text(), "restored"),
            _ => panic!("expected the stored reply"),
        }
    }
}
