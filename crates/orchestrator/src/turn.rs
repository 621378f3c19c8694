//! The model/tool step loop for one assistant reply.

use std::sync::Arc;

use agent_tools::{ToolContext, ToolRegistry};
use chat_core::{
    system_prompt, to_model_messages, LanguageModel, MessagePart, ModelEvent, ModelId,
    ModelMessage, ModelRequest, RequestHints, Role, ToolCall, ToolPart, UiChunk, UiMessage,
    UiStreamWriter, WordChunker,
};
use database::{Message, SqlitePool};
use futures::StreamExt;
use serde_json::json;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::error::Result;

/// Most model calls made for one reply.
pub const MAX_STEPS: usize = 5;

/// Text sent to the client in place of internal errors.
pub const STREAM_ERROR_TEXT: &str = "Oops, an error occurred!";

/// Everything a turn needs to produce and store the reply.
#[derive(Debug, Clone)]
pub struct TurnInput {
    pub chat_id: String,
    pub user_id: Option<String>,
    pub model: ModelId,
    pub hints: RequestHints,
    /// Stored history followed by the new user message.
    pub messages: Vec<UiMessage>,
}

/// Runs turns against a model with the chat tools.
#[derive(Clone)]
pub struct TurnRunner {
    pool: SqlitePool,
    model: Arc<dyn LanguageModel>,
    tools: ToolRegistry,
}

impl TurnRunner {
    pub fn new(pool: SqlitePool, model: Arc<dyn LanguageModel>, tools: ToolRegistry) -> Self {
        Self { pool, model, tools }
    }

    /// Run the turn on a spawned task and return its chunk stream.
    ///
    /// Failures become a single `error` chunk; the channel closes when the
    /// turn is over.
    pub fn spawn(&self, input: TurnInput) -> UnboundedReceiver<UiChunk> {
        let (writer, rx) = UiStreamWriter::channel();
        let runner = self.clone();

        tokio::spawn(async move {
            let chat_id = input.chat_id.clone();
            if let Err(e) = runner.run(input, &writer).await {
                error!("Turn for chat {} failed: {}", chat_id, e);
                writer.write(UiChunk::error(STREAM_ERROR_TEXT));
            }
        });

        rx
    }

    /// Stream the reply to `writer` and store it once complete.
    pub async fn run(&self, input: TurnInput, writer: &UiStreamWriter) -> Result<UiMessage> {
        let message_id = Uuid::new_v4().to_string();
        writer.write(UiChunk::start(&message_id));

        let system = system_prompt(input.model, &input.hints);
        let definitions = if input.model.supports_tools() {
            self.tools.definitions()
        } else {
            Vec::new()
        };
        let context = ToolContext::new(writer.clone(), input.user_id.clone());

        let mut history = to_model_messages(&input.messages);
        let mut parts = Vec::new();

        for step in 0..MAX_STEPS {
            debug!("Chat {} step {} with {} messages", input.chat_id, step, history.len());

            writer.write(UiChunk::start_step());
            parts.push(MessagePart::StepStart);

            let request = ModelRequest::new(input.model)
                .system(system.clone())
                .messages(history.clone())
                .tools(definitions.clone());
            let step_output = self.run_step(request, writer, &mut parts).await?;

            history.push(ModelMessage::Assistant {
                text: step_output.text,
                tool_calls: step_output.tool_calls.clone(),
            });

            for call in &step_output.tool_calls {
                let output = match self
                    .tools
                    .execute(&call.name, call.arguments.clone(), context.clone())
                    .await
                {
                    Ok(output) => output.content,
                    Err(e) => {
                        warn!("Tool {} failed: {}", call.name, e);
                        json!({ "error": e.to_string() })
                    }
                };

                writer.write(UiChunk::tool_output(&call.id, output.clone()));
                parts.push(MessagePart::Tool(ToolPart::output_available(
                    &call.id,
                    &call.name,
                    call.arguments.clone(),
                    output.clone(),
                )));
                history.push(ModelMessage::Tool {
                    tool_call_id: call.id.clone(),
                    tool_name: call.name.clone(),
                    output,
                });
            }

            writer.write(UiChunk::finish_step());

            if step_output.tool_calls.is_empty() {
                break;
            }
        }

        writer.write(UiChunk::finish());

        let reply = UiMessage::new(message_id, Role::Assistant, parts);
        let stored = Message::from_ui(
            &reply,
            &input.chat_id,
            input.user_id.as_deref(),
            database::now(),
        );
        database::message::save_messages(&self.pool, &[stored]).await?;

        info!("Stored assistant message {} for chat {}", reply.id, input.chat_id);
        Ok(reply)
    }

    async fn run_step(
        &self,
        request: ModelRequest,
        writer: &UiStreamWriter,
        parts: &mut Vec<MessagePart>,
    ) -> Result<StepOutput> {
        let mut stream = self.model.stream(request).await?;
        let mut blocks = Blocks::default();
        let mut tool_calls = Vec::new();

        while let Some(event) = stream.next().await {
            match event? {
                ModelEvent::TextDelta(delta) => blocks.text(&delta, writer, parts),
                ModelEvent::ReasoningDelta(delta) => blocks.reasoning(&delta, writer, parts),
                ModelEvent::ToolCall(call) => {
                    blocks.close(writer, parts);
                    writer.write(UiChunk::tool_input(&call.id, &call.name, call.arguments.clone()));
                    tool_calls.push(call);
                }
                ModelEvent::Finish(reason) => debug!("Step finished: {:?}", reason),
            }
        }
        blocks.close(writer, parts);

        Ok(StepOutput {
            text: blocks.step_text,
            tool_calls,
        })
    }
}

struct StepOutput {
    text: String,
    tool_calls: Vec<ToolCall>,
}

/// Open text and reasoning blocks of the current step.
#[derive(Default)]
struct Blocks {
    text: Option<(String, String, WordChunker)>,
    reasoning: Option<(String, String)>,
    step_text: String,
}

impl Blocks {
    fn text(&mut self, delta: &str, writer: &UiStreamWriter, parts: &mut Vec<MessagePart>) {
        self.close_reasoning(writer, parts);

        let (id, text, chunker) = self.text.get_or_insert_with(|| {
            let id = Uuid::new_v4().to_string();
            writer.write(UiChunk::text_start(&id));
            (id, String::new(), WordChunker::new())
        });

        text.push_str(delta);
        self.step_text.push_str(delta);
        for word in chunker.push(delta) {
            writer.write(UiChunk::text_delta(id.as_str(), word));
        }
    }

    fn reasoning(&mut self, delta: &str, writer: &UiStreamWriter, parts: &mut Vec<MessagePart>) {
        self.close_text(writer, parts);

        let (id, text) = self.reasoning.get_or_insert_with(|| {
            let id = Uuid::new_v4().to_string();
            writer.write(UiChunk::reasoning_start(&id));
            (id, String::new())
        });

        text.push_str(delta);
        writer.write(UiChunk::reasoning_delta(id.as_str(), delta));
    }

    fn close(&mut self, writer: &UiStreamWriter, parts: &mut Vec<MessagePart>) {
        self.close_reasoning(writer, parts);
        self.close_text(writer, parts);
    }

    fn close_text(&mut self, writer: &UiStreamWriter, parts: &mut Vec<MessagePart>) {
        if let Some((id, text, mut chunker)) = self.text.take() {
            if let Some(rest) = chunker.flush() {
                writer.write(UiChunk::text_delta(id.as_str(), rest));
            }
            writer.write(UiChunk::text_end(id));
            parts.push(MessagePart::text(text));
        }
    }

    fn close_reasoning(&mut self, writer: &UiStreamWriter, parts: &mut Vec<MessagePart>) {
        if let Some((id, text)) = self.reasoning.take() {
            writer.write(UiChunk::reasoning_end(id));
            parts.push(MessagePart::reasoning(text));
        }
    }
}
