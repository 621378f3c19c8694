//! OpenAiModel implementation over the streaming chat completions API.

use std::collections::{BTreeMap, VecDeque};

use chat_core::{
    async_trait, FinishReason, LanguageModel, ModelError, ModelEvent, ModelRequest, ModelStream,
    ToolCall,
};
use futures::stream::{self, StreamExt};
use reqwest::Client;
use reqwest_eventsource::retry::Never;
use reqwest_eventsource::{Event, EventSource, RequestBuilderExt};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::api_types::{
    to_chat_messages, ApiError, ChatCompletionChunk, ChatCompletionRequest, FunctionTool,
};
use crate::config::OpenAiConfig;

/// A language model backed by an OpenAI-compatible chat completions endpoint.
pub struct OpenAiModel {
    client: Client,
    config: OpenAiConfig,
}

impl OpenAiModel {
    /// Create a new model client with the given configuration.
    pub fn new(config: OpenAiConfig) -> Result<Self, ModelError> {
        let client = Client::builder().build().map_err(|e| {
            ModelError::Configuration(format!("Failed to create HTTP client: {}", e))
        })?;

        info!(
            "OpenAiModel initialized with chat model: {}, reasoning model: {}",
            config.models.chat, config.models.reasoning
        );

        Ok(Self { client, config })
    }

    /// Create a model client from environment variables.
    ///
    /// See [`OpenAiConfig::from_env`] for required environment variables.
    pub fn from_env() -> Result<Self, ModelError> {
        Self::new(OpenAiConfig::from_env()?)
    }

    /// Get the configuration.
    pub fn config(&self) -> &OpenAiConfig {
        &self.config
    }

    fn build_request(&self, request: &ModelRequest) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.config.model_name(request.model).to_string(),
            messages: to_chat_messages(request.system.as_deref(), &request.messages),
            stream: true,
            max_tokens: self.config.max_tokens,
            temperature: request.temperature,
            tools: request.tools.iter().map(FunctionTool::from).collect(),
        }
    }
}

#[async_trait]
impl LanguageModel for OpenAiModel {
    async fn stream(&self, request: ModelRequest) -> Result<ModelStream, ModelError> {
        let body = self.build_request(&request);
        debug!(
            model = %body.model,
            messages = body.messages.len(),
            tools = body.tools.len(),
            "Sending streaming completion request"
        );

        let mut source = self
            .client
            .post(self.config.completions_url())
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .eventsource()
            .map_err(|e| ModelError::Configuration(format!("Failed to build request: {}", e)))?;
        // A completion cannot be resumed; retrying would repeat the request.
        source.set_retry_policy(Box::new(Never));

        let state = StreamState {
            source,
            decoder: StreamDecoder::default(),
            pending: VecDeque::new(),
            done: false,
        };

        Ok(stream::unfold(state, next_event).boxed())
    }

    fn name(&self) -> &str {
        "OpenAiModel"
    }
}

struct StreamState {
    source: EventSource,
    decoder: StreamDecoder,
    pending: VecDeque<Result<ModelEvent, ModelError>>,
    done: bool,
}

async fn next_event(
    mut state: StreamState,
) -> Option<(Result<ModelEvent, ModelError>, StreamState)> {
    loop {
        if let Some(item) = state.pending.pop_front() {
            return Some((item, state));
        }
        if state.done {
            return None;
        }

        match state.source.next().await {
            Some(Ok(Event::Open)) => {
                debug!("Completion stream opened");
            }
            Some(Ok(Event::Message(message))) => {
                if message.data.trim() == "[DONE]" {
                    state.finish();
                    continue;
                }
                match state.decoder.decode(&message.data) {
                    Ok(events) => state.pending.extend(events.into_iter().map(Ok)),
                    Err(e) => {
                        state.pending.push_back(Err(e));
                        state.done = true;
                        state.source.close();
                    }
                }
            }
            Some(Err(reqwest_eventsource::Error::StreamEnded)) | None => state.finish(),
            Some(Err(reqwest_eventsource::Error::InvalidStatusCode(status, response))) => {
                let body = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<ApiError>(&body)
                    .map(|api_error| api_error.error.message)
                    .unwrap_or(body);
                warn!("Provider returned {}: {}", status, message);
                state.pending.push_back(Err(ModelError::Provider {
                    status: status.as_u16(),
                    message,
                }));
                state.done = true;
                state.source.close();
            }
            Some(Err(e)) => {
                warn!("Completion stream failed: {}", e);
                state.pending.push_back(Err(ModelError::Stream(e.to_string())));
                state.done = true;
                state.source.close();
            }
        }
    }
}

impl StreamState {
    fn finish(&mut self) {
        self.pending
            .extend(self.decoder.finish().into_iter().map(Ok));
        self.done = true;
        self.source.close();
    }
}

#[derive(Debug, Default)]
struct PartialToolCall {
    id: String,
    name: String,
    arguments: String,
}

/// Turns raw chunk payloads into model events.
///
/// Tool call fragments are collected by index and released as whole calls
/// when the choice reports a finish reason.
#[derive(Debug, Default)]
pub(crate) struct StreamDecoder {
    calls: BTreeMap<u32, PartialToolCall>,
    finished: bool,
}

impl StreamDecoder {
    pub(crate) fn decode(&mut self, data: &str) -> Result<Vec<ModelEvent>, ModelError> {
        let chunk: ChatCompletionChunk = serde_json::from_str(data)
            .map_err(|e| ModelError::Stream(format!("Failed to parse chunk: {}", e)))?;

        let mut events = Vec::new();
        for choice in chunk.choices {
            if let Some(reasoning) = choice.delta.reasoning_content.filter(|r| !r.is_empty()) {
                events.push(ModelEvent::ReasoningDelta(reasoning));
            }
            if let Some(content) = choice.delta.content.filter(|c| !c.is_empty()) {
                events.push(ModelEvent::TextDelta(content));
            }
            for fragment in choice.delta.tool_calls.unwrap_or_default() {
                let call = self.calls.entry(fragment.index).or_default();
                if let Some(id) = fragment.id {
                    call.id = id;
                }
                if let Some(function) = fragment.function {
                    if let Some(name) = function.name {
                        call.name.push_str(&name);
                    }
                    if let Some(arguments) = function.arguments {
                        call.arguments.push_str(&arguments);
                    }
                }
            }
            if let Some(reason) = choice.finish_reason {
                events.extend(self.release_calls());
                events.push(ModelEvent::Finish(FinishReason::from_provider(&reason)));
                self.finished = true;
            }
        }

        Ok(events)
    }

    /// Events still owed when the transport ends.
    pub(crate) fn finish(&mut self) -> Vec<ModelEvent> {
        if self.finished {
            return Vec::new();
        }
        self.finished = true;

        let mut events = self.release_calls();
        let reason = if events.is_empty() {
            FinishReason::Stop
        } else {
            FinishReason::ToolCalls
        };
        events.push(ModelEvent::Finish(reason));
        events
    }

    fn release_calls(&mut self) -> Vec<ModelEvent> {
        std::mem::take(&mut self.calls)
            .into_values()
            .map(|call| {
                let arguments = if call.arguments.trim().is_empty() {
                    Value::Object(Default::default())
                } else {
                    serde_json::from_str(&call.arguments).unwrap_or_else(|e| {
                        warn!("Tool call {} has malformed arguments: {}", call.name, e);
                        Value::String(call.arguments.clone())
                    })
                };
                ModelEvent::ToolCall(ToolCall {
                    id: call.id,
                    name: call.name,
                    arguments,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chat_core::{ModelId, ToolDefinition};
    use serde_json::json;

    #[test]
    fn test_model_name() {
        let model = OpenAiModel::new(OpenAiConfig::default()).unwrap();
        assert_eq!(model.name(), "OpenAiModel");
    }

    #[test]
    fn test_build_request_maps_model_and_tools() {
        let config = OpenAiConfig::builder()
            .api_key("k")
            .model(ModelId::ChatModel, "gpt-test")
            .build();
        let model = OpenAiModel::new(config).unwrap();

        let request = ModelRequest::new(ModelId::ChatModel)
            .system("sys")
            .prompt("hello")
            .tools(vec![ToolDefinition {
                name: "getWeather".to_string(),
                description: "weather".to_string(),
                parameters: json!({"type": "object"}),
            }]);

        let body = serde_json::to_value(model.build_request(&request)).unwrap();
        assert_eq!(body["model"], "gpt-test");
        assert_eq!(body["stream"], true);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["tools"][0]["function"]["name"], "getWeather");
    }

    #[test]
    fn test_decoder_text_and_finish() {
        let mut decoder = StreamDecoder::default();

        let events = decoder
            .decode(r#"{"choices":[{"index":0,"delta":{"role":"assistant","content":"Hel"},"finish_reason":null}]}"#)
            .unwrap();
        assert_eq!(events, vec![ModelEvent::TextDelta("Hel".to_string())]);

        let events = decoder
            .decode(r#"{"choices":[{"index":0,"delta":{"content":"lo"},"finish_reason":"stop"}]}"#)
            .unwrap();
        assert_eq!(
            events,
            vec![
                ModelEvent::TextDelta("lo".to_string()),
                ModelEvent::Finish(FinishReason::Stop)
            ]
        );

        assert!(decoder.finish().is_empty());
    }

    #[test]
    fn test_decoder_assembles_tool_calls() {
        let mut decoder = StreamDecoder::default();
        let chunks = [
            r#"{"choices":[{"index":0,"delta":{"tool_calls":[{"index":0,"id":"call_a","function":{"name":"getWeather","arguments":""}}]},"finish_reason":null}]}"#,
            r#"{"choices":[{"index":0,"delta":{"tool_calls":[{"index":0,"function":{"arguments":"{\"latitude\":"}}]},"finish_reason":null}]}"#,
            r#"{"choices":[{"index":0,"delta":{"tool_calls":[{"index":0,"function":{"arguments":"52.5}"}}]},"finish_reason":null}]}"#,
            r#"{"choices":[{"index":0,"delta":{},"finish_reason":"tool_calls"}]}"#,
        ];

        let mut events = Vec::new();
        for chunk in chunks {
            events.extend(decoder.decode(chunk).unwrap());
        }

        assert_eq!(
            events,
            vec![
                ModelEvent::ToolCall(ToolCall {
                    id: "call_a".to_string(),
                    name: "getWeather".to_string(),
                    arguments: json!({"latitude": 52.5}),
                }),
                ModelEvent::Finish(FinishReason::ToolCalls),
            ]
        );
    }

    #[test]
    fn test_decoder_finish_without_reason() {
        let mut decoder = StreamDecoder::default();
        decoder
            .decode(r#"{"choices":[{"index":0,"delta":{"reasoning_content":"hmm"}}]}"#)
            .unwrap();

        assert_eq!(decoder.finish(), vec![ModelEvent::Finish(FinishReason::Stop)]);
    }

    #[test]
    fn test_decoder_rejects_garbage() {
        let mut decoder = StreamDecoder::default();
        assert!(matches!(
            decoder.decode("not json"),
            Err(ModelError::Stream(_))
        ));
    }

    #[tokio::test]
    #[ignore] // Requires MODEL_API_KEY and network access
    async fn test_live_completion() {
        dotenvy::dotenv().ok();
        let model = OpenAiModel::from_env().unwrap();
        let text = model
            .generate_text(ModelRequest::new(ModelId::TitleModel).prompt("Say hi"))
            .await
            .unwrap();
        assert!(!text.is_empty());
    }
}
