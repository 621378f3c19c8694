//! Scripted model implementation - replays prepared responses.

use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use chat_core::{
    FinishReason, LanguageModel, ModelError, ModelEvent, ModelId, ModelRequest, ModelStream,
    ToolCall,
};
use futures::stream::{self, StreamExt};
use serde_json::Value;
use tokio::sync::Mutex;

use crate::echo::word_deltas;

/// One prepared response.
#[derive(Debug, Clone)]
pub enum Script {
    /// The stream yields these items in order.
    Events(Vec<Result<ModelEvent, ModelError>>),
    /// Starting the stream fails.
    Fail(ModelError),
}

impl Script {
    /// A plain text answer, streamed word by word.
    pub fn text(text: &str) -> Self {
        let mut events = word_deltas(text);
        events.push(ModelEvent::Finish(FinishReason::Stop));
        Script::Events(events.into_iter().map(Ok).collect())
    }

    /// A single tool call.
    pub fn tool_call(id: &str, name: &str, arguments: Value) -> Self {
        Script::Events(vec![
            Ok(ModelEvent::ToolCall(ToolCall {
                id: id.to_string(),
                name: name.to_string(),
                arguments,
            })),
            Ok(ModelEvent::Finish(FinishReason::ToolCalls)),
        ])
    }

    /// Text followed by a mid-stream error.
    pub fn text_then_error(text: &str, error: ModelError) -> Self {
        let mut events: Vec<_> = word_deltas(text).into_iter().map(Ok).collect();
        events.push(Err(error));
        Script::Events(events)
    }
}

/// A model that replays scripts queued per logical model.
///
/// Each call pops the next script for the requested model. A model with no
/// script left answers with an empty stream. Every request is recorded so
/// tests can inspect what was sent.
#[derive(Debug, Default)]
pub struct ScriptedModel {
    scripts: Mutex<HashMap<ModelId, VecDeque<Script>>>,
    requests: Mutex<Vec<ModelRequest>>,
}

impl ScriptedModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a script for a model.
    pub fn on(mut self, model: ModelId, script: Script) -> Self {
        self.scripts
            .get_mut()
            .entry(model)
            .or_default()
            .push_back(script);
        self
    }

    /// Queue a script for a model on a shared instance.
    pub async fn push(&self, model: ModelId, script: Script) {
        self.scripts
            .lock()
            .await
            .entry(model)
            .or_default()
            .push_back(script);
    }

    /// Requests received so far.
    pub async fn requests(&self) -> Vec<ModelRequest> {
        self.requests.lock().await.clone()
    }

    /// Requests received so far for one model.
    pub async fn requests_for(&self, model: ModelId) -> Vec<ModelRequest> {
        self.requests
            .lock()
            .await
            .iter()
            .filter(|request| request.model == model)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn stream(&self, request: ModelRequest) -> Result<ModelStream, ModelError> {
        let model = request.model;
        self.requests.lock().await.push(request);

        let script = self
            .scripts
            .lock()
            .await
            .get_mut(&model)
            .and_then(VecDeque::pop_front);

        match script {
            Some(Script::Events(events)) => Ok(stream::iter(events).boxed()),
            Some(Script::Fail(error)) => Err(error),
            None => Ok(stream::iter(vec![Ok(ModelEvent::Finish(FinishReason::Stop))]).boxed()),
        }
    }

    fn name(&self) -> &str {
        "ScriptedModel"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_scripts_pop_in_order_per_model() {
        let model = ScriptedModel::new()
            .on(ModelId::ChatModel, Script::text("first"))
            .on(ModelId::ChatModel, Script::text("second"))
            .on(ModelId::TitleModel, Script::text("A title"));

        let chat = |prompt: &str| ModelRequest::new(ModelId::ChatModel).prompt(prompt);

        assert_eq!(model.generate_text(chat("a")).await.unwrap(), "first");
        assert_eq!(
            model
                .generate_text(ModelRequest::new(ModelId::TitleModel))
                .await
                .unwrap(),
            "A title"
        );
        assert_eq!(model.generate_text(chat("b")).await.unwrap(), "second");
        assert_eq!(model.generate_text(chat("c")).await.unwrap(), "");

        assert_eq!(model.requests().await.len(), 4);
        assert_eq!(model.requests_for(ModelId::ChatModel).await.len(), 3);
    }

    #[tokio::test]
    async fn test_tool_call_script() {
        let model = ScriptedModel::new().on(
            ModelId::ChatModel,
            Script::tool_call("call-1", "getWeather", json!({"latitude": 1})),
        );

        let events: Vec<_> = model
            .stream(ModelRequest::new(ModelId::ChatModel))
            .await
            .unwrap()
            .collect()
            .await;
        assert_eq!(events.len(), 2);
        assert!(matches!(&events[0], Ok(ModelEvent::ToolCall(call)) if call.name == "getWeather"));
    }

    #[tokio::test]
    async fn test_failing_script() {
        let model = ScriptedModel::new().on(
            ModelId::ChatModel,
            Script::Fail(ModelError::Network("offline".to_string())),
        );

        let result = model.stream(ModelRequest::new(ModelId::ChatModel)).await;
        assert!(matches!(result, Err(ModelError::Network(_))));
    }

    #[tokio::test]
    async fn test_shared_push() {
        let model = ScriptedModel::new();
        model.push(ModelId::ArtifactModel, Script::text("body")).await;

        let text = model
            .generate_text(ModelRequest::new(ModelId::ArtifactModel))
            .await
            .unwrap();
        assert_eq!(text, "body");
    }
}
