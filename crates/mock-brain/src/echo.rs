//! Echo model implementation - streams the last user message back.

use async_trait::async_trait;
use chat_core::{
    FinishReason, LanguageModel, ModelError, ModelEvent, ModelMessage, ModelRequest, ModelStream,
    UserContent,
};
use futures::stream::{self, StreamExt};

/// A model that answers with the text of the last user message.
///
/// Useful for testing the message flow without any provider.
#[derive(Debug, Clone, Default)]
pub struct EchoModel {
    /// Optional prefix to add before the echo.
    prefix: Option<String>,
}

impl EchoModel {
    /// Create a new EchoModel with no prefix.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new EchoModel with a custom prefix.
    ///
    /// # Example
    ///
    /// ```rust
    /// use mock_brain::EchoModel;
    ///
    /// let model = EchoModel::with_prefix("Echo: ");
    /// // Will respond with "Echo: <last user text>"
    /// ```
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: Some(prefix.into()),
        }
    }
}

fn last_user_text(request: &ModelRequest) -> String {
    request
        .messages
        .iter()
        .rev()
        .find_map(|message| match message {
            ModelMessage::User(content) => Some(
                content
                    .iter()
                    .filter_map(|part| match part {
                        UserContent::Text(text) => Some(text.as_str()),
                        UserContent::Image { .. } => None,
                    })
                    .collect::<Vec<_>>()
                    .join(" "),
            ),
            _ => None,
        })
        .unwrap_or_default()
}

/// Split text into word-sized deltas, keeping the whitespace.
pub(crate) fn word_deltas(text: &str) -> Vec<ModelEvent> {
    text.split_inclusive(' ')
        .map(|word| ModelEvent::TextDelta(word.to_string()))
        .collect()
}

#[async_trait]
impl LanguageModel for EchoModel {
    async fn stream(&self, request: ModelRequest) -> Result<ModelStream, ModelError> {
        let text = match &self.prefix {
            Some(prefix) => format!("{}{}", prefix, last_user_text(&request)),
            None => last_user_text(&request),
        };

        let mut events = word_deltas(&text);
        events.push(ModelEvent::Finish(FinishReason::Stop));
        Ok(stream::iter(events.into_iter().map(Ok)).boxed())
    }

    fn name(&self) -> &str {
        "EchoModel"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chat_core::ModelId;

    #[tokio::test]
    async fn test_echo_no_prefix() {
        let model = EchoModel::new();
        let request = ModelRequest::new(ModelId::ChatModel).prompt("Hello there!");

        let text = model.generate_text(request).await.unwrap();
        assert_eq!(text, "Hello there!");
    }

    #[tokio::test]
    async fn test_echo_with_prefix() {
        let model = EchoModel::with_prefix("Echo: ");
        let request = ModelRequest::new(ModelId::ChatModel).prompt("Hello!");

        let text = model.generate_text(request).await.unwrap();
        assert_eq!(text, "Echo: Hello!");
    }

    #[tokio::test]
    async fn test_echo_streams_words() {
        let model = EchoModel::new();
        let request = ModelRequest::new(ModelId::ChatModel).prompt("one two");

        let events: Vec<_> = model
            .stream(request)
            .await
            .unwrap()
            .map(|event| event.unwrap())
            .collect()
            .await;
        assert_eq!(
            events,
            vec![
                ModelEvent::TextDelta("one ".to_string()),
                ModelEvent::TextDelta("two".to_string()),
                ModelEvent::Finish(FinishReason::Stop),
            ]
        );
    }

    #[test]
    fn test_model_name() {
        assert_eq!(EchoModel::new().name(), "EchoModel");
    }
}
