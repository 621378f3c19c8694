//! Delayed model implementation - wraps another model with artificial delay.

use std::time::Duration;

use async_trait::async_trait;
use chat_core::{LanguageModel, ModelError, ModelRequest, ModelStream};
use tokio::time::sleep;

/// A model that wraps another model and delays the start of every stream.
///
/// Useful for testing timeout handling and simulating provider latency.
pub struct DelayedModel<M: LanguageModel> {
    inner: M,
    delay: Duration,
}

impl<M: LanguageModel> DelayedModel<M> {
    /// Create a new DelayedModel wrapping the given model with the specified delay.
    pub fn new(inner: M, delay: Duration) -> Self {
        Self { inner, delay }
    }

    /// Create a model with a delay in milliseconds.
    pub fn with_millis(inner: M, millis: u64) -> Self {
        Self::new(inner, Duration::from_millis(millis))
    }
}

#[async_trait]
impl<M: LanguageModel> LanguageModel for DelayedModel<M> {
    async fn stream(&self, request: ModelRequest) -> Result<ModelStream, ModelError> {
        sleep(self.delay).await;
        self.inner.stream(request).await
    }

    fn name(&self) -> &str {
        "DelayedModel"
    }
}
