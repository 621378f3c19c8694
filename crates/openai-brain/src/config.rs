//! Configuration for the OpenAI-compatible provider.

use chat_core::{ModelError, ModelId};
use std::env;

/// Provider model names for each logical model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelNames {
    pub chat: String,
    pub reasoning: String,
    pub title: String,
    pub artifact: String,
}

impl Default for ModelNames {
    fn default() -> Self {
        Self {
            chat: "gpt-4o-mini".to_string(),
            reasoning: "o4-mini".to_string(),
            title: "gpt-4o-mini".to_string(),
            artifact: "gpt-4o-mini".to_string(),
        }
    }
}

/// Configuration for [`crate::OpenAiModel`].
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    /// API base URL, without the `/v1` suffix.
    pub api_url: String,

    /// API key for authentication.
    pub api_key: String,

    /// Provider model names.
    pub models: ModelNames,

    /// Maximum tokens for a response.
    pub max_tokens: Option<u32>,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.openai.com".to_string(),
            api_key: String::new(),
            models: ModelNames::default(),
            max_tokens: None,
        }
    }
}

impl OpenAiConfig {
    /// Create configuration from environment variables.
    ///
    /// Required environment variables:
    /// - `MODEL_API_KEY` - API key for authentication
    ///
    /// Optional environment variables:
    /// - `MODEL_API_URL` - API URL (default: https://api.openai.com)
    /// - `CHAT_MODEL` - model behind `chat-model` (default: gpt-4o-mini)
    /// - `REASONING_MODEL` - model behind `chat-model-reasoning` (default: o4-mini)
    /// - `TITLE_MODEL` - model behind `title-model` (default: gpt-4o-mini)
    /// - `ARTIFACT_MODEL` - model behind `artifact-model` (default: gpt-4o-mini)
    /// - `MODEL_MAX_TOKENS` - max tokens per response (default: provider default)
    pub fn from_env() -> Result<Self, ModelError> {
        let api_key = env::var("MODEL_API_KEY")
            .map_err(|_| ModelError::Configuration("MODEL_API_KEY not set".to_string()))?;

        let defaults = ModelNames::default();
        let api_url =
            env::var("MODEL_API_URL").unwrap_or_else(|_| "https://api.openai.com".to_string());

        let models = ModelNames {
            chat: env::var("CHAT_MODEL").unwrap_or(defaults.chat),
            reasoning: env::var("REASONING_MODEL").unwrap_or(defaults.reasoning),
            title: env::var("TITLE_MODEL").unwrap_or(defaults.title),
            artifact: env::var("ARTIFACT_MODEL").unwrap_or(defaults.artifact),
        };

        let max_tokens = env::var("MODEL_MAX_TOKENS")
            .ok()
            .and_then(|v| v.parse().ok());

        Ok(Self {
            api_url,
            api_key,
            models,
            max_tokens,
        })
    }

    /// Create a new config builder.
    pub fn builder() -> OpenAiConfigBuilder {
        OpenAiConfigBuilder::default()
    }

    /// Provider model name for a logical model.
    pub fn model_name(&self, model: ModelId) -> &str {
        match model {
            ModelId::ChatModel => &self.models.chat,
            ModelId::ChatModelReasoning => &self.models.reasoning,
            ModelId::TitleModel => &self.models.title,
            ModelId::ArtifactModel => &self.models.artifact,
        }
    }

    pub(crate) fn completions_url(&self) -> String {
        format!("{}/v1/chat/completions", self.api_url.trim_end_matches('/'))
    }
}

/// Builder for OpenAiConfig.
#[derive(Debug, Default)]
pub struct OpenAiConfigBuilder {
    config: OpenAiConfig,
}

impl OpenAiConfigBuilder {
    /// Set the API key.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = key.into();
        self
    }

    /// Set the API URL.
    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.config.api_url = url.into();
        self
    }

    /// Set the provider model for a logical model.
    pub fn model(mut self, model: ModelId, name: impl Into<String>) -> Self {
        let name = name.into();
        match model {
            ModelId::ChatModel => self.config.models.chat = name,
            ModelId::ChatModelReasoning => self.config.models.reasoning = name,
            ModelId::TitleModel => self.config.models.title = name,
            ModelId::ArtifactModel => self.config.models.artifact = name,
        }
        self
    }

    /// Set the max tokens.
    pub fn max_tokens(mut self, tokens: u32) -> Self {
        self.config.max_tokens = Some(tokens);
        self
    }

    /// Build the configuration.
    pub fn build(self) -> OpenAiConfig {
        self.config
    }
}
