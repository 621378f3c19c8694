//! Configuration loaded from environment variables.

use std::env;
use std::net::SocketAddr;

use agent_tools::tools::DEFAULT_WEATHER_URL;
use orchestrator::DEFAULT_MAX_MESSAGES_PER_DAY;

/// Default object storage bucket for uploads.
pub const DEFAULT_BUCKET: &str = "chatbot-files";

/// Session provider endpoint.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub url: String,
    pub api_key: Option<String>,
}

/// Object storage endpoint.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub url: Option<String>,
    pub api_key: Option<String>,
    pub bucket: String,
}

/// Chat gateway configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address.
    pub addr: SocketAddr,
    /// SQLite database URL.
    pub database_url: String,
    /// Redis URL; resumable streams are off without it.
    pub redis_url: Option<String>,
    /// Session provider; every caller is anonymous without it.
    pub auth: Option<AuthConfig>,
    /// Upload storage.
    pub storage: StorageConfig,
    /// Daily user message allowance for signed-in callers.
    pub max_messages_per_day: i64,
    /// Open-Meteo compatible weather endpoint.
    pub weather_url: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Description | Default |
    /// |----------|-------------|---------|
    /// | `CHAT_API_ADDR` | Server bind address | `127.0.0.1:3000` |
    /// | `DATABASE_URL` | SQLite database URL | `sqlite:chat.db?mode=rwc` |
    /// | `REDIS_URL` | Redis for resumable streams | (disabled) |
    /// | `AUTH_URL` | Session provider user endpoint | (anonymous) |
    /// | `AUTH_API_KEY` | Session provider API key | (none) |
    /// | `STORAGE_URL` | Object storage base URL | (uploads fail) |
    /// | `STORAGE_API_KEY` | Object storage key | (none) |
    /// | `STORAGE_BUCKET` | Upload bucket | `chatbot-files` |
    /// | `MAX_MESSAGES_PER_DAY` | Daily allowance | `100` |
    /// | `WEATHER_API_URL` | Weather endpoint | `https://api.open-meteo.com` |
    ///
    /// Model settings are read by `openai_brain::OpenAiConfig::from_env`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let addr = env::var("CHAT_API_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:3000".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidAddr)?;

        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:chat.db?mode=rwc".to_string());

        let auth = non_empty("AUTH_URL").map(|url| AuthConfig {
            url,
            api_key: non_empty("AUTH_API_KEY"),
        });

        let storage = StorageConfig {
            url: non_empty("STORAGE_URL"),
            api_key: non_empty("STORAGE_API_KEY"),
            bucket: non_empty("STORAGE_BUCKET").unwrap_or_else(|| DEFAULT_BUCKET.to_string()),
        };

        let max_messages_per_day = match non_empty("MAX_MESSAGES_PER_DAY") {
            Some(value) => value
                .parse()
                .map_err(|_| ConfigError::InvalidNumber("MAX_MESSAGES_PER_DAY"))?,
            None => DEFAULT_MAX_MESSAGES_PER_DAY,
        };

        Ok(Self {
            addr,
            database_url,
            redis_url: non_empty("REDIS_URL"),
            auth,
            storage,
            max_messages_per_day,
            weather_url: non_empty("WEATHER_API_URL")
                .unwrap_or_else(|| DEFAULT_WEATHER_URL.to_string()),
        })
    }
}

fn non_empty(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid CHAT_API_ADDR format")]
    InvalidAddr,

    #[error("{0} must be a number")]
    InvalidNumber(&'static str),
}
