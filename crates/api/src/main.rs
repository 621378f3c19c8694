//! Chat gateway server.

use std::sync::Arc;

use agent_tools::{default_registry, GetWeather};
use api::auth::HttpSessionProvider;
use api::storage::HttpObjectStore;
use api::{AppState, Config};
use chat_core::LanguageModel;
use database::Database;
use openai_brain::OpenAiModel;
use orchestrator::{Orchestrator, RedisStreamContext, StreamContext};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let config = Config::from_env()?;
    info!(addr = %config.addr, "Starting chat gateway");

    // Connect to database
    let db = Database::connect(&config.database_url).await?;
    db.migrate().await?;

    // Model and tools
    let model: Arc<dyn LanguageModel> = Arc::new(OpenAiModel::from_env()?);
    let tools = default_registry(
        db.pool().clone(),
        model.clone(),
        GetWeather::with_base_url(config.weather_url.as_str()),
    );
    let orchestrator = Orchestrator::new(db.pool().clone(), model, tools)
        .with_max_messages_per_day(config.max_messages_per_day);

    // Build application state
    let mut state = AppState::new(db, orchestrator);

    match &config.redis_url {
        Some(url) => {
            let context: Arc<dyn StreamContext> = Arc::new(RedisStreamContext::connect(url).await?);
            state = state.with_stream_context(context);
        }
        None => info!("Resumable streams are disabled due to missing REDIS_URL"),
    }

    if let Some(auth) = &config.auth {
        state = state.with_sessions(Arc::new(HttpSessionProvider::new(
            auth.url.as_str(),
            auth.api_key.clone(),
        )));
    }

    if let Some(url) = &config.storage.url {
        state = state.with_storage(Arc::new(HttpObjectStore::new(
            url,
            config.storage.api_key.clone(),
            config.storage.bucket.as_str(),
        )));
    }

    let app = api::app(state);

    // Start server
    info!(addr = %config.addr, "Chat gateway listening");
    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
