//! Run every tool in the registry against an in-memory database.
//!
//! Run with: cargo run -p agent-tools --example test_tools

use std::sync::Arc;

use agent_tools::{default_registry, GetWeather, ToolContext, ToolRegistry};
use chat_core::UiStreamWriter;
use database::Database;
use mock_brain::EchoModel;
use serde_json::{json, Value};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("agent_tools=debug".parse()?),
        )
        .init();

    println!("=== Agent Tools Test ===\n");

    let db = Database::connect("sqlite::memory:").await?;
    db.migrate().await?;
    let registry = default_registry(db.pool().clone(), Arc::new(EchoModel::new()), GetWeather::new());

    println!("Registered tools:");
    for definition in registry.definitions() {
        println!("  - {}: {}", definition.name, definition.description);
    }
    println!();

    let created = run(&registry, "createDocument", json!({"title": "Ode to Rust", "kind": "text"})).await?;
    let id = created["id"].as_str().unwrap_or_default().to_string();

    run(&registry, "updateDocument", json!({"id": id, "description": "Make it shorter"})).await?;
    run(&registry, "requestSuggestions", json!({"documentId": id})).await?;

    // Requires network
    run(&registry, "getWeather", json!({"latitude": 38.72, "longitude": -9.14})).await?;

    println!("=== Done ===");
    Ok(())
}

async fn run(registry: &ToolRegistry, name: &str, arguments: Value) -> Result<Value, Box<dyn std::error::Error>> {
    println!("--- {} ---", name);
    let (writer, mut rx) = UiStreamWriter::channel();

    let output = registry.execute(name, arguments, ToolContext::new(writer, None)).await;
    while let Ok(chunk) = rx.try_recv() {
        println!("  chunk: {}", chunk.to_json());
    }

    match output {
        Ok(output) => {
            println!("  success: {}", output.success);
            println!("  result: {}\n", output.content);
            Ok(output.content)
        }
        Err(e) => {
            println!("  error: {}\n", e);
            Ok(Value::Null)
        }
    }
}
