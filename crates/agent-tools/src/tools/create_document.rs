//! Creates a new document artifact.

use async_trait::async_trait;
use chat_core::ArtifactKind;
use database::{Document, SqlitePool};
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

use crate::artifacts::ArtifactHandlers;
use crate::error::ToolError;
use crate::tool::{Tool, ToolArgs, ToolOutput};

/// Drafts a document with the handler for its kind and stores the first revision.
///
/// The client sees `data-kind`, `data-id`, `data-title` and `data-clear`,
/// then the handler's deltas, then `data-finish`.
///
/// # Parameters
///
/// - `title` (required): Document title, also the drafting prompt.
/// - `kind` (required): One of `text`, `code`, `sheet`.
pub struct CreateDocument {
    pool: SqlitePool,
    handlers: ArtifactHandlers,
}

impl CreateDocument {
    pub fn new(pool: SqlitePool, handlers: ArtifactHandlers) -> Self {
        Self { pool, handlers }
    }
}

#[async_trait]
impl Tool for CreateDocument {
    fn name(&self) -> &str {
        "createDocument"
    }

    fn description(&self) -> &str {
        "Create a document for a writing or content creation activities. This tool will call other functions that will generate the contents of the document based on the title and kind."
    }

    fn parameters(&self) -> Value {
        let kinds: Vec<&str> = ArtifactKind::ALL.iter().map(|k| k.as_str()).collect();
        json!({
            "type": "object",
            "properties": {
                "title": {"type": "string"},
                "kind": {"type": "string", "enum": kinds}
            },
            "required": ["title", "kind"],
            "additionalProperties": false
        })
    }

    async fn execute(&self, args: ToolArgs) -> Result<ToolOutput, ToolError> {
        let title = args.get_string("title")?;
        let kind = args.get_kind("kind")?;
        let id = Uuid::new_v4().to_string();
        let writer = &args.context.writer;

        debug!("Creating {} document {}", kind, id);

        writer.write_data("kind", json!(kind));
        writer.write_data("id", json!(id));
        writer.write_data("title", json!(title));
        writer.write_data("clear", Value::Null);

        let content = self.handlers.handler(kind).on_create(&title, writer).await?;

        let document = Document {
            id: id.clone(),
            created_at: database::now(),
            title: title.clone(),
            content: Some(content),
            kind,
            user_id: args.context.user_id.clone(),
        };
        database::document::save_document(&self.pool, &document).await?;

        writer.write_data("finish", Value::Null);

        Ok(ToolOutput::success(json!({
            "id": id,
            "title": title,
            "kind": kind,
            "content": "A document was created and is now visible to the user.",
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_support::{args, database, drain};
    use mock_brain::{ModelId, Script, ScriptedModel};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_create_document_streams_and_saves() {
        let db = database().await;
        let model = ScriptedModel::new().on(ModelId::ArtifactModel, Script::text("Hello world"));
        let tool = CreateDocument::new(db.pool().clone(), ArtifactHandlers::new(Arc::new(model)));

        let (args, mut rx) = args(json!({"title": "Greeting", "kind": "text"}), Some("u1"));
        let output = tool.execute(args).await.unwrap();
        assert!(output.success);

        let id = output.content["id"].as_str().unwrap().to_string();
        assert_eq!(output.content["kind"], "text");
        assert_eq!(
            output.content["content"],
            "A document was created and is now visible to the user."
        );

        let chunks = drain(&mut rx);
        let types: Vec<&str> = chunks.iter().map(|c| c["type"].as_str().unwrap()).collect();
        assert_eq!(
            types,
            vec![
                "data-kind",
                "data-id",
                "data-title",
                "data-clear",
                "data-textDelta",
                "data-textDelta",
                "data-finish"
            ]
        );
        assert_eq!(chunks[1]["data"], json!(id));

        let stored = database::document::get_document_by_id(db.pool(), &id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.content.as_deref(), Some("Hello world"));
        assert_eq!(stored.user_id.as_deref(), Some("u1"));
    }

    #[tokio::test]
    async fn test_create_document_rejects_unknown_kind() {
        let db = database().await;
        let tool = CreateDocument::new(
            db.pool().clone(),
            ArtifactHandlers::new(Arc::new(ScriptedModel::new())),
        );

        let (args, _rx) = args(json!({"title": "Picture", "kind": "image"}), None);
        let result = tool.execute(args).await;
        assert!(matches!(result, Err(ToolError::InvalidParameter { .. })));
    }
}
