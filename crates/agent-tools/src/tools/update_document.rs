//! Revises an existing document artifact.

use async_trait::async_trait;
use database::{Document, SqlitePool};
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::artifacts::ArtifactHandlers;
use crate::error::ToolError;
use crate::tool::{Tool, ToolArgs, ToolOutput};

/// Rewrites the latest revision of a document and stores the result as a new revision.
///
/// # Parameters
///
/// - `id` (required): Document id.
/// - `description` (required): The change to make.
pub struct UpdateDocument {
    pool: SqlitePool,
    handlers: ArtifactHandlers,
}

impl UpdateDocument {
    pub fn new(pool: SqlitePool, handlers: ArtifactHandlers) -> Self {
        Self { pool, handlers }
    }
}

#[async_trait]
impl Tool for UpdateDocument {
    fn name(&self) -> &str {
        "updateDocument"
    }

    fn description(&self) -> &str {
        "Update a document with the given description."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "id": {"type": "string", "description": "The ID of the document to update"},
                "description": {"type": "string", "description": "The description of changes that need to be made"}
            },
            "required": ["id", "description"],
            "additionalProperties": false
        })
    }

    async fn execute(&self, args: ToolArgs) -> Result<ToolOutput, ToolError> {
        let id = args.get_string("id")?;
        let description = args.get_string("description")?;
        let writer = &args.context.writer;

        let Some(document) = database::document::get_document_by_id(&self.pool, &id).await? else {
            warn!("updateDocument called for unknown document {}", id);
            return Ok(ToolOutput::failure("Document not found"));
        };

        debug!("Updating {} document {}", document.kind, id);
        writer.write_data("clear", Value::Null);

        let content = self
            .handlers
            .handler(document.kind)
            .on_update(&document, &description, writer)
            .await?;

        let revision = Document {
            id: document.id.clone(),
            created_at: database::now(),
            title: document.title.clone(),
            content: Some(content),
            kind: document.kind,
            user_id: args.context.user_id.clone(),
        };
        database::document::save_document(&self.pool, &revision).await?;

        writer.write_data("finish", Value::Null);

        Ok(ToolOutput::success(json!({
            "id": document.id,
            "title": document.title,
            "kind": document.kind,
            "content": "The document has been updated successfully.",
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_support::{args, database, drain};
    use chat_core::ArtifactKind;
    use chrono::Duration;
    use mock_brain::{ModelId, Script, ScriptedModel};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_update_missing_document() {
        let db = database().await;
        let tool = UpdateDocument::new(
            db.pool().clone(),
            ArtifactHandlers::new(Arc::new(ScriptedModel::new())),
        );

        let (args, mut rx) = args(json!({"id": "nope", "description": "shorter"}), None);
        let output = tool.execute(args).await.unwrap();
        assert!(!output.success);
        assert_eq!(output.content, json!({"error": "Document not found"}));
        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test]
    async fn test_update_adds_revision() {
        let db = database().await;
        let original = Document {
            id: "doc1".to_string(),
            created_at: database::now() - Duration::seconds(5),
            title: "Snippet".to_string(),
            content: Some("print(1)".to_string()),
            kind: ArtifactKind::Code,
            user_id: None,
        };
        database::document::save_document(db.pool(), &original).await.unwrap();

        let model = ScriptedModel::new().on(ModelId::ArtifactModel, Script::text("print(2)"));
        let tool = UpdateDocument::new(db.pool().clone(), ArtifactHandlers::new(Arc::new(model)));

        let (args, mut rx) = args(json!({"id": "doc1", "description": "print two"}), Some("u1"));
        let output = tool.execute(args).await.unwrap();
        assert!(output.success);
        assert_eq!(output.content["kind"], "code");
        assert_eq!(output.content["title"], "Snippet");

        let chunks = drain(&mut rx);
        assert_eq!(chunks.first().unwrap()["type"], "data-clear");
        assert_eq!(chunks.last().unwrap()["type"], "data-finish");

        let revisions = database::document::get_documents_by_id(db.pool(), "doc1")
            .await
            .unwrap();
        assert_eq!(revisions.len(), 2);
        assert_eq!(revisions[1].content.as_deref(), Some("print(2)"));
    }
}
