//! Proposes edits for a stored document.

use std::sync::Arc;

use async_trait::async_trait;
use chat_core::{JsonLinesParser, LanguageModel, ModelEvent, ModelId, ModelRequest, SUGGESTIONS_PROMPT};
use database::{Document, SqlitePool, Suggestion};
use futures::StreamExt;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::ToolError;
use crate::tool::{Tool, ToolArgs, ToolContext, ToolOutput};

/// Upper bound on suggestions per request.
const MAX_SUGGESTIONS: usize = 5;

/// One element of the model's suggestion array.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SuggestionElement {
    original_sentence: String,
    suggested_sentence: String,
    #[serde(default)]
    description: Option<String>,
}

/// Asks the artifact model for suggestions on a document.
///
/// Each suggestion is streamed as `data-suggestion` and stored as soon as it
/// is parsed, so a failure halfway keeps the ones already delivered.
///
/// # Parameters
///
/// - `documentId` (required): The document to review.
pub struct RequestSuggestions {
    pool: SqlitePool,
    model: Arc<dyn LanguageModel>,
}

impl RequestSuggestions {
    pub fn new(pool: SqlitePool, model: Arc<dyn LanguageModel>) -> Self {
        Self { pool, model }
    }

    async fn accept(
        &self,
        element: SuggestionElement,
        document: &Document,
        context: &ToolContext,
    ) -> Result<(), ToolError> {
        let suggestion = Suggestion {
            id: Uuid::new_v4().to_string(),
            document_id: document.id.clone(),
            document_created_at: document.created_at,
            original_text: element.original_sentence,
            suggested_text: element.suggested_sentence,
            description: element.description,
            is_resolved: false,
            user_id: context.user_id.clone(),
            created_at: database::now(),
        };

        context
            .writer
            .write_data("suggestion", serde_json::to_value(&suggestion)?);
        database::suggestion::save_suggestions(&self.pool, std::slice::from_ref(&suggestion)).await?;
        Ok(())
    }
}

#[async_trait]
impl Tool for RequestSuggestions {
    fn name(&self) -> &str {
        "requestSuggestions"
    }

    fn description(&self) -> &str {
        "Request suggestions for a document"
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "documentId": {"type": "string", "description": "The ID of the document to request edits"}
            },
            "required": ["documentId"],
            "additionalProperties": false
        })
    }

    async fn execute(&self, args: ToolArgs) -> Result<ToolOutput, ToolError> {
        let document_id = args.get_string("documentId")?;

        let document = database::document::get_document_by_id(&self.pool, &document_id).await?;
        let Some((document, content)) =
            document.and_then(|d| d.content.clone().map(|content| (d, content)))
        else {
            warn!("requestSuggestions called for missing document {}", document_id);
            return Ok(ToolOutput::failure("Document not found"));
        };

        let request = ModelRequest::new(ModelId::ArtifactModel)
            .system(SUGGESTIONS_PROMPT)
            .prompt(content);
        let mut stream = self.model.stream(request).await?;
        let mut parser = JsonLinesParser::<SuggestionElement>::new();
        let mut accepted = 0;

        'outer: while let Some(event) = stream.next().await {
            let ModelEvent::TextDelta(delta) = event? else {
                continue;
            };
            for element in parser.push(&delta) {
                if accepted == MAX_SUGGESTIONS {
                    break 'outer;
                }
                match element {
                    Ok(element) => {
                        self.accept(element, &document, &args.context).await?;
                        accepted += 1;
                    }
                    Err(e) => warn!("Skipping malformed suggestion: {}", e),
                }
            }
        }

        if accepted < MAX_SUGGESTIONS {
            match parser.finish() {
                Some(Ok(element)) => {
                    self.accept(element, &document, &args.context).await?;
                    accepted += 1;
                }
                Some(Err(e)) => warn!("Skipping malformed suggestion: {}", e),
                None => {}
            }
        }

        debug!("Stored {} suggestions for document {}", accepted, document.id);

        Ok(ToolOutput::success(json!({
            "id": document.id,
            "title": document.title,
            "kind": document.kind,
            "message": "Suggestions have been added to the document",
        })))
    }
}
