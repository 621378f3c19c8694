//! Sheet documents: CSV spreadsheets.

use std::sync::Arc;

use async_trait::async_trait;
use chat_core::{
    update_document_prompt, ArtifactKind, LanguageModel, ModelId, ModelRequest, UiStreamWriter,
    SHEET_PROMPT,
};
use database::Document;
use serde_json::Value;

use super::{stream_draft, DocumentHandler};
use crate::error::ToolError;

/// Streams the whole CSV so far as `data-sheetDelta`.
pub struct SheetHandler {
    model: Arc<dyn LanguageModel>,
}

impl SheetHandler {
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self { model }
    }

    async fn draft(&self, request: ModelRequest, writer: &UiStreamWriter) -> Result<String, ToolError> {
        stream_draft(self.model.as_ref(), request, |_, draft| {
            writer.write_data("sheetDelta", Value::String(draft.to_string()));
        })
        .await
    }
}

#[async_trait]
impl DocumentHandler for SheetHandler {
    fn kind(&self) -> ArtifactKind {
        ArtifactKind::Sheet
    }

    async fn on_create(&self, title: &str, writer: &UiStreamWriter) -> Result<String, ToolError> {
        let request = ModelRequest::new(ModelId::ArtifactModel)
            .system(SHEET_PROMPT)
            .prompt(title);
        self.draft(request, writer).await
    }

    async fn on_update(
        &self,
        document: &Document,
        description: &str,
        writer: &UiStreamWriter,
    ) -> Result<String, ToolError> {
        let current = document.content.as_deref().unwrap_or_default();
        let request = ModelRequest::new(ModelId::ArtifactModel)
            .system(update_document_prompt(current, ArtifactKind::Sheet))
            .prompt(description);
        self.draft(request, writer).await
    }
}
