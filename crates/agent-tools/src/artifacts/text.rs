//! Text documents: markdown prose.

use std::sync::Arc;

use async_trait::async_trait;
use chat_core::{
    update_document_prompt, ArtifactKind, LanguageModel, ModelId, ModelRequest, UiStreamWriter,
    TEXT_PROMPT,
};
use database::Document;
use serde_json::Value;

use super::{stream_draft, DocumentHandler};
use crate::error::ToolError;

/// Streams each text delta as `data-textDelta`.
pub struct TextHandler {
    model: Arc<dyn LanguageModel>,
}

impl TextHandler {
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self { model }
    }

    async fn draft(&self, request: ModelRequest, writer: &UiStreamWriter) -> Result<String, ToolError> {
        stream_draft(self.model.as_ref(), request, |delta, _| {
            writer.write_data("textDelta", Value::String(delta.to_string()));
        })
        .await
    }
}

#[async_trait]
impl DocumentHandler for TextHandler {
    fn kind(&self) -> ArtifactKind {
        ArtifactKind::Text
    }

    async fn on_create(&self, title: &str, writer: &UiStreamWriter) -> Result<String, ToolError> {
        let request = ModelRequest::new(ModelId::ArtifactModel)
            .system(TEXT_PROMPT)
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
            .system(update_document_prompt(current, ArtifactKind::Text))
            .prompt(description);
        self.draft(request, writer).await
    }
}
