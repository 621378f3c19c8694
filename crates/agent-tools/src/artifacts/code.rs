//! Code documents: a single runnable snippet.

use std::sync::Arc;

use async_trait::async_trait;
use chat_core::{
    update_document_prompt, ArtifactKind, LanguageModel, ModelId, ModelRequest, UiStreamWriter,
    CODE_PROMPT,
};
use database::Document;
use serde_json::Value;

use super::{stream_draft, DocumentHandler};
use crate::error::ToolError;

/// Streams the whole draft so far as `data-codeDelta`.
pub struct CodeHandler {
    model: Arc<dyn LanguageModel>,
}

impl CodeHandler {
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self { model }
    }

    async fn draft(&self, request: ModelRequest, writer: &UiStreamWriter) -> Result<String, ToolError> {
        stream_draft(self.model.as_ref(), request, |_, draft| {
            writer.write_data("codeDelta", Value::String(draft.to_string()));
        })
        .await
    }
}

#[async_trait]
impl DocumentHandler for CodeHandler {
    fn kind(&self) -> ArtifactKind {
        ArtifactKind::Code
    }

    async fn on_create(&self, title: &str, writer: &UiStreamWriter) -> Result<String, ToolError> {
        let request = ModelRequest::new(ModelId::ArtifactModel)
            .system(CODE_PROMPT)
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
            .system(update_document_prompt(current, ArtifactKind::Code))
            .prompt(description);
        self.draft(request, writer).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mock_brain::{Script, ScriptedModel};
    use serde_json::json;

    #[tokio::test]
    async fn test_code_delta_carries_full_draft() {
        let model = ScriptedModel::new().on(ModelId::ArtifactModel, Script::text("print(1) print(2)"));
        let handler = CodeHandler::new(Arc::new(model));
        let (writer, mut rx) = UiStreamWriter::channel();

        let content = handler.on_create("Two prints", &writer).await.unwrap();
        drop(writer);
        assert_eq!(content, "print(1) print(2)");

        let mut drafts = Vec::new();
        while let Some(chunk) = rx.recv().await {
            drafts.push(serde_json::to_value(&chunk).unwrap());
        }
        assert_eq!(
            drafts,
            vec![
                json!({"type": "data-codeDelta", "data": "print(1) ", "transient": true}),
                json!({"type": "data-codeDelta", "data": "print(1) print(2)", "transient": true}),
            ]
        );
    }
}
