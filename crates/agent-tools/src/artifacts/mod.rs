//! Document artifact handlers.
//!
//! Each [`ArtifactKind`] has exactly one handler. A handler drafts content
//! with the artifact model, streams its progress as data parts, and the
//! caller stores the result as a new document revision.

mod code;
mod sheet;
mod text;

use std::sync::Arc;

use async_trait::async_trait;
use chat_core::{ArtifactKind, LanguageModel, ModelEvent, ModelRequest, UiStreamWriter};
use database::Document;
use futures::StreamExt;

use crate::error::ToolError;

pub use code::CodeHandler;
pub use sheet::SheetHandler;
pub use text::TextHandler;

/// Drafts and revises the content of one artifact kind.
#[async_trait]
pub trait DocumentHandler: Send + Sync {
    fn kind(&self) -> ArtifactKind;

    /// Write the first draft for a new document.
    async fn on_create(&self, title: &str, writer: &UiStreamWriter) -> Result<String, ToolError>;

    /// Rewrite the current revision according to `description`.
    async fn on_update(
        &self,
        document: &Document,
        description: &str,
        writer: &UiStreamWriter,
    ) -> Result<String, ToolError>;
}

/// The handler for every artifact kind.
#[derive(Clone)]
pub struct ArtifactHandlers {
    text: Arc<TextHandler>,
    code: Arc<CodeHandler>,
    sheet: Arc<SheetHandler>,
}

impl ArtifactHandlers {
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self {
            text: Arc::new(TextHandler::new(model.clone())),
            code: Arc::new(CodeHandler::new(model.clone())),
            sheet: Arc::new(SheetHandler::new(model)),
        }
    }

    pub fn handler(&self, kind: ArtifactKind) -> &dyn DocumentHandler {
        match kind {
            ArtifactKind::Text => self.text.as_ref(),
            ArtifactKind::Code => self.code.as_ref(),
            ArtifactKind::Sheet => self.sheet.as_ref(),
        }
    }
}

/// Stream a draft from the model, calling `emit(delta, draft)` per text delta.
pub(crate) async fn stream_draft<F>(
    model: &dyn LanguageModel,
    request: ModelRequest,
    mut emit: F,
) -> Result<String, ToolError>
where
    F: FnMut(&str, &str) + Send,
{
    let mut stream = model.stream(request).await?;
    let mut draft = String::new();

    while let Some(event) = stream.next().await {
        if let ModelEvent::TextDelta(delta) = event? {
            draft.push_str(&delta);
            emit(&delta, &draft);
        }
    }

    Ok(draft)
}
