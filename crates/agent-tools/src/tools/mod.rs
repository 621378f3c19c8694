//! Tools offered to the chat model.

mod create_document;
mod request_suggestions;
mod update_document;
mod weather;

pub use create_document::CreateDocument;
pub use request_suggestions::RequestSuggestions;
pub use update_document::UpdateDocument;
pub use weather::{GetWeather, DEFAULT_WEATHER_URL};

#[cfg(test)]
pub(crate) mod test_support {
    use chat_core::{UiChunk, UiStreamWriter};
    use database::Database;
    use serde_json::Value;
    use tokio::sync::mpsc::UnboundedReceiver;

    use crate::tool::{ToolArgs, ToolContext};

    pub async fn database() -> Database {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db.migrate().await.unwrap();
        db
    }

    pub fn args(params: Value, user_id: Option<&str>) -> (ToolArgs, UnboundedReceiver<UiChunk>) {
        let (writer, rx) = UiStreamWriter::channel();
        let args = ToolArgs::new(
            serde_json::from_value(params).unwrap(),
            ToolContext::new(writer, user_id.map(str::to_string)),
        );
        (args, rx)
    }

    /// Drain the data parts written so far as JSON.
    pub fn drain(rx: &mut UnboundedReceiver<UiChunk>) -> Vec<Value> {
        let mut chunks = Vec::new();
        while let Ok(chunk) = rx.try_recv() {
            chunks.push(serde_json::to_value(&chunk).unwrap());
        }
        chunks
    }
}
