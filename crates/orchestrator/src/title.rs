//! Chat title synthesis.

use chat_core::{LanguageModel, ModelId, ModelRequest, UiMessage, TITLE_PROMPT};
use tracing::{debug, warn};

/// Longest title kept, in characters.
pub const MAX_TITLE_CHARS: usize = 80;

/// Title used when the message has no text at all.
pub const DEFAULT_TITLE: &str = "New chat";

/// Ask the title model for a title, falling back to the message text.
pub async fn generate_title(model: &dyn LanguageModel, message: &UiMessage) -> String {
    let text = message.text();
    if text.trim().is_empty() {
        return DEFAULT_TITLE.to_string();
    }

    let request = ModelRequest::new(ModelId::TitleModel)
        .system(TITLE_PROMPT)
        .prompt(text.clone());

    match model.generate_text(request).await {
        Ok(title) => {
            let title = clean(&title);
            if title.is_empty() {
                debug!("Title model returned nothing, using message text");
                fallback_title(&text)
            } else {
                title
            }
        }
        Err(e) => {
            warn!("Title generation failed: {}", e);
            fallback_title(&text)
        }
    }
}

/// First [`MAX_TITLE_CHARS`] characters of the message text.
pub fn fallback_title(text: &str) -> String {
    let text = text.trim();
    if text.is_empty() {
        return DEFAULT_TITLE.to_string();
    }
    text.chars().take(MAX_TITLE_CHARS).collect()
}

fn clean(title: &str) -> String {
    let title: String = title
        .trim()
        .chars()
        .filter(|c| !matches!(c, '"' | ':'))
        .take(MAX_TITLE_CHARS)
        .collect();
    title.trim().to_string()
}
