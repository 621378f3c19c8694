//! Prompt builders for the chat, title and artifact models.

use crate::artifact::ArtifactKind;
use crate::model::ModelId;

/// Base persona for every chat turn.
pub const REGULAR_PROMPT: &str =
    "You are a friendly assistant. Keep your responses concise and helpful.";

/// Instructions for the document tools.
pub const ARTIFACTS_PROMPT: &str = "\
Artifacts is a side panel next to the conversation where documents are written and edited.

Use `createDocument` when the user asks for substantial content (more than about ten lines), \
content they will likely save or reuse (emails, essays, code), or explicitly asks for a document. \
For code, use the code kind and write Python unless another language is requested. \
Do not create a document for short conversational answers or when the user only wants an explanation.

Use `updateDocument` only after the user asked for changes to an existing document. \
Prefer full rewrites for major changes and targeted edits for small ones. \
Never update a document right after creating it; wait for feedback.

Use `requestSuggestions` when the user asks for writing feedback on an existing document.

Use `getWeather` when the user asks about current weather and you know the coordinates.";

/// Instructions for the title model.
pub const TITLE_PROMPT: &str = "\
You generate a short title for a conversation from the user's first message. \
The title must be at most 80 characters, summarise the message, \
and must not contain quotes or colons. Reply with the title only.";

/// Instructions for writing a text document.
pub const TEXT_PROMPT: &str = "\
Write about the given topic. Markdown is supported; use headings where they help.";

/// Instructions for writing a code document.
pub const CODE_PROMPT: &str = "\
You are a code generator that writes self-contained, executable snippets. \
Each snippet must run on its own, print its results, include brief comments, \
stay under fifteen lines where possible, use only the standard library, \
and must not read input, files or the network. Reply with the code only.";

/// Instructions for writing a spreadsheet document.
pub const SHEET_PROMPT: &str = "\
You are a spreadsheet assistant. Produce a spreadsheet in CSV format for the given request, \
with a header row and meaningful columns. Reply with the CSV only.";

/// Instructions for the suggestions model.
pub const SUGGESTIONS_PROMPT: &str = "\
You are a writing assistant. Given a piece of writing, offer up to 5 suggestions to improve it. \
Each edit must be a full sentence, not single words. \
Reply with one JSON object per line and nothing else, each shaped as \
{\"originalSentence\": string, \"suggestedSentence\": string, \"description\": string}.";

/// Location hints derived from the incoming request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestHints {
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
}

impl RequestHints {
    fn to_prompt(&self) -> String {
        let field = |value: &Option<String>| value.clone().unwrap_or_else(|| "unknown".to_string());
        format!(
            "About the origin of the user's request:\n- lat: {}\n- lon: {}\n- city: {}\n- country: {}",
            field(&self.latitude),
            field(&self.longitude),
            field(&self.city),
            field(&self.country),
        )
    }
}

/// System prompt for a chat turn.
///
/// The reasoning model runs without tools, so it does not get the artifact
/// instructions.
pub fn system_prompt(model: ModelId, hints: &RequestHints) -> String {
    if model.supports_tools() {
        format!("{}\n\n{}\n\n{}", REGULAR_PROMPT, hints.to_prompt(), ARTIFACTS_PROMPT)
    } else {
        format!("{}\n\n{}", REGULAR_PROMPT, hints.to_prompt())
    }
}

/// System prompt for revising an existing document.
pub fn update_document_prompt(current_content: &str, kind: ArtifactKind) -> String {
    let subject = match kind {
        ArtifactKind::Text => "document",
        ArtifactKind::Code => "code snippet",
        ArtifactKind::Sheet => "spreadsheet",
    };
    format!(
        "Improve the following contents of the {} based on the given prompt. \
         Reply with the complete updated {} only.\n\n{}",
        subject, subject, current_content
    )
}
