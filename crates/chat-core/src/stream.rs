//! UI message stream chunks and the writer used to emit them.
//!
//! Each chunk is serialized as one SSE `data:` payload. Protocol chunks carry
//! a fixed `type`; data chunks carry `data-<name>`.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::Value;
use tokio::sync::mpsc;

/// Protocol chunks of the UI message stream.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ControlChunk {
    #[serde(rename_all = "camelCase")]
    Start { message_id: String },
    StartStep,
    TextStart { id: String },
    TextDelta { id: String, delta: String },
    TextEnd { id: String },
    ReasoningStart { id: String },
    ReasoningDelta { id: String, delta: String },
    ReasoningEnd { id: String },
    #[serde(rename_all = "camelCase")]
    ToolInputAvailable {
        tool_call_id: String,
        tool_name: String,
        input: Value,
    },
    #[serde(rename_all = "camelCase")]
    ToolOutputAvailable { tool_call_id: String, output: Value },
    FinishStep,
    Finish,
    #[serde(rename_all = "camelCase")]
    Error { error_text: String },
}

/// An application data chunk (`data-<name>`).
#[derive(Debug, Clone, PartialEq)]
pub struct DataPart {
    pub name: String,
    pub data: Value,
    /// Transient parts are shown to the client but never stored in a message.
    pub transient: bool,
}

impl Serialize for DataPart {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("type", &format!("data-{}", self.name))?;
        map.serialize_entry("data", &self.data)?;
        if self.transient {
            map.serialize_entry("transient", &true)?;
        }
        map.end()
    }
}

/// One chunk of the UI message stream.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum UiChunk {
    Control(ControlChunk),
    Data(DataPart),
}

impl UiChunk {
    pub fn start(message_id: impl Into<String>) -> Self {
        UiChunk::Control(ControlChunk::Start {
            message_id: message_id.into(),
        })
    }

    pub fn start_step() -> Self {
        UiChunk::Control(ControlChunk::StartStep)
    }

    pub fn finish_step() -> Self {
        UiChunk::Control(ControlChunk::FinishStep)
    }

    pub fn finish() -> Self {
        UiChunk::Control(ControlChunk::Finish)
    }

    pub fn text_start(id: impl Into<String>) -> Self {
        UiChunk::Control(ControlChunk::TextStart { id: id.into() })
    }

    pub fn text_delta(id: impl Into<String>, delta: impl Into<String>) -> Self {
        UiChunk::Control(ControlChunk::TextDelta {
            id: id.into(),
            delta: delta.into(),
        })
    }

    pub fn text_end(id: impl Into<String>) -> Self {
        UiChunk::Control(ControlChunk::TextEnd { id: id.into() })
    }

    pub fn reasoning_start(id: impl Into<String>) -> Self {
        UiChunk::Control(ControlChunk::ReasoningStart { id: id.into() })
    }

    pub fn reasoning_delta(id: impl Into<String>, delta: impl Into<String>) -> Self {
        UiChunk::Control(ControlChunk::ReasoningDelta {
            id: id.into(),
            delta: delta.into(),
        })
    }

    pub fn reasoning_end(id: impl Into<String>) -> Self {
        UiChunk::Control(ControlChunk::ReasoningEnd { id: id.into() })
    }

    pub fn tool_input(tool_call_id: impl Into<String>, tool_name: impl Into<String>, input: Value) -> Self {
        UiChunk::Control(ControlChunk::ToolInputAvailable {
            tool_call_id: tool_call_id.into(),
            tool_name: tool_name.into(),
            input,
        })
    }

    pub fn tool_output(tool_call_id: impl Into<String>, output: Value) -> Self {
        UiChunk::Control(ControlChunk::ToolOutputAvailable {
            tool_call_id: tool_call_id.into(),
            output,
        })
    }

    pub fn error(error_text: impl Into<String>) -> Self {
        UiChunk::Control(ControlChunk::Error {
            error_text: error_text.into(),
        })
    }

    /// A transient data chunk.
    pub fn data(name: impl Into<String>, data: Value) -> Self {
        UiChunk::Data(DataPart {
            name: name.into(),
            data,
            transient: true,
        })
    }

    /// Serialize as a single SSE data payload.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            serde_json::json!({"type": "error", "errorText": e.to_string()}).to_string()
        })
    }
}

/// Cloneable handle used by the turn and its tools to emit chunks.
///
/// Writes after the reader went away are dropped silently; the turn keeps
/// running so its results are still persisted.
#[derive(Debug, Clone)]
pub struct UiStreamWriter {
    tx: mpsc::UnboundedSender<UiChunk>,
}

impl UiStreamWriter {
    /// Create a writer and the receiving half.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<UiChunk>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn write(&self, chunk: UiChunk) {
        let _ = self.tx.send(chunk);
    }

    /// Write a transient `data-<name>` chunk.
    pub fn write_data(&self, name: &str, data: Value) {
        self.write(UiChunk::data(name, data));
    }
}

/// Re-chunks text deltas on word boundaries.
///
/// Each emitted chunk ends with the whitespace that followed a word, so the
/// client renders whole words at a time.
#[derive(Debug, Default)]
pub struct WordChunker {
    buffer: String,
}

impl WordChunker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a delta and return every complete word chunk.
    pub fn push(&mut self, delta: &str) -> Vec<String> {
        self.buffer.push_str(delta);
        let mut chunks = Vec::new();

        loop {
            let Some(word_start) = self.buffer.find(|c: char| !c.is_whitespace()) else {
                break;
            };
            let Some(offset) = self.buffer[word_start..].find(char::is_whitespace) else {
                break;
            };
            let space_start = word_start + offset;
            let space_end = self.buffer[space_start..]
                .find(|c: char| !c.is_whitespace())
                .map(|i| space_start + i)
                .unwrap_or(self.buffer.len());

            chunks.push(self.buffer.drain(..space_end).collect());
        }

        chunks
    }

    /// Return whatever is left in the buffer.
    pub fn flush(&mut self) -> Option<String> {
        if self.buffer.is_empty() {
            None
        } else {
            Some(std::mem::take(&mut self.buffer))
        }
    }
}
