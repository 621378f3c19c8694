//! Incremental parser for newline-delimited JSON produced by a model.

use std::marker::PhantomData;

use serde::de::DeserializeOwned;

/// Parses one JSON object per line out of a stream of text deltas.
///
/// Blank lines, markdown fences and bare array brackets are ignored, and a
/// trailing comma after an object is tolerated, since models add them freely.
#[derive(Debug)]
pub struct JsonLinesParser<T> {
    buffer: String,
    _marker: PhantomData<T>,
}

impl<T: DeserializeOwned> Default for JsonLinesParser<T> {
    fn default() -> Self {
        Self {
            buffer: String::new(),
            _marker: PhantomData,
        }
    }
}

impl<T: DeserializeOwned> JsonLinesParser<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a delta and return every element completed by it.
    pub fn push(&mut self, delta: &str) -> Vec<Result<T, serde_json::Error>> {
        self.buffer.push_str(delta);
        let mut elements = Vec::new();

        while let Some(newline) = self.buffer.find('\n') {
            let line: String = self.buffer.drain(..=newline).collect();
            if let Some(element) = parse_line(&line) {
                elements.push(element);
            }
        }

        elements
    }

    /// Parse whatever is left after the stream ended.
    pub fn finish(&mut self) -> Option<Result<T, serde_json::Error>> {
        let line = std::mem::take(&mut self.buffer);
        parse_line(&line)
    }
}

fn parse_line<T: DeserializeOwned>(line: &str) -> Option<Result<T, serde_json::Error>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with("```") || line == "[" || line == "]" {
        return None;
    }
    let line = line.strip_suffix(',').unwrap_or(line);
    Some(serde_json::from_str(line))
}
