//! Conversion from UI messages to provider messages.

use crate::message::{MessagePart, Role, ToolState, UiMessage};
use crate::model::{ModelMessage, ToolCall, UserContent};

/// Convert stored and incoming UI messages into model messages.
///
/// Reasoning parts are dropped. Assistant messages are split at `step-start`
/// parts so every step becomes one assistant turn followed by its tool results.
/// Tool parts without an output are skipped since the provider rejects
/// unanswered tool calls.
pub fn to_model_messages(messages: &[UiMessage]) -> Vec<ModelMessage> {
    let mut out = Vec::new();

    for message in messages {
        match message.role {
            Role::System => {
                let text = message.text();
                if !text.is_empty() {
                    out.push(ModelMessage::System(text));
                }
            }
            Role::User => {
                let content: Vec<UserContent> = message
                    .parts
                    .iter()
                    .filter_map(|part| match part {
                        MessagePart::Text { text } => Some(UserContent::Text(text.clone())),
                        MessagePart::File { media_type, url, .. } if media_type.starts_with("image/") => {
                            Some(UserContent::Image {
                                url: url.clone(),
                                media_type: media_type.clone(),
                            })
                        }
                        MessagePart::File { url, filename, .. } => Some(UserContent::Text(format!(
                            "[attached file {}: {}]",
                            filename.as_deref().unwrap_or("file"),
                            url
                        ))),
                        _ => None,
                    })
                    .collect();
                if !content.is_empty() {
                    out.push(ModelMessage::User(content));
                }
            }
            Role::Assistant => push_assistant_steps(message, &mut out),
        }
    }

    out
}

fn push_assistant_steps(message: &UiMessage, out: &mut Vec<ModelMessage>) {
    let mut text = String::new();
    let mut calls: Vec<ToolCall> = Vec::new();
    let mut results: Vec<ModelMessage> = Vec::new();

    let mut flush = |text: &mut String, calls: &mut Vec<ToolCall>, results: &mut Vec<ModelMessage>| {
        if text.is_empty() && calls.is_empty() {
            return;
        }
        out.push(ModelMessage::Assistant {
            text: std::mem::take(text),
            tool_calls: std::mem::take(calls),
        });
        out.append(results);
    };

    for part in &message.parts {
        match part {
            MessagePart::StepStart => flush(&mut text, &mut calls, &mut results),
            MessagePart::Text { text: delta } => text.push_str(delta),
            MessagePart::Tool(tool) => {
                let output = match (tool.state, &tool.output, &tool.error_text) {
                    (ToolState::OutputAvailable, Some(output), _) => output.clone(),
                    (ToolState::OutputError, _, Some(error)) => {
                        serde_json::json!({ "error": error })
                    }
                    _ => continue,
                };
                calls.push(ToolCall {
                    id: tool.tool_call_id.clone(),
                    name: tool.tool_name().to_string(),
                    arguments: tool.input.clone(),
                });
                results.push(ModelMessage::Tool {
                    tool_call_id: tool.tool_call_id.clone(),
                    tool_name: tool.tool_name().to_string(),
                    output,
                });
            }
            MessagePart::Reasoning { .. } | MessagePart::File { .. } => {}
        }
    }

    flush(&mut text, &mut calls, &mut results);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::ToolPart;
    use serde_json::json;

    #[test]
    fn test_user_text_and_image() {
        let message = UiMessage::new(
            "m1",
            Role::User,
            vec![
                MessagePart::text("what is this?"),
                MessagePart::File {
                    media_type: "image/png".to_string(),
                    filename: Some("a.png".to_string()),
                    url: "https://example.com/a.png".to_string(),
                },
            ],
        );

        let converted = to_model_messages(&[message]);
        assert_eq!(
            converted,
            vec![ModelMessage::User(vec![
                UserContent::Text("what is this?".to_string()),
                UserContent::Image {
                    url: "https://example.com/a.png".to_string(),
                    media_type: "image/png".to_string(),
                },
            ])]
        );
    }

    #[test]
    fn test_assistant_steps_with_tool_results() {
        let message = UiMessage::new(
            "a1",
            Role::Assistant,
            vec![
                MessagePart::StepStart,
                MessagePart::reasoning("thinking"),
                MessagePart::Tool(ToolPart::output_available(
                    "call-1",
                    "getWeather",
                    json!({"latitude": 1.0, "longitude": 2.0}),
                    json!({"temperature": 20}),
                )),
                MessagePart::StepStart,
                MessagePart::text("It is 20 degrees."),
            ],
        );

        let converted = to_model_messages(&[message]);
        assert_eq!(converted.len(), 3);
        match &converted[0] {
            ModelMessage::Assistant { text, tool_calls } => {
                assert!(text.is_empty());
                assert_eq!(tool_calls.len(), 1);
                assert_eq!(tool_calls[0].name, "getWeather");
            }
            other => panic!("unexpected message: {:?}", other),
        }
        assert!(matches!(&converted[1], ModelMessage::Tool { tool_call_id, .. } if tool_call_id == "call-1"));
        assert_eq!(converted[2], ModelMessage::assistant_text("It is 20 degrees."));
    }

    #[test]
    fn test_unanswered_tool_calls_are_skipped() {
        let mut pending = ToolPart::output_available("call-2", "createDocument", json!({}), json!({}));
        pending.state = ToolState::InputAvailable;
        pending.output = None;

        let message = UiMessage::new("a2", Role::Assistant, vec![MessagePart::Tool(pending)]);
        assert!(to_model_messages(&[message]).is_empty());
    }
}
