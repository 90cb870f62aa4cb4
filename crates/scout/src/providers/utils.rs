use serde_json::{json, Value};

use super::base::Usage;
use super::errors::ProviderError;
use crate::models::message::{Message, MessageContent};
use crate::models::role::Role;
use crate::models::tool::{Tool, ToolCall};

/// Convert internal Message format to Anthropic's API message specification
pub fn messages_to_anthropic_spec(messages: &[Message]) -> Vec<Value> {
    let mut messages_spec = Vec::new();

    for message in messages {
        let content: Vec<Value> = message
            .content
            .iter()
            .filter_map(|content| match content {
                MessageContent::Text(text) => {
                    // The API rejects empty text blocks
                    if text.text.is_empty() {
                        None
                    } else {
                        Some(json!({"type": "text", "text": text.text}))
                    }
                }
                MessageContent::ToolRequest(request) => Some(json!({
                    "type": "tool_use",
                    "id": request.id,
                    "name": request.tool_call.name,
                    "input": request.tool_call.parameters,
                })),
            })
            .collect();

        if content.is_empty() {
            continue;
        }

        messages_spec.push(json!({
            "role": message.role.as_str(),
            "content": content,
        }));
    }

    messages_spec
}

/// Convert internal Tool format to Anthropic's API tool specification
pub fn tools_to_anthropic_spec(tools: &[Tool]) -> Vec<Value> {
    tools
        .iter()
        .map(|tool| {
            json!({
                "name": tool.name,
                "description": tool.description,
                "input_schema": tool.input_schema,
            })
        })
        .collect()
}

/// Convert Anthropic's API response to internal Message format
pub fn anthropic_response_to_message(response: &Value) -> Result<Message, ProviderError> {
    let blocks = response
        .get("content")
        .and_then(|c| c.as_array())
        .ok_or_else(|| ProviderError::MalformedResponse("missing content array".to_string()))?;

    let mut content = Vec::new();
    for block in blocks {
        match block.get("type").and_then(|t| t.as_str()) {
            Some("text") => {
                let text = block.get("text").and_then(|t| t.as_str()).ok_or_else(|| {
                    ProviderError::MalformedResponse("text block without text".to_string())
                })?;
                content.push(MessageContent::text(text));
            }
            Some("tool_use") => {
                let name = block.get("name").and_then(|n| n.as_str()).ok_or_else(|| {
                    ProviderError::MalformedResponse("tool_use block without name".to_string())
                })?;
                let id = block
                    .get("id")
                    .and_then(|i| i.as_str())
                    .unwrap_or_default();
                let input = block.get("input").cloned().unwrap_or_else(|| json!({}));
                content.push(MessageContent::tool_request(id, ToolCall::new(name, input)));
            }
            other => {
                tracing::debug!("Skipping unsupported content block type {:?}", other);
            }
        }
    }

    Ok(Message {
        role: Role::Assistant,
        created: chrono::Utc::now().timestamp(),
        content,
    })
}

/// Read token usage from an Anthropic response, missing counts stay None
pub fn get_usage(response: &Value) -> Usage {
    let usage = match response.get("usage") {
        Some(usage) => usage,
        None => return Usage::default(),
    };

    let input_tokens = usage
        .get("input_tokens")
        .and_then(|v| v.as_i64())
        .and_then(|v| i32::try_from(v).ok());

    let output_tokens = usage
        .get("output_tokens")
        .and_then(|v| v.as_i64())
        .and_then(|v| i32::try_from(v).ok());

    let total_tokens = match (input_tokens, output_tokens) {
        (Some(input), Some(output)) => input.checked_add(output),
        _ => None,
    };

    Usage::new(input_tokens, output_tokens, total_tokens)
}
