use super::role::Role;
use super::tool::ToolCall;
use chrono::Utc;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextContent {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolRequest {
    pub id: String,
    pub tool_call: ToolCall,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Content passed inside a message, which can be both simple text and a tool request
pub enum MessageContent {
    Text(TextContent),
    ToolRequest(ToolRequest),
}

impl MessageContent {
    pub fn text<S: Into<String>>(text: S) -> Self {
        MessageContent::Text(TextContent { text: text.into() })
    }

    pub fn tool_request<S: Into<String>>(id: S, tool_call: ToolCall) -> Self {
        MessageContent::ToolRequest(ToolRequest {
            id: id.into(),
            tool_call,
        })
    }

    pub fn as_tool_request(&self) -> Option<&ToolRequest> {
        if let MessageContent::ToolRequest(ref tool_request) = self {
            Some(tool_request)
        } else {
            None
        }
    }

    /// Get the text content if this is a TextContent variant
    pub fn as_text(&self) -> Option<&str> {
        match self {
            MessageContent::Text(text) => Some(&text.text),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// A message to or from an LLM
pub struct Message {
    pub role: Role,
    pub created: i64,
    pub content: Vec<MessageContent>,
}

impl Message {
    /// Create a new user message with the current timestamp
    pub fn user() -> Self {
        Message {
            role: Role::User,
            created: Utc::now().timestamp(),
            content: Vec::new(),
        }
    }

    /// Create a new assistant message with the current timestamp
    pub fn assistant() -> Self {
        Message {
            role: Role::Assistant,
            created: Utc::now().timestamp(),
            content: Vec::new(),
        }
    }

    /// Add any MessageContent to the message
    pub fn with_content(mut self, content: MessageContent) -> Self {
        self.content.push(content);
        self
    }

    /// Add text content to the message
    pub fn with_text<S: Into<String>>(self, text: S) -> Self {
        self.with_content(MessageContent::text(text))
    }

    /// Add a tool request to the message
    pub fn with_tool_request<S: Into<String>>(self, id: S, tool_call: ToolCall) -> Self {
        self.with_content(MessageContent::tool_request(id, tool_call))
    }

    /// All text blocks of the message joined together, tool requests are ignored
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(MessageContent::as_text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// The first tool request in the message, if the model asked for one
    pub fn first_tool_request(&self) -> Option<&ToolRequest> {
        self.content.iter().find_map(MessageContent::as_tool_request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_text_skips_tool_requests() {
        let message = Message::assistant()
            .with_text("Let me look that up.")
            .with_tool_request("toolu_1", ToolCall::new("fetch_web_content", json!({"query": "mars"})))
            .with_text("One moment.");

        assert_eq!(message.text(), "Let me look that up.\nOne moment.");
    }

    #[test]
    fn test_first_tool_request_picks_earliest() {
        let message = Message::assistant()
            .with_tool_request("a", ToolCall::new("first", json!({})))
            .with_tool_request("b", ToolCall::new("second", json!({})));

        let request = message.first_tool_request().unwrap();
        assert_eq!(request.id, "a");
        assert_eq!(request.tool_call.name, "first");
    }

    #[test]
    fn test_no_tool_request() {
        let message = Message::assistant().with_text("4");
        assert!(message.first_tool_request().is_none());
        assert_eq!(message.role, Role::Assistant);
    }
}
