use async_trait::async_trait;
use indoc::indoc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::errors::AgentResult;
use crate::models::tool::{Tool, ToolCall};
use crate::search::{Search, SearchResult};

/// The only tool the agent offers the model
pub const FETCH_WEB_CONTENT: &str = "fetch_web_content";

pub const UNKNOWN_TOOL: &str = "unknown tool name";
pub const NO_QUERY: &str = "no query provided";

/// Declaration of the web search tool as sent to the model
pub fn fetch_web_content_tool() -> Tool {
    Tool::new(
        FETCH_WEB_CONTENT,
        indoc! {r#"
            Retrieves info from website based on users queries.
            Use this when the question needs current information from the web.
        "#},
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "the search query or website to look up information about"
                }
            },
            "required": ["query"]
        }),
    )
}

/// Body of `POST /tool_call`, sent by the tool server client and decoded by the server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default = "empty_parameters")]
    pub parameters: Value,
}

fn empty_parameters() -> Value {
    json!({})
}

impl From<&ToolCall> for ToolCallRequest {
    fn from(call: &ToolCall) -> Self {
        Self {
            name: call.name.clone(),
            parameters: call.parameters.clone(),
        }
    }
}

/// Result of dispatching a tool call, serialized as `{"results": [...]}` or `{"error": "..."}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ToolCallOutcome {
    Results { results: Vec<SearchResult> },
    Error { error: String },
}

impl ToolCallOutcome {
    pub fn error<S: Into<String>>(reason: S) -> Self {
        ToolCallOutcome::Error {
            error: reason.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, ToolCallOutcome::Error { .. })
    }

    /// Text handed back to the model in place of the raw outcome
    pub fn description(&self) -> String {
        match self {
            ToolCallOutcome::Results { results } => match results.first() {
                Some(result) => result.description.clone(),
                None => "No results were found for the query.".to_string(),
            },
            ToolCallOutcome::Error { error } => format!("The tool call failed: {}", error),
        }
    }
}

/// Something that can run a tool call the model asked for
#[async_trait]
pub trait ToolExecutor: Send + Sync {
    async fn execute(&self, call: &ToolCall) -> AgentResult<ToolCallOutcome>;
}

/// Routes tool calls to the search collaborator
#[derive(Clone)]
pub struct ToolDispatcher {
    search: Arc<dyn Search>,
}

impl ToolDispatcher {
    pub fn new(search: Arc<dyn Search>) -> Self {
        Self { search }
    }

    pub async fn dispatch(&self, name: &str, parameters: &Value) -> ToolCallOutcome {
        if name != FETCH_WEB_CONTENT {
            return ToolCallOutcome::error(UNKNOWN_TOOL);
        }

        let query = match parameters.get("query").and_then(|q| q.as_str()) {
            Some(query) if !query.trim().is_empty() => query,
            _ => return ToolCallOutcome::error(NO_QUERY),
        };

        tracing::info!(query, "Fetching web content");
        ToolCallOutcome::Results {
            results: self.search.search(query).await,
        }
    }
}

#[async_trait]
impl ToolExecutor for ToolDispatcher {
    async fn execute(&self, call: &ToolCall) -> AgentResult<ToolCallOutcome> {
        Ok(self.dispatch(&call.name, &call.parameters).await)
    }
}
