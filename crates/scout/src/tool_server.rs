//! Client for a tool server exposing `POST /tool_call`, such as `scoutd`.
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;

use crate::errors::{AgentError, AgentResult};
use crate::models::tool::ToolCall;
use crate::tools::{ToolCallOutcome, ToolCallRequest, ToolExecutor};

pub const DEFAULT_TOOL_SERVER_URL: &str = "http://localhost:5001";

const HEALTH_TIMEOUT: Duration = Duration::from_secs(2);

pub struct ToolServerClient {
    client: Client,
    base_url: String,
}

impl ToolServerClient {
    pub fn new<S: Into<String>>(base_url: S, timeout: Duration) -> AgentResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AgentError::ExecutionError(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Whether the server answers its health check
    pub async fn health(&self) -> bool {
        let url = format!("{}/health", self.base_url);
        match self.client.get(&url).timeout(HEALTH_TIMEOUT).send().await {
            Ok(response) => response.status() == StatusCode::OK,
            Err(e) => {
                tracing::debug!("Tool server health check failed: {}", e);
                false
            }
        }
    }
}

#[async_trait]
impl ToolExecutor for ToolServerClient {
    async fn execute(&self, call: &ToolCall) -> AgentResult<ToolCallOutcome> {
        let url = format!("{}/tool_call", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&ToolCallRequest::from(call))
            .send()
            .await
            .map_err(|e| AgentError::ExecutionError(format!("{}: {}", url, e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AgentError::ExecutionError(e.to_string()))?;

        // Rejected calls still carry an {"error": ...} body we can hand to the model
        match serde_json::from_str::<ToolCallOutcome>(&body) {
            Ok(outcome) if status.is_success() || outcome.is_error() => Ok(outcome),
            _ => Err(AgentError::ExecutionError(format!(
                "tool server returned {}: {}",
                status, body
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> ToolServerClient {
        ToolServerClient::new(server.uri(), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_execute_posts_call() -> anyhow::Result<()> {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/tool_call"))
            .and(body_json(json!({
                "name": "fetch_web_content",
                "parameters": {"query": "mars"}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [{"title": "Mars", "url": "https://mars.example", "description": "Fourth planet."}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let call = ToolCall::new("fetch_web_content", json!({"query": "mars"}));
        let outcome = client(&server).execute(&call).await?;
        assert_eq!(outcome.description(), "Fourth planet.");
        Ok(())
    }

    #[tokio::test]
    async fn test_execute_decodes_rejection() -> anyhow::Result<()> {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/tool_call"))
            .respond_with(
                ResponseTemplate::new(400).set_body_json(json!({"error": "unknown tool name"})),
            )
            .mount(&server)
            .await;

        let call = ToolCall::new("get_weather", json!({}));
        let outcome = client(&server).execute(&call).await?;
        assert_eq!(outcome, ToolCallOutcome::error("unknown tool name"));
        Ok(())
    }

    #[tokio::test]
    async fn test_execute_server_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let call = ToolCall::new("fetch_web_content", json!({"query": "mars"}));
        let err = client(&server).execute(&call).await.unwrap_err();
        assert!(matches!(err, AgentError::ExecutionError(_)));
    }

    #[tokio::test]
    async fn test_health() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
            .mount(&server)
            .await;

        assert!(client(&server).health().await);

        let unreachable =
            ToolServerClient::new("http://127.0.0.1:9", Duration::from_secs(1)).unwrap();
        assert!(!unreachable.health().await);
    }
}
