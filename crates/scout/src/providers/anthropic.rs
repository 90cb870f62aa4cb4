use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};

use super::base::{Provider, Usage};
use super::configs::{AnthropicProviderConfig, ANTHROPIC_VERSION, DEFAULT_MAX_TOKENS};
use super::errors::ProviderError;
use super::utils::{
    anthropic_response_to_message, get_usage, messages_to_anthropic_spec,
    tools_to_anthropic_spec,
};
use crate::models::message::Message;
use crate::models::tool::Tool;

pub struct AnthropicProvider {
    client: Client,
    config: AnthropicProviderConfig,
}

impl AnthropicProvider {
    pub fn new(config: AnthropicProviderConfig) -> Result<Self, ProviderError> {
        let client = Client::builder().timeout(config.timeout).build()?;

        Ok(Self { client, config })
    }

    async fn post(&self, payload: Value) -> Result<Value, ProviderError> {
        let url = format!("{}/v1/messages", self.config.host.trim_end_matches('/'));

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&payload)
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => {
                // A 200 can still carry a proxy page instead of API JSON
                let bytes = response.bytes().await?;
                serde_json::from_slice(&bytes)
                    .map_err(|e| ProviderError::MalformedResponse(e.to_string()))
            }
            status if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() => {
                Err(ProviderError::ServerError(status))
            }
            status => {
                let body = response.text().await?;
                Err(ProviderError::RequestFailed { status, body })
            }
        }
    }
}

#[async_trait]
impl Provider for AnthropicProvider {
    async fn complete(
        &self,
        system: &str,
        messages: &[Message],
        tools: &[Tool],
    ) -> Result<(Message, Usage), ProviderError> {
        let mut payload = json!({
            "model": self.config.model,
            "max_tokens": self.config.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            "messages": messages_to_anthropic_spec(messages),
        });

        if let Some(object) = payload.as_object_mut() {
            if !system.is_empty() {
                object.insert("system".to_string(), json!(system));
            }
            if !tools.is_empty() {
                object.insert("tools".to_string(), json!(tools_to_anthropic_spec(tools)));
            }
            if let Some(temp) = self.config.temperature {
                object.insert("temperature".to_string(), json!(temp));
            }
        }

        tracing::debug!(
            model = %self.config.model,
            messages = messages.len(),
            tools = tools.len(),
            "Sending request to Anthropic"
        );

        let response = self.post(payload).await?;

        let message = anthropic_response_to_message(&response)?;
        let usage = get_usage(&response);

        Ok((message, usage))
    }
}
