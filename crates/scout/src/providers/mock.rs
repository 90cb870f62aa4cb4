use async_trait::async_trait;
use std::sync::Mutex;

use super::base::{Provider, Usage};
use super::errors::ProviderError;
use crate::models::message::Message;
use crate::models::tool::Tool;

/// A mock provider that returns pre-configured responses for testing
pub struct MockProvider {
    responses: Mutex<Vec<Message>>,
    repeat: Option<Message>,
    requests: Mutex<Vec<Vec<Message>>>,
}

impl MockProvider {
    /// Create a new mock provider with a sequence of responses
    pub fn new(responses: Vec<Message>) -> Self {
        Self {
            responses: Mutex::new(responses),
            repeat: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Create a mock provider that answers every call with the same message
    pub fn repeating(response: Message) -> Self {
        Self {
            responses: Mutex::new(Vec::new()),
            repeat: Some(response),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// The conversations received so far, one entry per call
    pub fn requests(&self) -> Vec<Vec<Message>> {
        self.requests.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl Provider for MockProvider {
    async fn complete(
        &self,
        _system_prompt: &str,
        messages: &[Message],
        _tools: &[Tool],
    ) -> Result<(Message, Usage), ProviderError> {
        self.requests.lock().unwrap().push(messages.to_vec());

        if let Some(response) = &self.repeat {
            return Ok((response.clone(), Usage::default()));
        }

        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            // Return empty response if no more pre-configured responses
            Ok((Message::assistant().with_text(""), Usage::default()))
        } else {
            Ok((responses.remove(0), Usage::default()))
        }
    }
}
