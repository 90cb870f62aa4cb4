use std::time::Duration;
use tokio::sync::watch;

use crate::errors::{AgentError, AgentResult};
use crate::models::message::Message;
use crate::models::tool::{Tool, ToolCall};
use crate::providers::base::Provider;
use crate::tools::{fetch_web_content_tool, ToolCallOutcome, ToolExecutor};

/// Joins the model's own text and the tool output in the injected assistant turn
pub const TOOL_RESULT_PREAMBLE: &str =
    "\n\nThe tool call was successful and here is the information from the tool call: ";

/// Sent as the user turn after a tool result has been injected
pub const SUMMARIZE_INSTRUCTION: &str =
    "Please summarize the information from the tool call and don't send any more tool calls";

pub const DEFAULT_MAX_LLM_CALLS: usize = 2;
pub const DEFAULT_EXCHANGE_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Clone)]
pub struct AgentConfig {
    pub system_prompt: String,
    /// Upper bound on LLM calls per exchange, the initial call included
    pub max_llm_calls: usize,
    pub exchange_timeout: Duration,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            system_prompt: String::new(),
            max_llm_calls: DEFAULT_MAX_LLM_CALLS,
            exchange_timeout: DEFAULT_EXCHANGE_TIMEOUT,
        }
    }
}

/// The outcome of one question answered by the agent
#[derive(Debug, Clone)]
pub struct Exchange {
    pub answer: String,
    /// The conversation as sent on the final LLM call, plus the final reply
    pub messages: Vec<Message>,
    pub llm_calls: usize,
}

enum ExchangeState {
    AwaitingModel {
        prompt: String,
    },
    ModelReplied {
        prompt: String,
        reply: Message,
    },
    ToolRequested {
        prompt: String,
        reply: Message,
        call: ToolCall,
    },
    ToolExecuted {
        prompt: String,
        reply: Message,
        outcome: ToolCallOutcome,
    },
    Done {
        reply: Message,
    },
}

/// Agent pairs the LLM with the web search tool and drives the tool round-trip
pub struct Agent {
    provider: Box<dyn Provider>,
    executor: Box<dyn ToolExecutor>,
    tools: Vec<Tool>,
    config: AgentConfig,
}

impl Agent {
    pub fn new(
        provider: Box<dyn Provider>,
        executor: Box<dyn ToolExecutor>,
        config: AgentConfig,
    ) -> Self {
        Self {
            provider,
            executor,
            tools: vec![fetch_web_content_tool()],
            config,
        }
    }

    /// Answer `query` given the earlier turns in `history`, bounded by the exchange timeout
    pub async fn reply(&self, history: &[Message], query: &str) -> AgentResult<Exchange> {
        let timeout = self.config.exchange_timeout;
        tokio::time::timeout(timeout, self.run_exchange(history, query))
            .await
            .map_err(|_| AgentError::Timeout(timeout))?
    }

    /// Like `reply`, but gives up as soon as `cancel_rx` flips to true
    pub async fn reply_with_cancel(
        &self,
        history: &[Message],
        query: &str,
        mut cancel_rx: watch::Receiver<bool>,
    ) -> AgentResult<Exchange> {
        if *cancel_rx.borrow() {
            return Err(AgentError::Cancelled);
        }

        tokio::select! {
            result = self.reply(history, query) => result,
            _ = async {
                while cancel_rx.changed().await.is_ok() {
                    if *cancel_rx.borrow() {
                        return;
                    }
                }
                // Sender dropped without cancelling, let the exchange finish
                std::future::pending::<()>().await
            } => Err(AgentError::Cancelled),
        }
    }

    async fn run_exchange(&self, history: &[Message], query: &str) -> AgentResult<Exchange> {
        let mut messages = history.to_vec();
        let mut llm_calls = 0;
        let mut state = ExchangeState::AwaitingModel {
            prompt: query.to_string(),
        };

        loop {
            state = match state {
                ExchangeState::AwaitingModel { prompt } => {
                    if llm_calls >= self.config.max_llm_calls {
                        return Err(AgentError::RoundTripLimit(llm_calls));
                    }

                    let mut request = messages.clone();
                    request.push(Message::user().with_text(&prompt));

                    llm_calls += 1;
                    tracing::debug!(call = llm_calls, messages = request.len(), "Sending request to LLM");
                    let (reply, usage) = self
                        .provider
                        .complete(&self.config.system_prompt, &request, &self.tools)
                        .await?;
                    tracing::debug!(?usage, "LLM replied");

                    ExchangeState::ModelReplied { prompt, reply }
                }
                ExchangeState::ModelReplied { prompt, reply } => {
                    let call = reply
                        .first_tool_request()
                        .map(|request| request.tool_call.clone());
                    match call {
                        Some(call) => {
                            ExchangeState::ToolRequested {
                                prompt,
                                reply,
                                call,
                            }
                        }
                        None => {
                            messages.push(Message::user().with_text(prompt));
                            ExchangeState::Done { reply }
                        }
                    }
                }
                ExchangeState::ToolRequested {
                    prompt,
                    reply,
                    call,
                } => {
                    if llm_calls >= self.config.max_llm_calls {
                        tracing::error!(
                            llm_calls,
                            tool = %call.name,
                            "Model requested another tool call after being told to stop"
                        );
                        return Err(AgentError::RoundTripLimit(llm_calls));
                    }

                    tracing::info!(tool = %call.name, parameters = %call.parameters, "Tool call detected");
                    let outcome = self.executor.execute(&call).await?;
                    if outcome.is_error() {
                        tracing::warn!(?outcome, "Tool call was rejected");
                    }

                    ExchangeState::ToolExecuted {
                        prompt,
                        reply,
                        outcome,
                    }
                }
                ExchangeState::ToolExecuted {
                    prompt,
                    reply,
                    outcome,
                } => {
                    let injected = format!(
                        "{}{}{}",
                        reply.text(),
                        TOOL_RESULT_PREAMBLE,
                        outcome.description()
                    );
                    messages.push(Message::user().with_text(prompt));
                    messages.push(Message::assistant().with_text(injected));

                    ExchangeState::AwaitingModel {
                        prompt: SUMMARIZE_INSTRUCTION.to_string(),
                    }
                }
                ExchangeState::Done { reply } => {
                    let answer = reply.text();
                    messages.push(reply);
                    return Ok(Exchange {
                        answer,
                        messages,
                        llm_calls,
                    });
                }
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::role::Role;
    use crate::providers::mock::MockProvider;
    use crate::providers::errors::ProviderError;
    use crate::providers::base::Usage;
    use crate::search::{Search, SearchResult};
    use crate::tools::ToolDispatcher;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    struct StubSearch {
        results: Vec<SearchResult>,
        queries: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Search for StubSearch {
        async fn search(&self, query: &str) -> Vec<SearchResult> {
            self.queries.lock().unwrap().push(query.to_string());
            self.results.clone()
        }
    }

    fn stub_search(results: Vec<SearchResult>) -> Arc<StubSearch> {
        Arc::new(StubSearch {
            results,
            queries: Mutex::new(Vec::new()),
        })
    }

    /// Lets the tests keep a handle on the mock after the agent takes ownership
    struct SharedProvider(Arc<MockProvider>);

    #[async_trait]
    impl Provider for SharedProvider {
        async fn complete(
            &self,
            system: &str,
            messages: &[Message],
            tools: &[Tool],
        ) -> Result<(Message, Usage), ProviderError> {
            self.0.complete(system, messages, tools).await
        }
    }

    fn agent(provider: Arc<MockProvider>, search: Arc<StubSearch>) -> Agent {
        Agent::new(
            Box::new(SharedProvider(provider)),
            Box::new(ToolDispatcher::new(search)),
            AgentConfig::default(),
        )
    }

    fn tool_use(query: &str) -> Message {
        Message::assistant().with_tool_request(
            "toolu_1",
            ToolCall::new("fetch_web_content", json!({"query": query})),
        )
    }

    #[tokio::test]
    async fn test_tool_round_trip() -> anyhow::Result<()> {
        let provider = Arc::new(MockProvider::new(vec![
            tool_use("capital of France"),
            Message::assistant().with_text("The capital of France is Paris."),
        ]));
        let search = stub_search(vec![SearchResult {
            title: "Paris".to_string(),
            url: "https://en.wikipedia.org/wiki/Paris".to_string(),
            description: "Paris is the capital of France.".to_string(),
        }]);

        let exchange = agent(provider.clone(), search.clone())
            .reply(&[], "capital of France")
            .await?;

        assert_eq!(exchange.answer, "The capital of France is Paris.");
        assert_eq!(exchange.llm_calls, 2);
        assert_eq!(provider.calls(), 2);
        assert_eq!(
            *search.queries.lock().unwrap(),
            vec!["capital of France".to_string()]
        );

        let requests = provider.requests();
        assert_eq!(requests[0].len(), 1);
        assert_eq!(requests[0][0].text(), "capital of France");

        // question, injected tool result, then the summarize instruction
        let second = &requests[1];
        assert_eq!(second.len(), 3);
        assert_eq!(second[0].role, Role::User);
        assert_eq!(second[0].text(), "capital of France");
        assert_eq!(second[1].role, Role::Assistant);
        assert_eq!(
            second[1].text(),
            format!("{}Paris is the capital of France.", TOOL_RESULT_PREAMBLE)
        );
        assert_eq!(second[2].role, Role::User);
        assert_eq!(second[2].text(), SUMMARIZE_INSTRUCTION);

        assert_eq!(exchange.messages.len(), 4);
        assert_eq!(exchange.messages[3].text(), "The capital of France is Paris.");
        Ok(())
    }

    #[tokio::test]
    async fn test_direct_answer() -> anyhow::Result<()> {
        let provider = Arc::new(MockProvider::new(vec![
            Message::assistant().with_text("4")
        ]));
        let search = stub_search(vec![]);

        let exchange = agent(provider.clone(), search.clone()).reply(&[], "2+2").await?;

        assert_eq!(exchange.answer, "4");
        assert_eq!(exchange.llm_calls, 1);
        assert_eq!(provider.calls(), 1);
        assert!(search.queries.lock().unwrap().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_stops_at_call_cap() {
        let provider = Arc::new(MockProvider::repeating(tool_use("again")));
        let search = stub_search(vec![]);

        let err = agent(provider.clone(), search.clone())
            .reply(&[], "loop forever")
            .await
            .unwrap_err();

        assert!(matches!(err, AgentError::RoundTripLimit(2)));
        assert_eq!(provider.calls(), 2);
        assert_eq!(search.queries.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_configured_cap() {
        let provider = Arc::new(MockProvider::repeating(tool_use("again")));
        let agent = Agent::new(
            Box::new(SharedProvider(provider.clone())),
            Box::new(ToolDispatcher::new(stub_search(vec![]))),
            AgentConfig {
                max_llm_calls: 3,
                ..AgentConfig::default()
            },
        );

        let err = agent.reply(&[], "loop").await.unwrap_err();
        assert!(matches!(err, AgentError::RoundTripLimit(3)));
        assert_eq!(provider.calls(), 3);
    }

    #[tokio::test]
    async fn test_zero_cap_makes_no_calls() {
        let provider = Arc::new(MockProvider::repeating(Message::assistant().with_text("hi")));
        let agent = Agent::new(
            Box::new(SharedProvider(provider.clone())),
            Box::new(ToolDispatcher::new(stub_search(vec![]))),
            AgentConfig {
                max_llm_calls: 0,
                ..AgentConfig::default()
            },
        );

        let err = agent.reply(&[], "hello").await.unwrap_err();
        assert!(matches!(err, AgentError::RoundTripLimit(0)));
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn test_rejected_tool_call_is_injected() -> anyhow::Result<()> {
        let provider = Arc::new(MockProvider::new(vec![
            Message::assistant()
                .with_text("Searching.")
                .with_tool_request("toolu_2", ToolCall::new("fetch_web_content", json!({}))),
            Message::assistant().with_text("I could not search."),
        ]));

        let exchange = agent(provider.clone(), stub_search(vec![]))
            .reply(&[], "news?")
            .await?;

        assert_eq!(exchange.answer, "I could not search.");
        let injected = provider.requests()[1][1].text();
        assert_eq!(
            injected,
            format!(
                "Searching.{}The tool call failed: no query provided",
                TOOL_RESULT_PREAMBLE
            )
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_history_is_kept_in_order() -> anyhow::Result<()> {
        let provider = Arc::new(MockProvider::new(vec![
            Message::assistant().with_text("Mars has two moons.")
        ]));
        let history = vec![
            Message::user().with_text("Tell me about Mars"),
            Message::assistant().with_text("Mars is the fourth planet."),
        ];

        let exchange = agent(provider.clone(), stub_search(vec![]))
            .reply(&history, "How many moons?")
            .await?;

        let sent = &provider.requests()[0];
        assert_eq!(sent.len(), 3);
        assert_eq!(sent[0], history[0]);
        assert_eq!(sent[1], history[1]);
        assert_eq!(sent[2].text(), "How many moons?");
        assert_eq!(exchange.messages.len(), 4);
        Ok(())
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let provider = Arc::new(MockProvider::new(vec![]));
        let (cancel_tx, cancel_rx) = watch::channel(false);
        cancel_tx.send(true).unwrap();

        let err = agent(provider.clone(), stub_search(vec![]))
            .reply_with_cancel(&[], "anything", cancel_rx)
            .await
            .unwrap_err();

        assert!(matches!(err, AgentError::Cancelled));
        assert_eq!(provider.calls(), 0);
    }

    struct SlowProvider;

    #[async_trait]
    impl Provider for SlowProvider {
        async fn complete(
            &self,
            _system: &str,
            _messages: &[Message],
            _tools: &[Tool],
        ) -> Result<(Message, Usage), ProviderError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok((Message::assistant().with_text("late"), Usage::default()))
        }
    }

    #[tokio::test]
    async fn test_cancel_while_waiting_on_model() {
        let agent = Agent::new(
            Box::new(SlowProvider),
            Box::new(ToolDispatcher::new(stub_search(vec![]))),
            AgentConfig::default(),
        );
        let (cancel_tx, cancel_rx) = watch::channel(false);

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            let _ = cancel_tx.send(true);
        });

        let err = agent
            .reply_with_cancel(&[], "slow", cancel_rx)
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::Cancelled));
    }

    #[tokio::test]
    async fn test_exchange_timeout() {
        let agent = Agent::new(
            Box::new(SlowProvider),
            Box::new(ToolDispatcher::new(stub_search(vec![]))),
            AgentConfig {
                exchange_timeout: Duration::from_millis(50),
                ..AgentConfig::default()
            },
        );

        let err = agent.reply(&[], "slow").await.unwrap_err();
        assert!(matches!(err, AgentError::Timeout(_)));
    }
}
