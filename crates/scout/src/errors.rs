use std::time::Duration;
use thiserror::Error;

use crate::providers::errors::ProviderError;

#[non_exhaustive]
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("LLM request failed: {0}")]
    Provider(#[from] ProviderError),

    #[error("Tool execution failed: {0}")]
    ExecutionError(String),

    #[error("Model kept requesting tool calls after {0} LLM calls")]
    RoundTripLimit(usize),

    #[error("Exchange timed out after {0:?}")]
    Timeout(Duration),

    #[error("Exchange cancelled")]
    Cancelled,
}

pub type AgentResult<T> = Result<T, AgentError>;
