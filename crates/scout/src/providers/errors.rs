use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Could not reach the LLM API: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Server error: {0}")]
    ServerError(StatusCode),

    #[error("Request failed: {status} - {body}")]
    RequestFailed { status: StatusCode, body: String },

    #[error("Invalid response format from Anthropic API: {0}")]
    MalformedResponse(String),
}
