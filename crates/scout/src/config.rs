//! Settings shared by the binaries, deserialized from a layered `config::Config`.
//!
//! Each binary builds its own `Config` (defaults, an optional `scout.toml`, then `SCOUT_*`
//! variables, then the legacy variable names) and pulls these sections out of it.
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

use crate::agent::{AgentConfig, DEFAULT_MAX_LLM_CALLS};
use crate::providers::configs::{AnthropicProviderConfig, ANTHROPIC_HOST, ANTHROPIC_MODEL};
use crate::search::{DuckDuckGoConfig, DUCKDUCKGO_ENDPOINT};

pub const ENV_PREFIX: &str = "SCOUT";

/// Optional settings file (`scout.toml`) read from the working directory
pub const CONFIG_FILE: &str = "scout";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable: {env_var}")]
    MissingEnvVar { env_var: String },

    #[error("Configuration error: {0}")]
    Other(#[from] config::ConfigError),
}

/// Map a settings field to the environment variable that sets it
pub fn to_env_var(field: &str) -> String {
    match field {
        "api_key" | "provider.api_key" => "CLAUDE_API_KEY".to_string(),
        _ => format!("{}_{}", ENV_PREFIX, field.replace('.', "__")).to_uppercase(),
    }
}

/// Turn a deserialization failure into a message that names the variable to set
pub fn classify(err: config::ConfigError) -> ConfigError {
    tracing::debug!("Configuration error: {:?}", &err);

    let error_str = err.to_string();
    if error_str.starts_with("missing field") {
        // "missing field `api_key`" possibly followed by a location
        let field = error_str
            .trim_start_matches("missing field `")
            .split('`')
            .next()
            .unwrap_or_default();
        ConfigError::MissingEnvVar {
            env_var: to_env_var(field),
        }
    } else if let config::ConfigError::NotFound(field) = &err {
        ConfigError::MissingEnvVar {
            env_var: to_env_var(field),
        }
    } else {
        ConfigError::Other(err)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProviderSettings {
    pub api_key: String,
    #[serde(default = "default_anthropic_host")]
    pub host: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default)]
    pub temperature: Option<f32>,
    #[serde(default)]
    pub max_tokens: Option<i32>,
    #[serde(default = "default_provider_timeout_secs")]
    pub timeout_secs: u64,
}

impl ProviderSettings {
    pub fn into_config(self) -> AnthropicProviderConfig {
        AnthropicProviderConfig {
            host: self.host,
            api_key: self.api_key,
            model: self.model,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchSettings {
    #[serde(default = "default_search_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_search_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            endpoint: default_search_endpoint(),
            timeout_secs: default_search_timeout_secs(),
        }
    }
}

impl SearchSettings {
    pub fn into_config(self) -> DuckDuckGoConfig {
        DuckDuckGoConfig {
            endpoint: self.endpoint,
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AgentSettings {
    #[serde(default)]
    pub system_prompt: String,
    #[serde(default = "default_max_llm_calls")]
    pub max_llm_calls: usize,
    #[serde(default = "default_exchange_timeout_secs")]
    pub exchange_timeout_secs: u64,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            system_prompt: String::new(),
            max_llm_calls: default_max_llm_calls(),
            exchange_timeout_secs: default_exchange_timeout_secs(),
        }
    }
}

impl AgentSettings {
    pub fn into_config(self) -> AgentConfig {
        AgentConfig {
            system_prompt: self.system_prompt,
            max_llm_calls: self.max_llm_calls,
            exchange_timeout: Duration::from_secs(self.exchange_timeout_secs),
        }
    }
}

fn default_anthropic_host() -> String {
    ANTHROPIC_HOST.to_string()
}

fn default_model() -> String {
    ANTHROPIC_MODEL.to_string()
}

fn default_provider_timeout_secs() -> u64 {
    30
}

fn default_search_endpoint() -> String {
    DUCKDUCKGO_ENDPOINT.to_string()
}

fn default_search_timeout_secs() -> u64 {
    5
}

fn default_max_llm_calls() -> usize {
    DEFAULT_MAX_LLM_CALLS
}

fn default_exchange_timeout_secs() -> u64 {
    120
}
