use config::{Config, Environment, File};
use scout::config::{
    classify, AgentSettings, ConfigError, ProviderSettings, SearchSettings, CONFIG_FILE, ENV_PREFIX,
};
use scout::providers::configs::ANTHROPIC_MODEL;
use scout::tool_server::DEFAULT_TOOL_SERVER_URL;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct ToolServerSettings {
    #[serde(default = "default_tool_server_url")]
    pub url: String,
    #[serde(default = "default_tool_server_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ToolServerSettings {
    fn default() -> Self {
        Self {
            url: default_tool_server_url(),
            timeout_secs: default_tool_server_timeout_secs(),
        }
    }
}

impl ToolServerSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub provider: ProviderSettings,
    #[serde(default)]
    pub agent: AgentSettings,
    #[serde(default)]
    pub tool_server: ToolServerSettings,
    #[serde(default)]
    pub search: SearchSettings,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        // Seeding the provider table makes a missing key report as api_key, not provider
        let config = Config::builder()
            .set_default("provider.model", ANTHROPIC_MODEL)?
            .set_default("tool_server.url", default_tool_server_url())?
            .add_source(File::with_name(CONFIG_FILE).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("provider.api_key", non_empty_var("CLAUDE_API_KEY"))?
            .set_override_option("tool_server.url", non_empty_var("MCP_SERVER_URL"))?
            .build()?;

        config.try_deserialize().map_err(classify)
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.is_empty())
}

fn default_tool_server_url() -> String {
    DEFAULT_TOOL_SERVER_URL.to_string()
}

fn default_tool_server_timeout_secs() -> u64 {
    10
}
