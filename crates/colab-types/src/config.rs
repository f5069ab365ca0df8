//! Global configuration types for Agent Colab.
//!
//! `GlobalConfig` represents the top-level `colab.toml`. Every section and
//! field has a default, so an empty file (or no file) is a valid config.

use serde::{Deserialize, Serialize};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub llm: LlmSettings,
    #[serde(default)]
    pub orchestration: OrchestrationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// sqlx connection URL. Defaults to `colab.db` inside the data directory.
    #[serde(default)]
    pub url: Option<String>,
}

/// Static model parameters shared by every agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmSettings {
    /// Override for the OpenAI-compatible endpoint.
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default)]
    pub temperature: f64,
    #[serde(default)]
    pub max_tokens: Option<u32>,
    /// Upper bound on a single provider call, applied on every path.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Name of the environment variable holding the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
}

fn default_model() -> String {
    "gpt-4o".to_string()
}

fn default_request_timeout_secs() -> u64 {
    120
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            base_url: None,
            model: default_model(),
            temperature: 0.0,
            max_tokens: None,
            request_timeout_secs: default_request_timeout_secs(),
            api_key_env: default_api_key_env(),
        }
    }
}

/// How the group chat picks the next speaker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeakerSelection {
    /// Ask the model, acting as the chat manager, to pick the next role.
    #[default]
    Auto,
    /// Cycle through the assistants in order.
    RoundRobin,
}

/// Limits and names for agent exchanges.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestrationConfig {
    /// Maximum messages in one exchange, counting the initial user message.
    #[serde(default = "default_max_rounds")]
    pub max_rounds: u32,
    /// Auto-replies the user proxy may send in a single-agent exchange.
    #[serde(default = "default_max_consecutive_auto_reply")]
    pub max_consecutive_auto_reply: u32,
    #[serde(default = "default_termination_phrase")]
    pub termination_phrase: String,
    #[serde(default)]
    pub speaker_selection: SpeakerSelection,
    #[serde(default = "default_proxy_name")]
    pub proxy_name: String,
    /// Text the proxy sends when asked to reply without a human. Empty
    /// replies are kept out of transcripts and model context.
    #[serde(default)]
    pub proxy_auto_reply: String,
    #[serde(default = "default_assistant_name")]
    pub default_assistant_name: String,
}

fn default_max_rounds() -> u32 {
    12
}

fn default_max_consecutive_auto_reply() -> u32 {
    2
}

fn default_termination_phrase() -> String {
    "TERMINATE".to_string()
}

fn default_proxy_name() -> String {
    "User_proxy".to_string()
}

fn default_assistant_name() -> String {
    "MultiTalentAgent".to_string()
}

impl Default for OrchestrationConfig {
    fn default() -> Self {
        Self {
            max_rounds: default_max_rounds(),
            max_consecutive_auto_reply: default_max_consecutive_auto_reply(),
            termination_phrase: default_termination_phrase(),
            speaker_selection: SpeakerSelection::default(),
            proxy_name: default_proxy_name(),
            proxy_auto_reply: String::new(),
            default_assistant_name: default_assistant_name(),
        }
    }
}
