//! Configuration for OpenAI-compatible providers.

use secrecy::SecretString;

use colab_types::config::LlmSettings;
use colab_types::llm::ProviderCapabilities;

pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Configuration used to construct an [`super::OpenAiCompatibleProvider`].
///
/// Does not derive `Debug`; the key is only exposed when building the client.
pub struct OpenAiCompatConfig {
    /// Human-readable provider name (e.g. "openai").
    pub provider_name: String,
    pub base_url: String,
    pub api_key: SecretString,
    /// Model used when a request leaves its model empty.
    pub model: String,
    pub capabilities: ProviderCapabilities,
}

/// OpenAI defaults: 128K context, 16K output, named messages supported.
pub fn openai_defaults(api_key: SecretString, model: &str) -> OpenAiCompatConfig {
    OpenAiCompatConfig {
        provider_name: "openai".into(),
        base_url: OPENAI_BASE_URL.into(),
        api_key,
        model: model.into(),
        capabilities: ProviderCapabilities {
            named_messages: true,
            max_context_tokens: 128_000,
            max_output_tokens: 16_384,
        },
    }
}

/// Build a config from `[llm]` settings.
///
/// A custom `base_url` points at any OpenAI-compatible endpoint and is
/// reported under the provider name "openai_compatible".
pub fn from_settings(settings: &LlmSettings, api_key: SecretString) -> OpenAiCompatConfig {
    let mut config = openai_defaults(api_key, &settings.model);
    if let Some(base_url) = settings.base_url.as_deref() {
        config.provider_name = "openai_compatible".into();
        config.base_url = base_url.trim_end_matches('/').to_string();
    }
    config
}
