//! LLM provider construction.

pub mod openai_compat;

use secrecy::SecretString;

use colab_core::llm::box_provider::BoxLlmProvider;
use colab_types::config::LlmSettings;
use colab_types::llm::LlmError;

use self::openai_compat::OpenAiCompatibleProvider;

/// Create the configured provider.
///
/// Fails with [`LlmError::AuthenticationFailed`] when no API key was resolved.
pub fn create_provider(
    settings: &LlmSettings,
    api_key: Option<SecretString>,
) -> Result<BoxLlmProvider, LlmError> {
    let key = api_key.ok_or(LlmError::AuthenticationFailed)?;
    let config = openai_compat::config::from_settings(settings, key);
    tracing::info!(
        provider = %config.provider_name,
        model = %config.model,
        base_url = %config.base_url,
        "LLM provider configured"
    );
    Ok(BoxLlmProvider::new(OpenAiCompatibleProvider::new(config)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_provider_requires_key() {
        let result = create_provider(&LlmSettings::default(), None);
        assert!(matches!(result, Err(LlmError::AuthenticationFailed)));
    }

    #[test]
    fn test_create_provider_with_key() {
        let provider =
            create_provider(&LlmSettings::default(), Some(SecretString::from("sk-test".to_string()))).unwrap();
        assert_eq!(provider.name(), "openai");
    }
}
