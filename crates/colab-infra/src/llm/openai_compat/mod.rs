//! OpenAI-compatible LLM provider.
//!
//! Uses [`async_openai`] for request/response handling. Any endpoint that
//! speaks the chat completions protocol works through a custom base URL.

pub mod config;

use async_openai::Client;
use async_openai::config::OpenAIConfig;
use async_openai::types::chat::{
    ChatCompletionRequestAssistantMessage, ChatCompletionRequestAssistantMessageContent,
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessage,
    ChatCompletionRequestSystemMessageContent, ChatCompletionRequestUserMessage,
    ChatCompletionRequestUserMessageContent, CreateChatCompletionRequest, FinishReason,
    StopConfiguration,
};
use secrecy::ExposeSecret;

use colab_core::llm::provider::LlmProvider;
use colab_types::llm::{
    CompletionRequest, CompletionResponse, LlmError, MessageRole, ProviderCapabilities,
    StopReason, Usage,
};

use self::config::OpenAiCompatConfig;

/// Provider for any OpenAI-compatible API.
///
/// Does NOT derive Debug: the `async_openai::Client` holds the API key.
pub struct OpenAiCompatibleProvider {
    client: Client<OpenAIConfig>,
    provider_name: String,
    model: String,
    capabilities: ProviderCapabilities,
}

impl OpenAiCompatibleProvider {
    pub fn new(config: OpenAiCompatConfig) -> Self {
        let openai_config = OpenAIConfig::new()
            .with_api_key(config.api_key.expose_secret())
            .with_api_base(&config.base_url);

        Self {
            client: Client::with_config(openai_config),
            provider_name: config.provider_name,
            model: config.model,
            capabilities: config.capabilities,
        }
    }

    /// Translate a [`CompletionRequest`] into the chat completions body.
    ///
    /// Speaker names ride along on each message when the endpoint accepts
    /// them, so agents in a group chat can tell each other apart.
    fn build_request(&self, request: &CompletionRequest) -> CreateChatCompletionRequest {
        let forward_names = self.capabilities.named_messages;
        let system = request
            .system
            .iter()
            .map(|text| system_message(text.clone(), None));
        let conversation = request.messages.iter().map(|msg| {
            let name = msg.name.clone().filter(|_| forward_names);
            match msg.role {
                MessageRole::System => system_message(msg.content.clone(), name),
                MessageRole::User => {
                    ChatCompletionRequestMessage::User(ChatCompletionRequestUserMessage {
                        content: ChatCompletionRequestUserMessageContent::Text(msg.content.clone()),
                        name,
                    })
                }
                MessageRole::Assistant => assistant_message(msg.content.clone(), name),
            }
        });

        let model = Some(request.model.as_str())
            .filter(|m| !m.is_empty())
            .unwrap_or(&self.model)
            .to_string();
        let stop = request
            .stop_sequences
            .clone()
            .filter(|stops| !stops.is_empty())
            .map(StopConfiguration::StringArray);

        CreateChatCompletionRequest {
            model,
            messages: system.chain(conversation).collect(),
            max_completion_tokens: request.max_tokens,
            temperature: request.temperature.map(|t| t as f32),
            stop,
            ..Default::default()
        }
    }
}

fn system_message(text: String, name: Option<String>) -> ChatCompletionRequestMessage {
    ChatCompletionRequestMessage::System(ChatCompletionRequestSystemMessage {
        content: ChatCompletionRequestSystemMessageContent::Text(text),
        name,
    })
}

#[allow(deprecated)]
fn assistant_message(text: String, name: Option<String>) -> ChatCompletionRequestMessage {
    ChatCompletionRequestMessage::Assistant(ChatCompletionRequestAssistantMessage {
        content: Some(ChatCompletionRequestAssistantMessageContent::Text(text)),
        refusal: None,
        name,
        audio: None,
        tool_calls: None,
        function_call: None,
    })
}

fn stop_reason(finish: Option<&FinishReason>) -> StopReason {
    match finish {
        Some(FinishReason::Length) => StopReason::MaxTokens,
        Some(FinishReason::ContentFilter) => StopReason::ContentFilter,
        _ => StopReason::EndTurn,
    }
}

impl LlmProvider for OpenAiCompatibleProvider {
    fn name(&self) -> &str {
        &self.provider_name
    }

    fn capabilities(&self) -> &ProviderCapabilities {
        &self.capabilities
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let oai_request = self.build_request(request);

        let response = self
            .client
            .chat()
            .create(oai_request)
            .await
            .map_err(map_openai_error)?;

        let choice = response.choices.first();
        let content = choice
            .and_then(|c| c.message.content.clone())
            .unwrap_or_default();
        let usage = response
            .usage
            .map(|u| Usage {
                input_tokens: u.prompt_tokens,
                output_tokens: u.completion_tokens,
            })
            .unwrap_or_default();

        Ok(CompletionResponse {
            id: response.id,
            content,
            model: response.model,
            stop_reason: stop_reason(choice.and_then(|c| c.finish_reason.as_ref())),
            usage,
        })
    }
}

/// Classify an `async_openai` failure.
///
/// Auth, rate-limit and context errors get their own variants. Everything
/// else is a plain provider error.
fn map_openai_error(err: async_openai::error::OpenAIError) -> LlmError {
    use async_openai::error::OpenAIError;

    let provider = |err: &OpenAIError| LlmError::Provider {
        message: err.to_string(),
    };

    match &err {
        OpenAIError::ApiError(api) => {
            let tags = [api.code.as_deref(), api.r#type.as_deref()];
            let tagged = |wanted: &[&str]| tags.iter().flatten().any(|t| wanted.contains(t));

            if tagged(&["authentication_error", "invalid_api_key"])
                || api.message.contains("Incorrect API key")
            {
                LlmError::AuthenticationFailed
            } else if tagged(&["rate_limit_exceeded", "rate_limit_error"]) {
                LlmError::RateLimited {
                    retry_after_ms: None,
                }
            } else if tagged(&["context_length_exceeded"])
                || api.message.contains("maximum context length")
            {
                LlmError::ContextLengthExceeded {
                    max: 0,
                    requested: 0,
                }
            } else {
                provider(&err)
            }
        }
        OpenAIError::Reqwest(http) => match http.status().map(|s| s.as_u16()) {
            Some(401) => LlmError::AuthenticationFailed,
            Some(429) => LlmError::RateLimited {
                retry_after_ms: None,
            },
            _ => provider(&err),
        },
        OpenAIError::JSONDeserialize(_, body) => {
            LlmError::Deserialization(format!("unexpected response body: {body}"))
        }
        OpenAIError::InvalidArgument(msg) => LlmError::InvalidRequest(msg.clone()),
        _ => provider(&err),
    }
}
