//! An LLM-backed participant in an exchange.

use tracing::{Instrument, debug, info_span};

use colab_types::chat::Turn;
use colab_types::llm::{CompletionRequest, LlmError, Message};

use crate::llm::box_provider::BoxLlmProvider;

use super::factory::ModelSettings;

/// A participant whose turns are produced by the model.
///
/// Holds no conversation state; the caller passes the shared history on each
/// call, so the same agent can sit in several exchanges.
#[derive(Debug, Clone)]
pub struct AssistantAgent {
    name: String,
    description: String,
    system_message: String,
    settings: ModelSettings,
}

impl AssistantAgent {
    /// `name` must already be restricted to `[A-Za-z0-9_-]`.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        system_message: impl Into<String>,
        settings: ModelSettings,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            system_message: system_message.into(),
            settings,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Short role description shown to the manager during speaker selection.
    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn system_message(&self) -> &str {
        &self.system_message
    }

    /// Build the request this agent would send for `history`.
    ///
    /// The agent's own turns become assistant messages. Everyone else's become
    /// user messages tagged with the speaker's name. Empty turns are skipped.
    pub fn build_request(&self, history: &[Turn]) -> CompletionRequest {
        let messages = history
            .iter()
            .filter(|turn| !turn.is_empty())
            .map(|turn| {
                if turn.speaker == self.name {
                    Message::assistant(turn.content.clone())
                } else {
                    Message::user(turn.content.clone()).with_name(turn.speaker.clone())
                }
            })
            .collect();

        CompletionRequest {
            model: self.settings.model.clone(),
            messages,
            system: Some(self.system_message.clone()),
            max_tokens: self.settings.max_tokens,
            temperature: Some(self.settings.temperature),
            stop_sequences: None,
        }
    }

    /// Produce this agent's next turn.
    pub async fn generate_reply(
        &self,
        provider: &BoxLlmProvider,
        history: &[Turn],
    ) -> Result<String, LlmError> {
        let request = self.build_request(history);

        let span = info_span!(
            "gen_ai.chat",
            gen_ai.system = provider.name(),
            gen_ai.agent.name = %self.name,
            gen_ai.request.model = %request.model,
            gen_ai.request.temperature = ?request.temperature,
        );

        let response = provider
            .complete_with_timeout(&request, self.settings.timeout)
            .instrument(span)
            .await?;

        debug!(
            agent = %self.name,
            input_tokens = response.usage.input_tokens,
            output_tokens = response.usage.output_tokens,
            stop_reason = %response.stop_reason,
            "Agent replied"
        );

        Ok(response.content)
    }
}
