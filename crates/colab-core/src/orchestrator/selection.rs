//! Next-speaker selection for group chats.

use std::cmp::Reverse;

use tracing::{Instrument, debug, info_span, warn};

use colab_types::chat::Turn;
use colab_types::config::SpeakerSelection;
use colab_types::llm::{CompletionRequest, LlmError, Message};

use crate::agent::assistant::AssistantAgent;
use crate::agent::factory::ModelSettings;
use crate::agent::prompt::{MANAGER_SYSTEM_PROMPT, speaker_selection_prompt};
use crate::llm::box_provider::BoxLlmProvider;

/// Index of the agent after `last`, wrapping around.
pub fn round_robin(agent_count: usize, last: Option<usize>) -> usize {
    match last {
        Some(i) if agent_count > 0 => (i + 1) % agent_count,
        _ => 0,
    }
}

/// Find the agent named in a manager reply.
///
/// An exact (trimmed) match wins. Otherwise the name that appears earliest
/// in the reply is taken, the longest one when several start at the same
/// offset. Returns `None` when no name appears.
pub fn parse_selection(reply: &str, agents: &[AssistantAgent]) -> Option<usize> {
    let reply = reply.trim();
    if let Some(i) = agents.iter().position(|a| a.name() == reply) {
        return Some(i);
    }
    agents
        .iter()
        .enumerate()
        .filter_map(|(i, a)| reply.find(a.name()).map(|pos| (pos, i)))
        .min_by_key(|&(pos, i)| (pos, Reverse(agents[i].name().len())))
        .map(|(_, i)| i)
}

/// Picks speakers for one group chat.
pub struct SpeakerSelector<'a> {
    pub mode: SpeakerSelection,
    pub provider: &'a BoxLlmProvider,
    pub settings: &'a ModelSettings,
}

impl SpeakerSelector<'_> {
    /// Choose who speaks after `last`.
    ///
    /// In auto mode a reply that names no agent falls back to round-robin.
    /// Provider failures are returned as errors.
    pub async fn next(
        &self,
        agents: &[AssistantAgent],
        history: &[Turn],
        last: Option<usize>,
    ) -> Result<usize, LlmError> {
        if self.mode == SpeakerSelection::RoundRobin || agents.len() < 2 {
            return Ok(round_robin(agents.len(), last));
        }

        let request = self.build_request(agents, history);
        let span = info_span!(
            "gen_ai.select_speaker",
            gen_ai.system = self.provider.name(),
            gen_ai.request.model = %request.model,
        );
        let response = self
            .provider
            .complete_with_timeout(&request, self.settings.timeout)
            .instrument(span)
            .await?;

        match parse_selection(&response.content, agents) {
            Some(i) => {
                debug!(speaker = agents[i].name(), "Manager selected speaker");
                Ok(i)
            }
            None => {
                let fallback = round_robin(agents.len(), last);
                warn!(
                    reply = %response.content,
                    fallback = agents[fallback].name(),
                    "Manager reply named no agent, using round-robin"
                );
                Ok(fallback)
            }
        }
    }

    fn build_request(&self, agents: &[AssistantAgent], history: &[Turn]) -> CompletionRequest {
        let roles: Vec<(String, String)> = agents
            .iter()
            .map(|a| (a.name().to_string(), a.description().to_string()))
            .collect();

        let mut messages: Vec<Message> = history
            .iter()
            .filter(|turn| !turn.is_empty())
            .map(|turn| Message::user(turn.content.clone()).with_name(turn.speaker.clone()))
            .collect();
        messages.push(Message::user(speaker_selection_prompt(&roles)));

        CompletionRequest {
            model: self.settings.model.clone(),
            messages,
            system: Some(MANAGER_SYSTEM_PROMPT.to_string()),
            max_tokens: self.settings.max_tokens,
            temperature: Some(self.settings.temperature),
            stop_sequences: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::scripted::ScriptedProvider;
    use std::time::Duration;

    fn settings() -> ModelSettings {
        ModelSettings {
            model: "gpt-4o".to_string(),
            temperature: 0.0,
            max_tokens: None,
            timeout: Duration::from_secs(10),
        }
    }

    fn agents() -> Vec<AssistantAgent> {
        ["Planner", "Coder", "Tester"]
            .into_iter()
            .map(|n| AssistantAgent::new(n, format!("the {n}"), "", settings()))
            .collect()
    }

    #[test]
    fn test_round_robin_wraps() {
        assert_eq!(round_robin(3, None), 0);
        assert_eq!(round_robin(3, Some(0)), 1);
        assert_eq!(round_robin(3, Some(2)), 0);
        assert_eq!(round_robin(0, Some(2)), 0);
    }

    #[test]
    fn test_parse_selection_exact_and_embedded() {
        let agents = agents();
        assert_eq!(parse_selection(" Coder \n", &agents), Some(1));
        assert_eq!(parse_selection("Next should be Tester, then Coder", &agents), Some(2));
        assert_eq!(parse_selection("nobody", &agents), None);
    }

    #[test]
    fn test_parse_selection_prefers_longest_name_at_same_offset() {
        let agents: Vec<AssistantAgent> = ["Code", "Coder"]
            .into_iter()
            .map(|n| AssistantAgent::new(n, n, "", settings()))
            .collect();
        assert_eq!(parse_selection("Coder, go ahead", &agents), Some(1));
        assert_eq!(parse_selection("Code review first", &agents), Some(0));
    }

    #[tokio::test]
    async fn test_auto_selection_uses_manager_reply() {
        let scripted = ScriptedProvider::new(["Tester"]);
        let provider = BoxLlmProvider::new(scripted.clone());
        let settings = settings();
        let selector = SpeakerSelector {
            mode: SpeakerSelection::Auto,
            provider: &provider,
            settings: &settings,
        };

        let history = vec![Turn::new("User_proxy", "ship it")];
        let next = selector.next(&agents(), &history, None).await.unwrap();
        assert_eq!(next, 2);

        let request = &scripted.requests()[0];
        assert_eq!(request.system.as_deref(), Some(MANAGER_SYSTEM_PROMPT));
        let last = request.messages.last().unwrap();
        assert!(last.content.contains("[Planner, Coder, Tester]"));
    }

    #[tokio::test]
    async fn test_auto_selection_falls_back_to_round_robin() {
        let provider = BoxLlmProvider::new(ScriptedProvider::new(["I am not sure"]));
        let settings = settings();
        let selector = SpeakerSelector {
            mode: SpeakerSelection::Auto,
            provider: &provider,
            settings: &settings,
        };

        let next = selector.next(&agents(), &[], Some(0)).await.unwrap();
        assert_eq!(next, 1);
    }

    #[tokio::test]
    async fn test_round_robin_mode_makes_no_provider_call() {
        let scripted = ScriptedProvider::default();
        let provider = BoxLlmProvider::new(scripted.clone());
        let settings = settings();
        let selector = SpeakerSelector {
            mode: SpeakerSelection::RoundRobin,
            provider: &provider,
            settings: &settings,
        };

        assert_eq!(selector.next(&agents(), &[], Some(1)).await.unwrap(), 2);
        assert!(scripted.requests().is_empty());
    }
}
