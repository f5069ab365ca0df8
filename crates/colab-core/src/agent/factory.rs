//! Builds participants from stored definitions plus static model settings.

use std::time::Duration;

use colab_types::agent::{AgentDefinition, AgentId};
use colab_types::config::{LlmSettings, OrchestrationConfig};
use colab_types::error::OrchestrationError;
use colab_types::team::TEAM_SIZE;

use tracing::warn;

use super::assistant::AssistantAgent;
use super::prompt::{default_assistant_prompt, no_termination_suffix};

/// Model parameters shared by every agent the factory builds.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSettings {
    pub model: String,
    pub temperature: f64,
    pub max_tokens: Option<u32>,
    /// Bound on each provider call.
    pub timeout: Duration,
}

impl From<&LlmSettings> for ModelSettings {
    fn from(settings: &LlmSettings) -> Self {
        Self {
            model: settings.model.clone(),
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
            timeout: Duration::from_secs(settings.request_timeout_secs),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AgentFactory {
    settings: ModelSettings,
    termination_phrase: String,
    default_assistant_name: String,
}

impl AgentFactory {
    pub fn new(llm: &LlmSettings, orchestration: &OrchestrationConfig) -> Self {
        Self {
            settings: ModelSettings::from(llm),
            termination_phrase: orchestration.termination_phrase.clone(),
            default_assistant_name: orchestration.default_assistant_name.clone(),
        }
    }

    pub fn settings(&self) -> &ModelSettings {
        &self.settings
    }

    /// The general-purpose assistant used for single-agent chats.
    pub fn default_assistant(&self) -> AssistantAgent {
        AssistantAgent::new(
            self.default_assistant_name.clone(),
            "A general-purpose assistant",
            default_assistant_prompt(&self.termination_phrase),
            self.settings.clone(),
        )
    }

    /// A team member built from a stored definition.
    ///
    /// The stored temperature is ignored in favour of the shared settings.
    pub fn team_member(&self, definition: &AgentDefinition) -> AssistantAgent {
        self.member_named(definition, definition.participant_name())
    }

    fn member_named(&self, definition: &AgentDefinition, name: String) -> AssistantAgent {
        let system_message = format!(
            "{} {}",
            definition.instructions,
            no_termination_suffix(&self.termination_phrase)
        );
        AssistantAgent::new(
            name,
            definition.specialisation.clone(),
            system_message,
            self.settings.clone(),
        )
    }

    /// Build the three members of a team, in the order they were requested.
    ///
    /// `definitions` is whatever the lookup returned. Unless every requested
    /// id resolves to a distinct definition, this fails with
    /// [`OrchestrationError::IncompleteTeam`]. Repeating an id counts once.
    ///
    /// Specialisations that sanitize to the same name get a numeric suffix
    /// (`Data_Analyst`, `Data_Analyst_2`) so speaker selection can tell the
    /// members apart.
    pub fn team(
        &self,
        requested: &[AgentId; TEAM_SIZE],
        definitions: &[AgentDefinition],
    ) -> Result<Vec<AssistantAgent>, OrchestrationError> {
        let mut seen: Vec<AgentId> = Vec::with_capacity(TEAM_SIZE);
        let mut members = Vec::with_capacity(TEAM_SIZE);

        for id in requested {
            if seen.contains(id) {
                continue;
            }
            seen.push(*id);
            if let Some(definition) = definitions.iter().find(|d| d.id == *id) {
                let name = unique_name(&members, definition.participant_name());
                if name != definition.participant_name() {
                    warn!(
                        agent_id = %definition.id,
                        specialisation = %definition.specialisation,
                        name = %name,
                        "Participant name already taken in team, renamed"
                    );
                }
                members.push(self.member_named(definition, name));
            }
        }

        if members.len() != TEAM_SIZE {
            return Err(OrchestrationError::IncompleteTeam {
                expected: TEAM_SIZE,
                found: members.len(),
            });
        }
        Ok(members)
    }
}

fn unique_name(members: &[AssistantAgent], base: String) -> String {
    let taken = |candidate: &str| members.iter().any(|m| m.name() == candidate);
    if !taken(&base) {
        return base;
    }
    let mut n = 2;
    loop {
        let candidate = format!("{base}_{n}");
        if !taken(&candidate) {
            return candidate;
        }
        n += 1;
    }
}
