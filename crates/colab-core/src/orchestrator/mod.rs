//! Bounded multi-agent exchanges.
//!
//! `ChatOrchestrator` opens rooms (building agents through the factory) and
//! runs one exchange per user message. Each produced turn is appended to the
//! room history first and then handed to the injected [`sink::MessageSink`]
//! (process-then-emit). The round cap comes from configuration only.

pub mod room;
pub mod selection;
pub mod sink;
pub mod termination;

use std::sync::Arc;

use tracing::{debug, info};

use colab_types::chat::Turn;
use colab_types::config::OrchestrationConfig;
use colab_types::error::OrchestrationError;
use colab_types::session::{Room, ServerEvent};

use crate::agent::assistant::AssistantAgent;
use crate::agent::factory::AgentFactory;
use crate::llm::box_provider::BoxLlmProvider;
use crate::repository::agent::AgentRepository;

use room::{ChatRoom, Exchange, ExchangeOutcome, Participants};
use selection::SpeakerSelector;
use sink::{MessageSink, NullSink};
use termination::is_termination;

pub struct ChatOrchestrator<A: AgentRepository> {
    agents: Arc<A>,
    provider: Arc<BoxLlmProvider>,
    factory: AgentFactory,
    config: OrchestrationConfig,
}

impl<A: AgentRepository> ChatOrchestrator<A> {
    pub fn new(
        agents: Arc<A>,
        provider: Arc<BoxLlmProvider>,
        factory: AgentFactory,
        config: OrchestrationConfig,
    ) -> Self {
        Self {
            agents,
            provider,
            factory,
            config,
        }
    }

    pub fn config(&self) -> &OrchestrationConfig {
        &self.config
    }

    /// Build the agents for `room`.
    ///
    /// Team rooms look up their three definitions. Anything short of three
    /// distinct rows is an [`OrchestrationError::IncompleteTeam`].
    pub async fn open_room(&self, room: Room) -> Result<ChatRoom, OrchestrationError> {
        let participants = match room {
            Room::Single => Participants::Single(self.factory.default_assistant()),
            Room::Team { agents } => {
                let definitions = self
                    .agents
                    .get_many(&agents)
                    .await
                    .map_err(|e| OrchestrationError::Lookup(e.to_string()))?;
                Participants::Group(self.factory.team(&agents, &definitions)?)
            }
        };
        debug!(?room, "Opened chat room");
        Ok(ChatRoom::new(room, participants))
    }

    /// Open a throwaway room, run one exchange and return it.
    pub async fn chat_once(&self, room: Room, message: &str) -> Result<Exchange, OrchestrationError> {
        let mut chat_room = self.open_room(room).await?;
        self.run(&mut chat_room, message, &NullSink).await
    }

    /// Run one exchange for `message` in `room`.
    ///
    /// On error the room history is rolled back to where it was before the
    /// call. Turns already emitted to `sink` stay emitted.
    pub async fn run(
        &self,
        room: &mut ChatRoom,
        message: &str,
        sink: &dyn MessageSink,
    ) -> Result<Exchange, OrchestrationError> {
        if message.trim().is_empty() {
            return Err(OrchestrationError::EmptyMessage);
        }

        let start = room.history.len();
        let last_speaker = room.last_speaker;
        room.history
            .push(Turn::new(self.config.proxy_name.clone(), message));

        let result = match &room.participants {
            Participants::Single(agent) => {
                self.run_two_party(agent, &mut room.history, sink).await
            }
            Participants::Group(agents) => {
                self.run_group(agents, &mut room.history, &mut room.last_speaker, sink)
                    .await
            }
        };

        match result {
            Ok(outcome) => {
                let turns = room.history[start..].to_vec();
                info!(
                    room = ?room.room,
                    turns = turns.len(),
                    ?outcome,
                    "Exchange finished"
                );
                Ok(Exchange { turns, outcome })
            }
            Err(e) => {
                room.history.truncate(start);
                room.last_speaker = last_speaker;
                Err(e)
            }
        }
    }

    /// Proxy and assistant alternate until the assistant terminates, the
    /// proxy runs out of auto-replies, or the round cap is hit.
    async fn run_two_party(
        &self,
        agent: &AssistantAgent,
        history: &mut Vec<Turn>,
        sink: &dyn MessageSink,
    ) -> Result<ExchangeOutcome, OrchestrationError> {
        let max_rounds = self.config.max_rounds;
        let mut rounds: u32 = 1;
        let mut auto_replies: u32 = 0;

        loop {
            if rounds >= max_rounds {
                return Ok(ExchangeOutcome::RoundLimit);
            }

            let reply = agent.generate_reply(&self.provider, history).await?;
            rounds += 1;
            let terminated = is_termination(&reply, &self.config.termination_phrase);
            record_turn(history, sink, agent.name(), reply);

            if terminated {
                return Ok(ExchangeOutcome::Terminated);
            }
            if auto_replies >= self.config.max_consecutive_auto_reply {
                return Ok(ExchangeOutcome::AutoReplyExhausted);
            }
            if rounds >= max_rounds {
                return Ok(ExchangeOutcome::RoundLimit);
            }

            auto_replies += 1;
            rounds += 1;
            history.push(Turn::new(
                self.config.proxy_name.clone(),
                self.config.proxy_auto_reply.clone(),
            ));
        }
    }

    /// A speaker is selected each round until one terminates or the round
    /// cap is hit.
    async fn run_group(
        &self,
        agents: &[AssistantAgent],
        history: &mut Vec<Turn>,
        last_speaker: &mut Option<usize>,
        sink: &dyn MessageSink,
    ) -> Result<ExchangeOutcome, OrchestrationError> {
        let selector = SpeakerSelector {
            mode: self.config.speaker_selection,
            provider: &self.provider,
            settings: self.factory.settings(),
        };
        let mut rounds: u32 = 1;

        loop {
            if rounds >= self.config.max_rounds {
                return Ok(ExchangeOutcome::RoundLimit);
            }

            let index = selector.next(agents, history, *last_speaker).await?;
            let agent = &agents[index];
            let reply = agent.generate_reply(&self.provider, history).await?;
            rounds += 1;
            *last_speaker = Some(index);

            let terminated = is_termination(&reply, &self.config.termination_phrase);
            record_turn(history, sink, agent.name(), reply);

            if terminated {
                return Ok(ExchangeOutcome::Terminated);
            }
        }
    }
}

/// Append a produced turn, then emit it.
fn record_turn(history: &mut Vec<Turn>, sink: &dyn MessageSink, speaker: &str, content: String) {
    history.push(Turn::new(speaker, content.clone()));
    if !content.is_empty() {
        sink.emit(ServerEvent::AgentMessage {
            name: speaker.to_string(),
            content,
        });
    }
}
