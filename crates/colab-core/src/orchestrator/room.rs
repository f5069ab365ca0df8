//! A configured set of participants plus their shared history.

use serde::Serialize;

use colab_types::chat::{Turn, transcript_lines};
use colab_types::session::{ProcessingStatus, Room};

use crate::agent::assistant::AssistantAgent;

/// Participants of a room, not counting the user proxy.
#[derive(Debug, Clone)]
pub enum Participants {
    /// Two-party chat between the proxy and one assistant.
    Single(AssistantAgent),
    /// Group chat where a speaker is selected each round.
    Group(Vec<AssistantAgent>),
}

/// Live agents for one conversation.
///
/// History is kept across exchanges so a session can continue where it left
/// off. The round cap applies to each exchange separately.
#[derive(Debug, Clone)]
pub struct ChatRoom {
    pub(crate) room: Room,
    pub(crate) participants: Participants,
    pub(crate) history: Vec<Turn>,
    /// Index into the group of the agent that spoke last.
    pub(crate) last_speaker: Option<usize>,
}

impl ChatRoom {
    pub fn new(room: Room, participants: Participants) -> Self {
        Self {
            room,
            participants,
            history: Vec::new(),
            last_speaker: None,
        }
    }

    pub fn room(&self) -> Room {
        self.room
    }

    pub fn participants(&self) -> &Participants {
        &self.participants
    }

    pub fn history(&self) -> &[Turn] {
        &self.history
    }
}

/// Why an exchange stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExchangeOutcome {
    /// A participant ended its turn with the termination phrase.
    Terminated,
    /// The round cap was reached.
    RoundLimit,
    /// The user proxy used all of its auto-replies.
    AutoReplyExhausted,
}

impl ExchangeOutcome {
    /// Final status reported to a real-time client.
    pub fn status(self) -> ProcessingStatus {
        match self {
            ExchangeOutcome::Terminated => ProcessingStatus::CompletedTerminated,
            ExchangeOutcome::RoundLimit => ProcessingStatus::CompletedWaitingNext,
            ExchangeOutcome::AutoReplyExhausted => ProcessingStatus::Completed,
        }
    }
}

/// The turns produced by one exchange, starting with the user's message.
#[derive(Debug, Clone)]
pub struct Exchange {
    pub turns: Vec<Turn>,
    pub outcome: ExchangeOutcome,
}

impl Exchange {
    /// Non-empty turns formatted as `"{name}\n{content}"`, in order.
    pub fn transcript(&self) -> Vec<String> {
        transcript_lines(&self.turns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_status_mapping() {
        assert_eq!(
            ExchangeOutcome::Terminated.status(),
            ProcessingStatus::CompletedTerminated
        );
        assert_eq!(
            ExchangeOutcome::RoundLimit.status(),
            ProcessingStatus::CompletedWaitingNext
        );
        assert_eq!(
            ExchangeOutcome::AutoReplyExhausted.status(),
            ProcessingStatus::Completed
        );
    }

    #[test]
    fn test_exchange_transcript_skips_empty() {
        let exchange = Exchange {
            turns: vec![
                Turn::new("User_proxy", "hi"),
                Turn::new("MultiTalentAgent", "hello"),
                Turn::new("User_proxy", ""),
            ],
            outcome: ExchangeOutcome::AutoReplyExhausted,
        };
        assert_eq!(
            exchange.transcript(),
            vec!["User_proxy\nhi".to_string(), "MultiTalentAgent\nhello".to_string()]
        );
    }
}
