//! Chat transcripts and conversation turns.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A stored conversation.
///
/// The content is an opaque text blob. Saving under an existing name creates
/// a new row rather than updating the old one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTranscript {
    pub id: i64,
    pub owner_email: String,
    pub chat_name: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewChatTranscript {
    pub owner_email: String,
    pub chat_name: String,
    pub content: String,
}

/// Name and id of a stored transcript, for listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatSummary {
    pub id: i64,
    pub chat_name: String,
}

/// A single message produced during an exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    /// Participant name (already sanitized).
    pub speaker: String,
    pub content: String,
}

impl Turn {
    pub fn new(speaker: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            speaker: speaker.into(),
            content: content.into(),
        }
    }

    /// True when the turn carries no text (e.g. an empty auto-reply).
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// `"{speaker}\n{content}"`, the format returned to clients.
    pub fn transcript_line(&self) -> String {
        format!("{}\n{}", self.speaker, self.content)
    }
}

/// Collect the non-empty turns into transcript lines, preserving order.
pub fn transcript_lines(turns: &[Turn]) -> Vec<String> {
    turns
        .iter()
        .filter(|t| !t.is_empty())
        .map(Turn::transcript_line)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transcript_line_format() {
        let turn = Turn::new("Planner", "Step one.");
        assert_eq!(turn.transcript_line(), "Planner\nStep one.");
    }

    #[test]
    fn test_transcript_lines_skip_empty_and_keep_order() {
        let turns = vec![
            Turn::new("User_proxy", "hello"),
            Turn::new("MultiTalentAgent", "hi there"),
            Turn::new("User_proxy", ""),
            Turn::new("MultiTalentAgent", "anything else?"),
        ];
        let lines = transcript_lines(&turns);
        assert_eq!(
            lines,
            vec![
                "User_proxy\nhello".to_string(),
                "MultiTalentAgent\nhi there".to_string(),
                "MultiTalentAgent\nanything else?".to_string(),
            ]
        );
    }
}
