//! Real-time session types: connection ids, lifecycle states and the
//! events exchanged over the WebSocket bridge.
//!
//! Frames are JSON objects of the form `{"event": <name>, "data": {...}}`.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

use crate::agent::AgentId;
use crate::team::TEAM_SIZE;

/// Identifier of a live WebSocket connection, wrapping a UUID v7.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionId(pub Uuid);

impl ConnectionId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ConnectionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Lifecycle of a connection's session.
///
/// ```text
/// absent -> initializing -> active <-> idle
///               |             |
///               v             v
///             absent      terminated -> absent
/// ```
///
/// Disconnect moves any state straight to `Absent`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Absent,
    Initializing,
    Active,
    Idle,
    Terminated,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Absent => write!(f, "absent"),
            SessionState::Initializing => write!(f, "initializing"),
            SessionState::Active => write!(f, "active"),
            SessionState::Idle => write!(f, "idle"),
            SessionState::Terminated => write!(f, "terminated"),
        }
    }
}

/// The participants a session was built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Room {
    /// The user proxy and the default assistant.
    Single,
    /// The user proxy and three stored agent definitions.
    Team { agents: [AgentId; TEAM_SIZE] },
}

/// Progress markers sent while a message is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingStatus {
    /// The message was received.
    Started,
    /// Agents are ready and the exchange is running.
    Processing,
    /// The exchange stopped because the proxy ran out of auto-replies.
    Completed,
    /// A participant produced the termination phrase.
    CompletedTerminated,
    /// The round cap was reached; the session waits for the next message.
    CompletedWaitingNext,
    Error,
}

impl fmt::Display for ProcessingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ProcessingStatus::Started => "started",
            ProcessingStatus::Processing => "processing",
            ProcessingStatus::Completed => "completed",
            ProcessingStatus::CompletedTerminated => "completed_terminated",
            ProcessingStatus::CompletedWaitingNext => "completed_waiting_next",
            ProcessingStatus::Error => "error",
        };
        write!(f, "{s}")
    }
}

/// Client -> server events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ClientEvent {
    UserMessage {
        message: String,
    },
    UserMessageTeam {
        message: String,
        #[serde(rename = "agentOne")]
        agent_one: AgentId,
        #[serde(rename = "agentTwo")]
        agent_two: AgentId,
        #[serde(rename = "agentThree")]
        agent_three: AgentId,
    },
}

impl ClientEvent {
    pub fn message(&self) -> &str {
        match self {
            ClientEvent::UserMessage { message } | ClientEvent::UserMessageTeam { message, .. } => {
                message
            }
        }
    }

    /// The room this event asks to talk to.
    pub fn room(&self) -> Room {
        match self {
            ClientEvent::UserMessage { .. } => Room::Single,
            ClientEvent::UserMessageTeam {
                agent_one,
                agent_two,
                agent_three,
                ..
            } => Room::Team {
                agents: [*agent_one, *agent_two, *agent_three],
            },
        }
    }
}

/// Server -> client events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerEvent {
    ConnectionStatus {
        status: String,
        session_id: ConnectionId,
    },
    ProcessingStatus {
        status: ProcessingStatus,
    },
    AgentMessage {
        name: String,
        content: String,
    },
    Error {
        error: String,
    },
}

impl ServerEvent {
    pub fn connected(session_id: ConnectionId) -> Self {
        ServerEvent::ConnectionStatus {
            status: "connected".to_string(),
            session_id,
        }
    }

    pub fn status(status: ProcessingStatus) -> Self {
        ServerEvent::ProcessingStatus { status }
    }

    pub fn error(error: impl Into<String>) -> Self {
        ServerEvent::Error {
            error: error.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_event_user_message_wire_format() {
        let json = r#"{"event":"user_message","data":{"message":"hello"}}"#;
        let event: ClientEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.message(), "hello");
        assert_eq!(event.room(), Room::Single);
    }

    #[test]
    fn test_client_event_team_wire_format() {
        let json = r#"{"event":"user_message_team","data":{"message":"plan","agentOne":1,"agentTwo":2,"agentThree":3}}"#;
        let event: ClientEvent = serde_json::from_str(json).unwrap();
        assert_eq!(
            event.room(),
            Room::Team {
                agents: [AgentId(1), AgentId(2), AgentId(3)]
            }
        );
    }

    #[test]
    fn test_server_event_processing_status_wire_format() {
        let json = serde_json::to_value(ServerEvent::status(
            ProcessingStatus::CompletedWaitingNext,
        ))
        .unwrap();
        assert_eq!(json["event"], "processing_status");
        assert_eq!(json["data"]["status"], "completed_waiting_next");
    }

    #[test]
    fn test_server_event_error_wire_format() {
        let json = serde_json::to_value(ServerEvent::error("boom")).unwrap();
        assert_eq!(json["event"], "error");
        assert_eq!(json["data"]["error"], "boom");
    }

    #[test]
    fn test_connection_status_carries_session_id() {
        let id = ConnectionId::new();
        let json = serde_json::to_value(ServerEvent::connected(id)).unwrap();
        assert_eq!(json["data"]["status"], "connected");
        assert_eq!(json["data"]["session_id"], id.to_string());
    }

    #[test]
    fn test_processing_status_display_matches_serde() {
        for status in [
            ProcessingStatus::Started,
            ProcessingStatus::Processing,
            ProcessingStatus::Completed,
            ProcessingStatus::CompletedTerminated,
            ProcessingStatus::CompletedWaitingNext,
            ProcessingStatus::Error,
        ] {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{status}\""));
        }
    }
}
