use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::agent::AgentId;

/// Number of agents in every team.
pub const TEAM_SIZE: usize = 3;

/// A named grouping of exactly three agent definitions.
///
/// The agent references are not checked against stored definitions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: i64,
    pub owner_email: String,
    pub name: String,
    pub description: String,
    pub agents: [AgentId; TEAM_SIZE],
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTeam {
    pub owner_email: String,
    pub name: String,
    pub description: String,
    pub agents: [AgentId; TEAM_SIZE],
}
