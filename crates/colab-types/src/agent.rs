use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use std::fmt;
use std::str::FromStr;

/// Owner whose agent definitions are visible to every caller.
pub const SYSTEM_OWNER_EMAIL: &str = "system@example.com";

/// Unique identifier for a stored agent definition (database row id).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentId(pub i64);

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for AgentId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.trim().parse()?))
    }
}

impl From<i64> for AgentId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// A stored agent definition.
///
/// Definitions are created explicitly and never updated. They are removed
/// only when their owner's account is deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentDefinition {
    pub id: AgentId,
    pub owner_email: String,
    /// Display label as entered by the owner. Sanitized only when the
    /// definition becomes a chat participant.
    pub specialisation: String,
    /// Free-text instructions used as the agent's system message.
    pub instructions: String,
    pub temperature: f64,
    /// Whether a human may intervene in this agent's turns.
    pub human_intervention: bool,
    pub created_at: DateTime<Utc>,
}

impl AgentDefinition {
    /// Participant name for this definition, restricted to `[A-Za-z0-9_-]`.
    pub fn participant_name(&self) -> String {
        sanitize_agent_name(&self.specialisation)
    }
}

/// Fields needed to insert a new agent definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAgentDefinition {
    pub owner_email: String,
    pub specialisation: String,
    pub instructions: String,
    #[serde(default)]
    pub temperature: f64,
    #[serde(default)]
    pub human_intervention: bool,
}

impl NewAgentDefinition {
    /// A definition with the insert-time defaults: temperature 0 and no
    /// human intervention.
    pub fn new(
        owner_email: impl Into<String>,
        specialisation: impl Into<String>,
        instructions: impl Into<String>,
    ) -> Self {
        Self {
            owner_email: owner_email.into(),
            specialisation: specialisation.into(),
            instructions: instructions.into(),
            temperature: 0.0,
            human_intervention: false,
        }
    }
}

/// Replace every character outside `[A-Za-z0-9_-]` with `_`.
///
/// The character count is preserved. Distinct inputs may map to the same
/// output ("a b" and "a.b" both become "a_b"); callers accept the collision.
///
/// # Examples
///
/// ```
/// use colab_types::agent::sanitize_agent_name;
///
/// assert_eq!(sanitize_agent_name("Data Analyst"), "Data_Analyst");
/// assert_eq!(sanitize_agent_name("c++ / rust"), "c_____rust");
/// assert_eq!(sanitize_agent_name("qa-bot_2"), "qa-bot_2");
/// ```
pub fn sanitize_agent_name(name: &str) -> String {
    name.chars()
        .map(|c| if is_allowed_name_char(c) { c } else { '_' })
        .collect()
}

fn is_allowed_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}
