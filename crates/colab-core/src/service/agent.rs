//! Agent definitions and teams.

use tracing::info;

use colab_types::agent::{AgentDefinition, NewAgentDefinition};
use colab_types::error::{AgentError, RepositoryError};
use colab_types::team::{NewTeam, Team};

use super::normalize_email;
use crate::repository::agent::AgentRepository;
use crate::repository::team::TeamRepository;

pub struct AgentService<A: AgentRepository, T: TeamRepository> {
    agents: A,
    teams: T,
}

impl<A: AgentRepository, T: TeamRepository> AgentService<A, T> {
    pub fn new(agents: A, teams: T) -> Self {
        Self { agents, teams }
    }

    /// Store a new agent definition for `email`.
    ///
    /// The specialisation is stored as entered; it is only sanitized when the
    /// agent joins a chat.
    pub async fn create_agent(
        &self,
        email: &str,
        specialisation: &str,
        instructions: &str,
    ) -> Result<AgentDefinition, AgentError> {
        let email = owner(email)?;
        if specialisation.trim().is_empty() {
            return Err(AgentError::InvalidDefinition(
                "specialisation cannot be empty".to_string(),
            ));
        }

        let definition = self
            .agents
            .create(&NewAgentDefinition::new(email, specialisation, instructions))
            .await
            .map_err(storage)?;
        info!(id = %definition.id, owner = %definition.owner_email, "Agent created");
        Ok(definition)
    }

    /// Agents owned by `email` plus the shared system agents.
    pub async fn list_agents(&self, email: &str) -> Result<Vec<AgentDefinition>, AgentError> {
        let email = owner(email)?;
        self.agents.list_visible(&email).await.map_err(storage)
    }

    /// Store a team. Member ids are not checked against stored agents.
    pub async fn store_team(&self, team: NewTeam) -> Result<Team, AgentError> {
        let owner_email = owner(&team.owner_email)?;
        if team.name.trim().is_empty() {
            return Err(AgentError::InvalidTeam("team name cannot be empty".to_string()));
        }

        let team = self
            .teams
            .create(&NewTeam { owner_email, ..team })
            .await
            .map_err(storage)?;
        info!(id = team.id, owner = %team.owner_email, "Team stored");
        Ok(team)
    }

    pub async fn list_teams(&self, email: &str) -> Result<Vec<Team>, AgentError> {
        let email = owner(email)?;
        self.teams.list_by_owner(&email).await.map_err(storage)
    }
}

fn owner(email: &str) -> Result<String, AgentError> {
    normalize_email(email)
        .ok_or_else(|| AgentError::InvalidDefinition(format!("invalid owner email: '{email}'")))
}

fn storage(e: RepositoryError) -> AgentError {
    AgentError::StorageError(e.to_string())
}
