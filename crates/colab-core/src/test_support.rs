//! In-memory repositories for unit tests.

use std::sync::Mutex;

use chrono::Utc;

use colab_types::agent::{AgentDefinition, AgentId, NewAgentDefinition, SYSTEM_OWNER_EMAIL};
use colab_types::chat::{ChatSummary, ChatTranscript, NewChatTranscript};
use colab_types::error::RepositoryError;
use colab_types::team::{NewTeam, Team};
use colab_types::user::User;

use crate::repository::agent::AgentRepository;
use crate::repository::chat::ChatRepository;
use crate::repository::team::TeamRepository;
use crate::repository::user::UserRepository;

#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    pub users: Mutex<Vec<User>>,
    pub fail_delete: bool,
}

impl UserRepository for InMemoryUserRepository {
    async fn get(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        Ok(self.users.lock().unwrap().iter().find(|u| u.email == email).cloned())
    }

    async fn create(&self, user: &User) -> Result<User, RepositoryError> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.email == user.email) {
            return Err(RepositoryError::Conflict(user.email.clone()));
        }
        users.push(user.clone());
        Ok(user.clone())
    }

    async fn delete(&self, email: &str) -> Result<bool, RepositoryError> {
        if self.fail_delete {
            return Err(RepositoryError::Query("users table is locked".to_string()));
        }
        let mut users = self.users.lock().unwrap();
        let before = users.len();
        users.retain(|u| u.email != email);
        Ok(users.len() != before)
    }
}

#[derive(Debug, Default)]
pub struct InMemoryAgentRepository {
    pub agents: Mutex<Vec<AgentDefinition>>,
}

impl InMemoryAgentRepository {
    pub async fn insert(&self, owner: &str, specialisation: &str) -> AgentDefinition {
        let new = NewAgentDefinition::new(owner, specialisation, format!("You are {specialisation}."));
        self.create(&new).await.unwrap()
    }
}

impl AgentRepository for InMemoryAgentRepository {
    async fn create(&self, agent: &NewAgentDefinition) -> Result<AgentDefinition, RepositoryError> {
        let mut agents = self.agents.lock().unwrap();
        let definition = AgentDefinition {
            id: AgentId(agents.len() as i64 + 1),
            owner_email: agent.owner_email.clone(),
            specialisation: agent.specialisation.clone(),
            instructions: agent.instructions.clone(),
            temperature: agent.temperature,
            human_intervention: agent.human_intervention,
            created_at: Utc::now(),
        };
        agents.push(definition.clone());
        Ok(definition)
    }

    async fn list_visible(&self, owner_email: &str) -> Result<Vec<AgentDefinition>, RepositoryError> {
        Ok(self
            .agents
            .lock()
            .unwrap()
            .iter()
            .filter(|a| a.owner_email == owner_email || a.owner_email == SYSTEM_OWNER_EMAIL)
            .cloned()
            .collect())
    }

    async fn get_many(&self, ids: &[AgentId]) -> Result<Vec<AgentDefinition>, RepositoryError> {
        // Reverse order on purpose: callers must not rely on lookup order.
        Ok(self
            .agents
            .lock()
            .unwrap()
            .iter()
            .rev()
            .filter(|a| ids.contains(&a.id))
            .cloned()
            .collect())
    }

    async fn delete_by_owner(&self, owner_email: &str) -> Result<u64, RepositoryError> {
        let mut agents = self.agents.lock().unwrap();
        let before = agents.len();
        agents.retain(|a| a.owner_email != owner_email);
        Ok((before - agents.len()) as u64)
    }
}

#[derive(Debug, Default)]
pub struct InMemoryTeamRepository {
    pub teams: Mutex<Vec<Team>>,
    pub fail_delete: bool,
}

impl TeamRepository for InMemoryTeamRepository {
    async fn create(&self, team: &NewTeam) -> Result<Team, RepositoryError> {
        let mut teams = self.teams.lock().unwrap();
        let stored = Team {
            id: teams.len() as i64 + 1,
            owner_email: team.owner_email.clone(),
            name: team.name.clone(),
            description: team.description.clone(),
            agents: team.agents,
            created_at: Utc::now(),
        };
        teams.push(stored.clone());
        Ok(stored)
    }

    async fn list_by_owner(&self, owner_email: &str) -> Result<Vec<Team>, RepositoryError> {
        Ok(self
            .teams
            .lock()
            .unwrap()
            .iter()
            .filter(|t| t.owner_email == owner_email)
            .cloned()
            .collect())
    }

    async fn delete_by_owner(&self, owner_email: &str) -> Result<u64, RepositoryError> {
        if self.fail_delete {
            return Err(RepositoryError::Connection);
        }
        let mut teams = self.teams.lock().unwrap();
        let before = teams.len();
        teams.retain(|t| t.owner_email != owner_email);
        Ok((before - teams.len()) as u64)
    }
}

#[derive(Debug, Default)]
pub struct InMemoryChatRepository {
    pub chats: Mutex<Vec<ChatTranscript>>,
}

impl ChatRepository for InMemoryChatRepository {
    async fn create(&self, chat: &NewChatTranscript) -> Result<ChatTranscript, RepositoryError> {
        let mut chats = self.chats.lock().unwrap();
        let stored = ChatTranscript {
            id: chats.len() as i64 + 1,
            owner_email: chat.owner_email.clone(),
            chat_name: chat.chat_name.clone(),
            content: chat.content.clone(),
            created_at: Utc::now(),
        };
        chats.push(stored.clone());
        Ok(stored)
    }

    async fn find_by_name(
        &self,
        chat_name: &str,
        owner_email: Option<&str>,
    ) -> Result<Option<ChatTranscript>, RepositoryError> {
        Ok(self
            .chats
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|c| c.chat_name == chat_name && owner_email.is_none_or(|o| o == c.owner_email))
            .cloned())
    }

    async fn list_names(&self, owner_email: &str) -> Result<Vec<ChatSummary>, RepositoryError> {
        Ok(self
            .chats
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.owner_email == owner_email)
            .map(|c| ChatSummary {
                id: c.id,
                chat_name: c.chat_name.clone(),
            })
            .collect())
    }

    async fn delete_by_name(&self, owner_email: &str, chat_name: &str) -> Result<u64, RepositoryError> {
        let mut chats = self.chats.lock().unwrap();
        let before = chats.len();
        chats.retain(|c| !(c.owner_email == owner_email && c.chat_name == chat_name));
        Ok((before - chats.len()) as u64)
    }

    async fn delete_by_owner(&self, owner_email: &str) -> Result<u64, RepositoryError> {
        let mut chats = self.chats.lock().unwrap();
        let before = chats.len();
        chats.retain(|c| c.owner_email != owner_email);
        Ok((before - chats.len()) as u64)
    }
}
