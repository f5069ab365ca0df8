//! Account deletion.
//!
//! Removes a user's chats, teams and agents, then the user row. Steps run in
//! that order and commit independently: a failing step is logged and
//! recorded, and the remaining steps still run.

use tracing::{error, info};

use colab_types::error::{RepositoryError, UserError};
use colab_types::user::{DeletionReport, DeletionStep};

use super::normalize_email;
use crate::repository::agent::AgentRepository;
use crate::repository::chat::ChatRepository;
use crate::repository::team::TeamRepository;
use crate::repository::user::UserRepository;

pub struct AccountService<U, A, T, C>
where
    U: UserRepository,
    A: AgentRepository,
    T: TeamRepository,
    C: ChatRepository,
{
    users: U,
    agents: A,
    teams: T,
    chats: C,
}

impl<U, A, T, C> AccountService<U, A, T, C>
where
    U: UserRepository,
    A: AgentRepository,
    T: TeamRepository,
    C: ChatRepository,
{
    pub fn new(users: U, agents: A, teams: T, chats: C) -> Self {
        Self {
            users,
            agents,
            teams,
            chats,
        }
    }

    /// Delete everything owned by `email`.
    ///
    /// Step failures do not make this return `Err`; check
    /// [`DeletionReport::is_complete`].
    pub async fn delete_account(&self, email: &str) -> Result<DeletionReport, UserError> {
        let email = normalize_email(email).ok_or_else(|| UserError::InvalidEmail(email.to_string()))?;
        let mut report = DeletionReport::default();

        for step in DeletionStep::ORDER {
            let result = match step {
                DeletionStep::Chats => self
                    .chats
                    .delete_by_owner(&email)
                    .await
                    .map(|n| report.chats_deleted = n),
                DeletionStep::Teams => self
                    .teams
                    .delete_by_owner(&email)
                    .await
                    .map(|n| report.teams_deleted = n),
                DeletionStep::Agents => self
                    .agents
                    .delete_by_owner(&email)
                    .await
                    .map(|n| report.agents_deleted = n),
                DeletionStep::User => self
                    .users
                    .delete(&email)
                    .await
                    .map(|deleted| report.user_deleted = deleted),
            };
            if let Err(e) = result {
                record_failure(&mut report, &email, step, e);
            }
        }

        info!(
            email = %email,
            chats = report.chats_deleted,
            teams = report.teams_deleted,
            agents = report.agents_deleted,
            user = report.user_deleted,
            complete = report.is_complete(),
            "Account deletion finished"
        );
        Ok(report)
    }
}

fn record_failure(report: &mut DeletionReport, email: &str, step: DeletionStep, e: RepositoryError) {
    error!(email = %email, step = %step, error = %e, "Account deletion step failed");
    report.failed.push((step, e.to_string()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use colab_types::agent::AgentId;
    use colab_types::chat::NewChatTranscript;
    use colab_types::team::NewTeam;
    use colab_types::user::User;

    use crate::test_support::{
        InMemoryAgentRepository, InMemoryChatRepository, InMemoryTeamRepository,
        InMemoryUserRepository,
    };

    type Service = AccountService<
        InMemoryUserRepository,
        InMemoryAgentRepository,
        InMemoryTeamRepository,
        InMemoryChatRepository,
    >;

    async fn seeded(fail_team_delete: bool) -> Service {
        let service = AccountService::new(
            InMemoryUserRepository::default(),
            InMemoryAgentRepository::default(),
            InMemoryTeamRepository {
                fail_delete: fail_team_delete,
                ..Default::default()
            },
            InMemoryChatRepository::default(),
        );
        for email in ["ada@example.com", "bob@example.com"] {
            service
                .users
                .create(&User {
                    email: email.to_string(),
                    display_name: "x".to_string(),
                    created_at: chrono::Utc::now(),
                })
                .await
                .unwrap();
            service.agents.insert(email, "Planner").await;
            service
                .teams
                .create(&NewTeam {
                    owner_email: email.to_string(),
                    name: "t".to_string(),
                    description: String::new(),
                    agents: [AgentId(1), AgentId(2), AgentId(3)],
                })
                .await
                .unwrap();
            service
                .chats
                .create(&NewChatTranscript {
                    owner_email: email.to_string(),
                    chat_name: "c".to_string(),
                    content: "hi".to_string(),
                })
                .await
                .unwrap();
        }
        service
    }

    #[tokio::test]
    async fn test_delete_account_removes_everything_owned() {
        let service = seeded(false).await;

        let report = service.delete_account("ada@example.com").await.unwrap();

        assert!(report.is_complete());
        assert_eq!(report.chats_deleted, 1);
        assert_eq!(report.teams_deleted, 1);
        assert_eq!(report.agents_deleted, 1);
        assert!(report.user_deleted);

        let ada = "ada@example.com";
        assert!(service.chats.list_names(ada).await.unwrap().is_empty());
        assert!(service.teams.list_by_owner(ada).await.unwrap().is_empty());
        let agents = service.agents.list_visible(ada).await.unwrap();
        assert!(agents.iter().all(|a| a.owner_email != ada));
        assert!(service.users.get(ada).await.unwrap().is_none());

        // Other owners are untouched.
        let bob = "bob@example.com";
        assert_eq!(service.chats.list_names(bob).await.unwrap().len(), 1);
        assert!(service.users.get(bob).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_failed_step_is_recorded_and_later_steps_run() {
        let service = seeded(true).await;

        let report = service.delete_account("ada@example.com").await.unwrap();

        assert!(!report.is_complete());
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, DeletionStep::Teams);
        // Chats ran before the failure, agents and user after it.
        assert_eq!(report.chats_deleted, 1);
        assert_eq!(report.agents_deleted, 1);
        assert!(report.user_deleted);
    }

    #[tokio::test]
    async fn test_unknown_user_is_complete_but_not_deleted() {
        let service = seeded(false).await;
        let report = service.delete_account("nobody@example.com").await.unwrap();
        assert!(report.is_complete());
        assert!(!report.user_deleted);
    }
}
