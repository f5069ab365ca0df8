//! Application state wiring services, the orchestrator and the session registry.
//!
//! `AppState` is `Clone` (all fields are `Arc`-wrapped or cheap pool handles)
//! so it can be used as axum `State`.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use secrecy::SecretString;

use colab_core::agent::factory::AgentFactory;
use colab_core::llm::box_provider::BoxLlmProvider;
use colab_core::orchestrator::ChatOrchestrator;
use colab_core::service::account::AccountService;
use colab_core::service::agent::AgentService;
use colab_core::service::chat::ChatService;
use colab_core::service::user::UserService;
use colab_core::session::bridge::RoomRegistry;
use colab_infra::config::database_url;
use colab_infra::llm::create_provider;
use colab_infra::sqlite::agent::SqliteAgentRepository;
use colab_infra::sqlite::chat::SqliteChatRepository;
use colab_infra::sqlite::pool::DatabasePool;
use colab_infra::sqlite::team::SqliteTeamRepository;
use colab_infra::sqlite::user::SqliteUserRepository;
use colab_types::config::GlobalConfig;

pub type SqliteUserService = UserService<SqliteUserRepository>;
pub type SqliteAgentService = AgentService<SqliteAgentRepository, SqliteTeamRepository>;
pub type SqliteChatService = ChatService<SqliteChatRepository>;
pub type SqliteAccountService = AccountService<
    SqliteUserRepository,
    SqliteAgentRepository,
    SqliteTeamRepository,
    SqliteChatRepository,
>;
pub type SqliteOrchestrator = ChatOrchestrator<SqliteAgentRepository>;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<SqliteUserService>,
    pub agent_service: Arc<SqliteAgentService>,
    pub chat_service: Arc<SqliteChatService>,
    pub account_service: Arc<SqliteAccountService>,
    pub orchestrator: Arc<SqliteOrchestrator>,
    /// Live real-time sessions keyed by connection.
    pub sessions: Arc<RoomRegistry>,
    pub started_at: Instant,
}

impl AppState {
    /// Open the database and the configured LLM provider.
    pub async fn init(
        config: &GlobalConfig,
        data_dir: &Path,
        api_key: Option<SecretString>,
    ) -> anyhow::Result<Self> {
        tokio::fs::create_dir_all(data_dir)
            .await
            .with_context(|| format!("failed to create data directory {}", data_dir.display()))?;

        let url = database_url(config, data_dir);
        let pool = DatabasePool::new(&url)
            .await
            .with_context(|| format!("failed to open database at {url}"))?;

        let provider =
            create_provider(&config.llm, api_key).context("failed to configure LLM provider")?;

        tracing::info!(database = %url, "Application state initialized");
        Ok(Self::build(pool, provider, config))
    }

    /// Wire every service over `pool` with an already-built provider.
    pub fn build(pool: DatabasePool, provider: BoxLlmProvider, config: &GlobalConfig) -> Self {
        let factory = AgentFactory::new(&config.llm, &config.orchestration);
        let orchestrator = ChatOrchestrator::new(
            Arc::new(SqliteAgentRepository::new(pool.clone())),
            Arc::new(provider),
            factory,
            config.orchestration.clone(),
        );

        Self {
            user_service: Arc::new(UserService::new(SqliteUserRepository::new(pool.clone()))),
            agent_service: Arc::new(AgentService::new(
                SqliteAgentRepository::new(pool.clone()),
                SqliteTeamRepository::new(pool.clone()),
            )),
            chat_service: Arc::new(ChatService::new(SqliteChatRepository::new(pool.clone()))),
            account_service: Arc::new(AccountService::new(
                SqliteUserRepository::new(pool.clone()),
                SqliteAgentRepository::new(pool.clone()),
                SqliteTeamRepository::new(pool.clone()),
                SqliteChatRepository::new(pool),
            )),
            orchestrator: Arc::new(orchestrator),
            sessions: Arc::new(RoomRegistry::new()),
            started_at: Instant::now(),
        }
    }
}
