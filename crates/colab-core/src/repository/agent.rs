//! Agent definition repository trait definition.

use colab_types::agent::{AgentDefinition, AgentId, NewAgentDefinition};
use colab_types::error::RepositoryError;

/// Repository trait for agent definitions.
pub trait AgentRepository: Send + Sync {
    /// Insert a definition. Returns the stored row with its id.
    fn create(
        &self,
        agent: &NewAgentDefinition,
    ) -> impl std::future::Future<Output = Result<AgentDefinition, RepositoryError>> + Send;

    /// Definitions owned by `owner_email` plus those of the system owner,
    /// ordered by id.
    fn list_visible(
        &self,
        owner_email: &str,
    ) -> impl std::future::Future<Output = Result<Vec<AgentDefinition>, RepositoryError>> + Send;

    /// Definitions with the given ids, in unspecified order. Missing ids are
    /// simply absent from the result.
    fn get_many(
        &self,
        ids: &[AgentId],
    ) -> impl std::future::Future<Output = Result<Vec<AgentDefinition>, RepositoryError>> + Send;

    /// Delete every definition owned by `owner_email`. Returns the row count.
    fn delete_by_owner(
        &self,
        owner_email: &str,
    ) -> impl std::future::Future<Output = Result<u64, RepositoryError>> + Send;
}
