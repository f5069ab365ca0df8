//! Team repository trait definition.

use colab_types::error::RepositoryError;
use colab_types::team::{NewTeam, Team};

/// Repository trait for teams.
pub trait TeamRepository: Send + Sync {
    fn create(
        &self,
        team: &NewTeam,
    ) -> impl std::future::Future<Output = Result<Team, RepositoryError>> + Send;

    /// Teams owned by `owner_email`, oldest first.
    fn list_by_owner(
        &self,
        owner_email: &str,
    ) -> impl std::future::Future<Output = Result<Vec<Team>, RepositoryError>> + Send;

    fn delete_by_owner(
        &self,
        owner_email: &str,
    ) -> impl std::future::Future<Output = Result<u64, RepositoryError>> + Send;
}
