//! User repository trait definition.

use colab_types::error::RepositoryError;
use colab_types::user::User;

/// Repository trait for user persistence.
///
/// Uses native async fn in traits (Rust 2024 edition, no async_trait macro).
pub trait UserRepository: Send + Sync {
    /// Get a user by email.
    fn get(
        &self,
        email: &str,
    ) -> impl std::future::Future<Output = Result<Option<User>, RepositoryError>> + Send;

    /// Insert a new user. Returns `RepositoryError::Conflict` if the email exists.
    fn create(
        &self,
        user: &User,
    ) -> impl std::future::Future<Output = Result<User, RepositoryError>> + Send;

    /// Delete a user by email. Returns whether a row was removed.
    fn delete(
        &self,
        email: &str,
    ) -> impl std::future::Future<Output = Result<bool, RepositoryError>> + Send;
}
