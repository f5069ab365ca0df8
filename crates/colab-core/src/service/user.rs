//! Sign-in review.

use chrono::Utc;
use tracing::info;

use colab_types::error::{RepositoryError, UserError};
use colab_types::user::{SignInOutcome, User};

use super::normalize_email;
use crate::repository::user::UserRepository;

pub struct UserService<U: UserRepository> {
    users: U,
}

impl<U: UserRepository> UserService<U> {
    pub fn new(users: U) -> Self {
        Self { users }
    }

    /// Record a user after the external identity provider signed them in.
    ///
    /// Creates the user on first sight. A concurrent insert for the same
    /// email counts as `Existed`.
    pub async fn review_sign_in(&self, name: &str, email: &str) -> Result<SignInOutcome, UserError> {
        let email = normalize_email(email).ok_or_else(|| UserError::InvalidEmail(email.to_string()))?;

        if self.users.get(&email).await.map_err(storage)?.is_some() {
            return Ok(SignInOutcome::Existed);
        }

        let user = User {
            email,
            display_name: name.trim().to_string(),
            created_at: Utc::now(),
        };
        match self.users.create(&user).await {
            Ok(user) => {
                info!(email = %user.email, "User created");
                Ok(SignInOutcome::Created)
            }
            Err(RepositoryError::Conflict(_)) => Ok(SignInOutcome::Existed),
            Err(e) => Err(storage(e)),
        }
    }

    pub async fn get(&self, email: &str) -> Result<Option<User>, UserError> {
        self.users.get(email.trim()).await.map_err(storage)
    }
}

fn storage(e: RepositoryError) -> UserError {
    UserError::StorageError(e.to_string())
}
