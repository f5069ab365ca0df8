//! SQLite user repository.

use sqlx::Row;

use colab_core::repository::user::UserRepository;
use colab_types::error::RepositoryError;
use colab_types::user::User;

use super::pool::DatabasePool;
use super::{format_datetime, parse_datetime, query_error};

pub struct SqliteUserRepository {
    pool: DatabasePool,
}

impl SqliteUserRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

fn user_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<User, RepositoryError> {
    let created_at: String = row.try_get("created_at").map_err(query_error)?;
    Ok(User {
        email: row.try_get("email").map_err(query_error)?,
        display_name: row.try_get("display_name").map_err(query_error)?,
        created_at: parse_datetime(&created_at)?,
    })
}

impl UserRepository for SqliteUserRepository {
    async fn get(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query("SELECT email, display_name, created_at FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(query_error)?;

        row.as_ref().map(user_from_row).transpose()
    }

    async fn create(&self, user: &User) -> Result<User, RepositoryError> {
        let result = sqlx::query("INSERT INTO users (email, display_name, created_at) VALUES (?, ?, ?)")
            .bind(&user.email)
            .bind(&user.display_name)
            .bind(format_datetime(&user.created_at))
            .execute(&self.pool.writer)
            .await;

        match result {
            Ok(_) => Ok(user.clone()),
            Err(sqlx::Error::Database(db_err)) if db_err.message().contains("UNIQUE") => Err(
                RepositoryError::Conflict(format!("user '{}' already exists", user.email)),
            ),
            Err(e) => Err(query_error(e)),
        }
    }

    async fn delete(&self, email: &str) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM users WHERE email = ?")
            .bind(email)
            .execute(&self.pool.writer)
            .await
            .map_err(query_error)?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite::test_db;
    use chrono::Utc;

    fn ada() -> User {
        User {
            email: "ada@example.com".to_string(),
            display_name: "Ada".to_string(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_create_get_delete() {
        let (_dir, pool) = test_db::open().await;
        let repo = SqliteUserRepository::new(pool);

        assert!(repo.get("ada@example.com").await.unwrap().is_none());
        let user = ada();
        repo.create(&user).await.unwrap();

        let loaded = repo.get("ada@example.com").await.unwrap().unwrap();
        assert_eq!(loaded, user);

        assert!(repo.delete("ada@example.com").await.unwrap());
        assert!(!repo.delete("ada@example.com").await.unwrap());
    }

    #[tokio::test]
    async fn test_duplicate_email_is_conflict() {
        let (_dir, pool) = test_db::open().await;
        let repo = SqliteUserRepository::new(pool);

        repo.create(&ada()).await.unwrap();
        let err = repo.create(&ada()).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
    }
}
