//! SQLite chat-transcript repository.

use chrono::Utc;
use sqlx::Row;

use colab_core::repository::chat::ChatRepository;
use colab_types::chat::{ChatSummary, ChatTranscript, NewChatTranscript};
use colab_types::error::RepositoryError;

use super::pool::DatabasePool;
use super::{format_datetime, parse_datetime, query_error};

pub struct SqliteChatRepository {
    pool: DatabasePool,
}

impl SqliteChatRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

fn transcript_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<ChatTranscript, RepositoryError> {
    let created_at: String = row.try_get("created_at").map_err(query_error)?;
    Ok(ChatTranscript {
        id: row.try_get("id").map_err(query_error)?,
        owner_email: row.try_get("owner_email").map_err(query_error)?,
        chat_name: row.try_get("chat_name").map_err(query_error)?,
        content: row.try_get("content").map_err(query_error)?,
        created_at: parse_datetime(&created_at)?,
    })
}

impl ChatRepository for SqliteChatRepository {
    async fn create(&self, chat: &NewChatTranscript) -> Result<ChatTranscript, RepositoryError> {
        let created_at = Utc::now();
        let result = sqlx::query(
            "INSERT INTO chat_transcripts (owner_email, chat_name, content, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(&chat.owner_email)
        .bind(&chat.chat_name)
        .bind(&chat.content)
        .bind(format_datetime(&created_at))
        .execute(&self.pool.writer)
        .await
        .map_err(query_error)?;

        Ok(ChatTranscript {
            id: result.last_insert_rowid(),
            owner_email: chat.owner_email.clone(),
            chat_name: chat.chat_name.clone(),
            content: chat.content.clone(),
            created_at,
        })
    }

    async fn find_by_name(
        &self,
        chat_name: &str,
        owner_email: Option<&str>,
    ) -> Result<Option<ChatTranscript>, RepositoryError> {
        let row = sqlx::query(
            "SELECT * FROM chat_transcripts
             WHERE chat_name = ? AND (? IS NULL OR owner_email = ?)
             ORDER BY id DESC LIMIT 1",
        )
        .bind(chat_name)
        .bind(owner_email)
        .bind(owner_email)
        .fetch_optional(&self.pool.reader)
        .await
        .map_err(query_error)?;

        row.as_ref().map(transcript_from_row).transpose()
    }

    async fn list_names(&self, owner_email: &str) -> Result<Vec<ChatSummary>, RepositoryError> {
        let rows = sqlx::query("SELECT id, chat_name FROM chat_transcripts WHERE owner_email = ? ORDER BY id")
            .bind(owner_email)
            .fetch_all(&self.pool.reader)
            .await
            .map_err(query_error)?;

        rows.iter()
            .map(|row| -> Result<ChatSummary, RepositoryError> {
                Ok(ChatSummary {
                    id: row.try_get("id").map_err(query_error)?,
                    chat_name: row.try_get("chat_name").map_err(query_error)?,
                })
            })
            .collect()
    }

    async fn delete_by_name(&self, owner_email: &str, chat_name: &str) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM chat_transcripts WHERE owner_email = ? AND chat_name = ?")
            .bind(owner_email)
            .bind(chat_name)
            .execute(&self.pool.writer)
            .await
            .map_err(query_error)?;

        Ok(result.rows_affected())
    }

    async fn delete_by_owner(&self, owner_email: &str) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM chat_transcripts WHERE owner_email = ?")
            .bind(owner_email)
            .execute(&self.pool.writer)
            .await
            .map_err(query_error)?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite::test_db;

    fn chat(owner: &str, name: &str, content: &str) -> NewChatTranscript {
        NewChatTranscript {
            owner_email: owner.to_string(),
            chat_name: name.to_string(),
            content: content.to_string(),
        }
    }

    #[tokio::test]
    async fn test_store_then_find_returns_exact_text() {
        let (_dir, pool) = test_db::open().await;
        let repo = SqliteChatRepository::new(pool);
        let content = "User_proxy\nhi\nMultiTalentAgent\n<b>hello</b> \u{1F600}";

        repo.create(&chat("ada@example.com", "greeting", content))
            .await
            .unwrap();

        let found = repo.find_by_name("greeting", None).await.unwrap().unwrap();
        assert_eq!(found.content, content);
        assert!(repo.find_by_name("missing", None).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_find_newest_and_owner_filter() {
        let (_dir, pool) = test_db::open().await;
        let repo = SqliteChatRepository::new(pool);

        repo.create(&chat("ada@example.com", "plan", "v1")).await.unwrap();
        repo.create(&chat("bob@example.com", "plan", "bob")).await.unwrap();
        repo.create(&chat("ada@example.com", "plan", "v2")).await.unwrap();

        let newest = repo.find_by_name("plan", None).await.unwrap().unwrap();
        assert_eq!(newest.content, "v2");
        let bobs = repo
            .find_by_name("plan", Some("bob@example.com"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(bobs.content, "bob");
    }

    #[tokio::test]
    async fn test_list_names_and_deletes() {
        let (_dir, pool) = test_db::open().await;
        let repo = SqliteChatRepository::new(pool);

        let first = repo.create(&chat("ada@example.com", "one", "a")).await.unwrap();
        repo.create(&chat("ada@example.com", "two", "b")).await.unwrap();
        repo.create(&chat("ada@example.com", "two", "c")).await.unwrap();

        let names = repo.list_names("ada@example.com").await.unwrap();
        assert_eq!(names.len(), 3);
        assert_eq!(names[0].id, first.id);
        assert_eq!(names[0].chat_name, "one");

        assert_eq!(repo.delete_by_name("ada@example.com", "two").await.unwrap(), 2);
        assert_eq!(repo.delete_by_owner("ada@example.com").await.unwrap(), 1);
        assert!(repo.list_names("ada@example.com").await.unwrap().is_empty());
    }
}
