//! SQLite agent-definition repository.

use chrono::Utc;
use sqlx::Row;

use colab_core::repository::agent::AgentRepository;
use colab_types::agent::{AgentDefinition, AgentId, NewAgentDefinition, SYSTEM_OWNER_EMAIL};
use colab_types::error::RepositoryError;

use super::pool::DatabasePool;
use super::{format_datetime, parse_datetime, placeholders, query_error};

pub struct SqliteAgentRepository {
    pool: DatabasePool,
}

impl SqliteAgentRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

/// Internal row type for mapping SQLite rows to `AgentDefinition`.
struct AgentRow {
    id: i64,
    owner_email: String,
    specialisation: String,
    instructions: String,
    temperature: f64,
    human_intervention: bool,
    created_at: String,
}

impl AgentRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            owner_email: row.try_get("owner_email")?,
            specialisation: row.try_get("specialisation")?,
            instructions: row.try_get("instructions")?,
            temperature: row.try_get("temperature")?,
            human_intervention: row.try_get("human_intervention")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn into_definition(self) -> Result<AgentDefinition, RepositoryError> {
        Ok(AgentDefinition {
            id: AgentId(self.id),
            owner_email: self.owner_email,
            specialisation: self.specialisation,
            instructions: self.instructions,
            temperature: self.temperature,
            human_intervention: self.human_intervention,
            created_at: parse_datetime(&self.created_at)?,
        })
    }
}

fn definitions(rows: &[sqlx::sqlite::SqliteRow]) -> Result<Vec<AgentDefinition>, RepositoryError> {
    rows.iter()
        .map(|row| {
            AgentRow::from_row(row)
                .map_err(query_error)?
                .into_definition()
        })
        .collect()
}

impl AgentRepository for SqliteAgentRepository {
    async fn create(&self, agent: &NewAgentDefinition) -> Result<AgentDefinition, RepositoryError> {
        let created_at = Utc::now();
        let result = sqlx::query(
            "INSERT INTO agent_definitions (owner_email, specialisation, instructions, temperature, human_intervention, created_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&agent.owner_email)
        .bind(&agent.specialisation)
        .bind(&agent.instructions)
        .bind(agent.temperature)
        .bind(agent.human_intervention)
        .bind(format_datetime(&created_at))
        .execute(&self.pool.writer)
        .await
        .map_err(query_error)?;

        Ok(AgentDefinition {
            id: AgentId(result.last_insert_rowid()),
            owner_email: agent.owner_email.clone(),
            specialisation: agent.specialisation.clone(),
            instructions: agent.instructions.clone(),
            temperature: agent.temperature,
            human_intervention: agent.human_intervention,
            created_at,
        })
    }

    async fn list_visible(&self, owner_email: &str) -> Result<Vec<AgentDefinition>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT * FROM agent_definitions WHERE owner_email = ? OR owner_email = ? ORDER BY id",
        )
        .bind(owner_email)
        .bind(SYSTEM_OWNER_EMAIL)
        .fetch_all(&self.pool.reader)
        .await
        .map_err(query_error)?;

        definitions(&rows)
    }

    async fn get_many(&self, ids: &[AgentId]) -> Result<Vec<AgentDefinition>, RepositoryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let sql = format!(
            "SELECT * FROM agent_definitions WHERE id IN ({})",
            placeholders(ids.len())
        );
        let mut query = sqlx::query(&sql);
        for id in ids {
            query = query.bind(id.0);
        }
        let rows = query
            .fetch_all(&self.pool.reader)
            .await
            .map_err(query_error)?;

        definitions(&rows)
    }

    async fn delete_by_owner(&self, owner_email: &str) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM agent_definitions WHERE owner_email = ?")
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

    #[tokio::test]
    async fn test_create_then_list_visible() {
        let (_dir, pool) = test_db::open().await;
        let repo = SqliteAgentRepository::new(pool);

        let system = repo
            .create(&NewAgentDefinition::new(SYSTEM_OWNER_EMAIL, "Planner", "Plan."))
            .await
            .unwrap();
        let mine = repo
            .create(&NewAgentDefinition::new("ada@example.com", "Data Analyst", "Analyse."))
            .await
            .unwrap();
        repo.create(&NewAgentDefinition::new("bob@example.com", "Hidden", "No."))
            .await
            .unwrap();

        let visible = repo.list_visible("ada@example.com").await.unwrap();
        let ids: Vec<AgentId> = visible.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![system.id, mine.id]);
        assert_eq!(visible[1].specialisation, "Data Analyst");
        assert_eq!(visible[1].temperature, 0.0);
        assert!(!visible[1].human_intervention);
    }

    #[tokio::test]
    async fn test_get_many_skips_missing_and_collapses_duplicates() {
        let (_dir, pool) = test_db::open().await;
        let repo = SqliteAgentRepository::new(pool);

        let a = repo
            .create(&NewAgentDefinition::new("ada@example.com", "A", ""))
            .await
            .unwrap();
        let b = repo
            .create(&NewAgentDefinition::new("ada@example.com", "B", ""))
            .await
            .unwrap();

        let found = repo.get_many(&[a.id, a.id, AgentId(999)]).await.unwrap();
        assert_eq!(found.len(), 1);

        let found = repo.get_many(&[b.id, a.id]).await.unwrap();
        assert_eq!(found.len(), 2);
        assert!(repo.get_many(&[]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_by_owner() {
        let (_dir, pool) = test_db::open().await;
        let repo = SqliteAgentRepository::new(pool);

        for name in ["A", "B"] {
            repo.create(&NewAgentDefinition::new("ada@example.com", name, ""))
                .await
                .unwrap();
        }
        repo.create(&NewAgentDefinition::new("bob@example.com", "C", ""))
            .await
            .unwrap();

        assert_eq!(repo.delete_by_owner("ada@example.com").await.unwrap(), 2);
        assert!(repo.list_visible("ada@example.com").await.unwrap().is_empty());
        assert_eq!(repo.list_visible("bob@example.com").await.unwrap().len(), 1);
    }
}
