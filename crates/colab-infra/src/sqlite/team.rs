//! SQLite team repository.

use chrono::Utc;
use sqlx::Row;

use colab_core::repository::team::TeamRepository;
use colab_types::agent::AgentId;
use colab_types::error::RepositoryError;
use colab_types::team::{NewTeam, Team};

use super::pool::DatabasePool;
use super::{format_datetime, parse_datetime, query_error};

pub struct SqliteTeamRepository {
    pool: DatabasePool,
}

impl SqliteTeamRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

fn team_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Team, RepositoryError> {
    let get_agent = |column: &str| -> Result<AgentId, RepositoryError> {
        row.try_get::<i64, _>(column).map(AgentId).map_err(query_error)
    };
    let created_at: String = row.try_get("created_at").map_err(query_error)?;

    Ok(Team {
        id: row.try_get("id").map_err(query_error)?,
        owner_email: row.try_get("owner_email").map_err(query_error)?,
        name: row.try_get("name").map_err(query_error)?,
        description: row.try_get("description").map_err(query_error)?,
        agents: [
            get_agent("agent_one")?,
            get_agent("agent_two")?,
            get_agent("agent_three")?,
        ],
        created_at: parse_datetime(&created_at)?,
    })
}

impl TeamRepository for SqliteTeamRepository {
    async fn create(&self, team: &NewTeam) -> Result<Team, RepositoryError> {
        let created_at = Utc::now();
        let [one, two, three] = team.agents;
        let result = sqlx::query(
            "INSERT INTO teams (owner_email, name, description, agent_one, agent_two, agent_three, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&team.owner_email)
        .bind(&team.name)
        .bind(&team.description)
        .bind(one.0)
        .bind(two.0)
        .bind(three.0)
        .bind(format_datetime(&created_at))
        .execute(&self.pool.writer)
        .await
        .map_err(query_error)?;

        Ok(Team {
            id: result.last_insert_rowid(),
            owner_email: team.owner_email.clone(),
            name: team.name.clone(),
            description: team.description.clone(),
            agents: team.agents,
            created_at,
        })
    }

    async fn list_by_owner(&self, owner_email: &str) -> Result<Vec<Team>, RepositoryError> {
        let rows = sqlx::query("SELECT * FROM teams WHERE owner_email = ? ORDER BY id")
            .bind(owner_email)
            .fetch_all(&self.pool.reader)
            .await
            .map_err(query_error)?;

        rows.iter().map(team_from_row).collect()
    }

    async fn delete_by_owner(&self, owner_email: &str) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM teams WHERE owner_email = ?")
            .bind(owner_email)
            .execute(&self.pool.writer)
            .await
            .map_err(query_error)?;

        Ok(result.rows_affected())
    }
}
