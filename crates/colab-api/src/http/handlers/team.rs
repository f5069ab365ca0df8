//! Team handlers.

use axum::Json;
use axum::extract::State;
use serde::Deserialize;
use serde_json::{Value, json};

use colab_types::agent::AgentId;
use colab_types::team::NewTeam;

use crate::http::error::AppError;
use crate::http::extractors::AppJson;
use crate::http::handlers::EmailRequest;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreTeamRequest {
    pub team_name: String,
    pub user_email: String,
    #[serde(default)]
    pub team_description: String,
    pub agent_one: AgentId,
    pub agent_two: AgentId,
    pub agent_three: AgentId,
}

/// POST /store_team
pub async fn store_team(
    State(state): State<AppState>,
    AppJson(body): AppJson<StoreTeamRequest>,
) -> Result<Json<Value>, AppError> {
    state
        .agent_service
        .store_team(NewTeam {
            owner_email: body.user_email,
            name: body.team_name,
            description: body.team_description,
            agents: [body.agent_one, body.agent_two, body.agent_three],
        })
        .await?;

    Ok(Json(json!({ "response": "Team stored" })))
}

/// POST /gather_teams - `[name, description, a1, a2, a3]` per team.
pub async fn gather_teams(
    State(state): State<AppState>,
    AppJson(body): AppJson<EmailRequest>,
) -> Result<Json<Value>, AppError> {
    let teams = state.agent_service.list_teams(&body.email).await?;
    let rows: Vec<Value> = teams
        .iter()
        .map(|t| {
            let [one, two, three] = t.agents;
            json!([t.name, t.description, one, two, three])
        })
        .collect();

    Ok(Json(json!({ "message": rows })))
}
