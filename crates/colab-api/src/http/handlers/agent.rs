//! Agent definition handlers.

use axum::Json;
use axum::extract::State;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::http::error::AppError;
use crate::http::extractors::AppJson;
use crate::http::handlers::EmailRequest;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateAgentRequest {
    pub email: String,
    pub specialisation: String,
    /// Stored as the agent's instructions.
    pub prompt: String,
}

/// POST /create_agent
pub async fn create_agent(
    State(state): State<AppState>,
    AppJson(body): AppJson<CreateAgentRequest>,
) -> Result<Json<Value>, AppError> {
    let agent = state
        .agent_service
        .create_agent(&body.email, &body.specialisation, &body.prompt)
        .await?;

    Ok(Json(json!({
        "message": "Agent Created",
        "id": agent.id,
    })))
}

/// POST /retrieve_agents - `[specialisation, instructions, id]` per agent.
pub async fn retrieve_agents(
    State(state): State<AppState>,
    AppJson(body): AppJson<EmailRequest>,
) -> Result<Json<Value>, AppError> {
    let agents = state.agent_service.list_agents(&body.email).await?;
    let rows: Vec<Value> = agents
        .iter()
        .map(|a| json!([a.specialisation, a.instructions, a.id]))
        .collect();

    Ok(Json(json!({ "message": rows })))
}
