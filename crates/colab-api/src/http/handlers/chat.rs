//! Request/response chat and saved transcript handlers.

use axum::Json;
use axum::extract::State;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::debug;

use colab_types::agent::AgentId;
use colab_types::session::Room;

use crate::http::error::AppError;
use crate::http::extractors::AppJson;
use crate::http::handlers::EmailRequest;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatTeamRequest {
    pub message: String,
    pub agent_one: AgentId,
    pub agent_two: AgentId,
    pub agent_three: AgentId,
}

#[derive(Debug, Deserialize)]
pub struct StoreChatRequest {
    pub email: String,
    #[serde(rename = "chatName", alias = "chat_name")]
    pub chat_name: String,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct GetChatRequest {
    #[serde(rename = "chatName", alias = "chat_name")]
    pub chat_name: String,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DeleteChatRequest {
    pub email: String,
    #[serde(rename = "chatName", alias = "chat_name")]
    pub chat_name: String,
}

/// POST /chat - one exchange with the default assistant.
pub async fn chat(
    State(state): State<AppState>,
    AppJson(body): AppJson<ChatRequest>,
) -> Result<Json<Value>, AppError> {
    let exchange = state
        .orchestrator
        .chat_once(Room::Single, &body.message)
        .await?;
    debug!(outcome = ?exchange.outcome, turns = exchange.turns.len(), "Chat finished");

    Ok(Json(json!({ "response": exchange.transcript() })))
}

/// POST /chat_team - one group exchange with three stored agents.
pub async fn chat_team(
    State(state): State<AppState>,
    AppJson(body): AppJson<ChatTeamRequest>,
) -> Result<Json<Value>, AppError> {
    let room = Room::Team {
        agents: [body.agent_one, body.agent_two, body.agent_three],
    };
    let exchange = state.orchestrator.chat_once(room, &body.message).await?;
    debug!(outcome = ?exchange.outcome, turns = exchange.turns.len(), "Team chat finished");

    Ok(Json(json!({ "response": exchange.transcript() })))
}

/// POST /store_chat
pub async fn store_chat(
    State(state): State<AppState>,
    AppJson(body): AppJson<StoreChatRequest>,
) -> Result<Json<Value>, AppError> {
    state
        .chat_service
        .store(&body.email, &body.chat_name, &body.message)
        .await?;

    Ok(Json(json!({ "response": "Message stored" })))
}

/// POST /get_previous_chat
pub async fn get_previous_chat(
    State(state): State<AppState>,
    AppJson(body): AppJson<GetChatRequest>,
) -> Result<Json<Value>, AppError> {
    let chat = state
        .chat_service
        .fetch(&body.chat_name, body.email.as_deref())
        .await?;

    Ok(Json(json!({ "message": chat.content })))
}

/// POST /gather_previous_chat_names - `[chatName, chatId]` per transcript.
pub async fn gather_previous_chat_names(
    State(state): State<AppState>,
    AppJson(body): AppJson<EmailRequest>,
) -> Result<Json<Value>, AppError> {
    let chats = state.chat_service.list_names(&body.email).await?;
    let rows: Vec<Value> = chats.iter().map(|c| json!([c.chat_name, c.id])).collect();

    Ok(Json(json!({ "message": rows })))
}

/// POST /delete_chat
pub async fn delete_chat(
    State(state): State<AppState>,
    AppJson(body): AppJson<DeleteChatRequest>,
) -> Result<Json<Value>, AppError> {
    state
        .chat_service
        .delete(&body.email, &body.chat_name)
        .await?;

    Ok(Json(json!({ "response": "Chat Deleted" })))
}
