//! Application error type mapping to HTTP status codes and the error body.
//!
//! Every failure renders as `{"error": <message>, "code": <CODE>}`.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use colab_core::session::bridge::INCOMPLETE_TEAM_MESSAGE;
use colab_types::error::{AgentError, ChatError, OrchestrationError, UserError};
use colab_types::llm::LlmError;

const INTERNAL_MESSAGE: &str = "Internal server error";

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    User(UserError),
    Agent(AgentError),
    Chat(ChatError),
    Orchestration(OrchestrationError),
    /// Malformed or incomplete request body.
    BadRequest(String),
}

impl From<UserError> for AppError {
    fn from(e: UserError) -> Self {
        AppError::User(e)
    }
}

impl From<AgentError> for AppError {
    fn from(e: AgentError) -> Self {
        AppError::Agent(e)
    }
}

impl From<ChatError> for AppError {
    fn from(e: ChatError) -> Self {
        AppError::Chat(e)
    }
}

impl From<OrchestrationError> for AppError {
    fn from(e: OrchestrationError) -> Self {
        AppError::Orchestration(e)
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl AppError {
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::User(UserError::InvalidEmail(_))
            | AppError::Agent(AgentError::InvalidDefinition(_) | AgentError::InvalidTeam(_))
            | AppError::Chat(ChatError::Invalid(_))
            | AppError::Orchestration(OrchestrationError::EmptyMessage) => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", self.detail())
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::Chat(ChatError::NotFound(_)) => {
                (StatusCode::NOT_FOUND, "NOT_FOUND", self.detail())
            }
            AppError::Orchestration(OrchestrationError::IncompleteTeam { .. }) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "INCOMPLETE_TEAM",
                INCOMPLETE_TEAM_MESSAGE.to_string(),
            ),
            AppError::Orchestration(OrchestrationError::Llm(LlmError::Timeout { .. })) => {
                (StatusCode::GATEWAY_TIMEOUT, "PROVIDER_TIMEOUT", self.detail())
            }
            AppError::Orchestration(OrchestrationError::Llm(_)) => {
                (StatusCode::BAD_GATEWAY, "PROVIDER_ERROR", self.detail())
            }
            AppError::User(UserError::StorageError(_))
            | AppError::Agent(AgentError::StorageError(_))
            | AppError::Chat(ChatError::StorageError(_))
            | AppError::Orchestration(OrchestrationError::Lookup(_)) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                INTERNAL_MESSAGE.to_string(),
            ),
        }
    }

    fn detail(&self) -> String {
        match self {
            AppError::User(e) => e.to_string(),
            AppError::Agent(e) => e.to_string(),
            AppError::Chat(e) => e.to_string(),
            AppError::Orchestration(e) => e.to_string(),
            AppError::BadRequest(msg) => msg.clone(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();

        if status.is_server_error() {
            if status == StatusCode::INTERNAL_SERVER_ERROR {
                tracing::error!(code, error = %self.detail(), "Request failed");
            } else {
                tracing::warn!(code, error = %self.detail(), "Provider call failed");
            }
        }

        let body = json!({
            "error": message,
            "code": code,
        });

        (
            status,
            [(axum::http::header::CONTENT_TYPE, "application/json")],
            body.to_string(),
        )
            .into_response()
    }
}
