//! User account handlers.

use axum::Json;
use axum::extract::State;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::http::error::AppError;
use crate::http::extractors::AppJson;
use crate::http::handlers::EmailRequest;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SignInRequest {
    pub name: String,
    pub email: String,
}

/// POST /review_sign_in - create the user on first sign-in.
pub async fn review_sign_in(
    State(state): State<AppState>,
    AppJson(body): AppJson<SignInRequest>,
) -> Result<Json<Value>, AppError> {
    let outcome = state
        .user_service
        .review_sign_in(&body.name, &body.email)
        .await?;

    Ok(Json(json!({ "response": outcome.to_string() })))
}

/// POST /delete_user - remove the user and everything they own.
///
/// Partial failures are reported as "User Not Deleted" with a 200; the steps
/// that did succeed stay committed.
pub async fn delete_user(
    State(state): State<AppState>,
    AppJson(body): AppJson<EmailRequest>,
) -> Result<Json<Value>, AppError> {
    let report = state.account_service.delete_account(&body.email).await?;
    let response = if report.is_complete() {
        "User Deleted"
    } else {
        "User Not Deleted"
    };

    Ok(Json(json!({ "response": response })))
}
