//! HTTP request handlers.

pub mod agent;
pub mod chat;
pub mod health;
pub mod team;
pub mod user;
pub mod ws;

use serde::Deserialize;

/// Body of the endpoints that only take the caller's email.
#[derive(Debug, Deserialize)]
pub struct EmailRequest {
    pub email: String,
}
