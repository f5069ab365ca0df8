//! Axum router configuration with middleware.
//!
//! Routes are flat POST endpoints taking JSON bodies, plus `GET /health` and
//! the `GET /ws` upgrade. Middleware: permissive CORS and request tracing.

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

/// Build the complete router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Agents and teams
        .route("/create_agent", post(handlers::agent::create_agent))
        .route("/retrieve_agents", post(handlers::agent::retrieve_agents))
        .route("/store_team", post(handlers::team::store_team))
        .route("/gather_teams", post(handlers::team::gather_teams))
        // Chat
        .route("/chat", post(handlers::chat::chat))
        .route("/chat_team", post(handlers::chat::chat_team))
        // Saved transcripts
        .route("/store_chat", post(handlers::chat::store_chat))
        .route("/get_previous_chat", post(handlers::chat::get_previous_chat))
        .route(
            "/gather_previous_chat_names",
            post(handlers::chat::gather_previous_chat_names),
        )
        .route("/delete_chat", post(handlers::chat::delete_chat))
        // Users
        .route("/review_sign_in", post(handlers::user::review_sign_in))
        .route("/delete_user", post(handlers::user::delete_user))
        // Real-time channel
        .route("/ws", get(handlers::ws::ws_handler))
        .route("/health", get(handlers::health::health))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
