//! WebSocket handler for the real-time chat channel.
//!
//! The `/ws` endpoint upgrades an HTTP connection to a WebSocket. Each
//! connection gets:
//!
//! - a writer task draining an unbounded queue of [`ServerEvent`]s into
//!   JSON text frames, so workers never wait on the socket;
//! - one worker task per inbound `user_message` / `user_message_team`, which
//!   runs the exchange through the connection's session.
//!
//! Closing the socket removes the session. Workers already running keep going
//! until their provider calls return; their output is dropped.

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;

use colab_core::orchestrator::sink::{ChannelSink, MessageSink};
use colab_core::session::bridge::handle_client_event;
use colab_types::session::{ClientEvent, ConnectionId, ServerEvent};

use crate::state::AppState;

/// GET /ws
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_ws_connection(socket, state))
}

async fn handle_ws_connection(socket: WebSocket, state: AppState) {
    let connection = ConnectionId::new();
    let (mut ws_sender, mut ws_receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerEvent>();

    let send_task = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            match serde_json::to_string(&event) {
                Ok(json) => {
                    if ws_sender.send(Message::Text(json.into())).await.is_err() {
                        break;
                    }
                }
                Err(err) => {
                    tracing::warn!("Failed to serialize ServerEvent: {err}");
                }
            }
        }
    });

    let sink = ChannelSink::new(tx);
    sink.emit(ServerEvent::connected(connection));
    tracing::info!(connection = %connection, "WebSocket connected");

    while let Some(msg_result) = ws_receiver.next().await {
        match msg_result {
            Ok(Message::Text(text)) => match parse_client_event(&text) {
                Ok(event) => spawn_worker(&state, connection, event, sink.clone()),
                Err(err) => {
                    tracing::debug!(connection = %connection, "Invalid client frame: {err}");
                    sink.emit(ServerEvent::error(format!("Invalid message: {err}")));
                }
            },
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(err) => {
                tracing::debug!("WebSocket receive error: {err}");
                break;
            }
        }
    }

    state.sessions.remove(&connection);
    send_task.abort();
    tracing::info!(connection = %connection, "WebSocket disconnected");
}

fn parse_client_event(text: &str) -> Result<ClientEvent, serde_json::Error> {
    serde_json::from_str(text)
}

fn spawn_worker(state: &AppState, connection: ConnectionId, event: ClientEvent, sink: ChannelSink) {
    let orchestrator = state.orchestrator.clone();
    let sessions = state.sessions.clone();
    tokio::spawn(async move {
        handle_client_event(&orchestrator, &sessions, &connection, event, &sink).await;
    });
}
