//! Runs client events from the real-time channel against a connection's
//! session.
//!
//! For each `user_message` / `user_message_team` the sink sees, in order:
//! `started`, then `processing`, then every agent turn, then exactly one final
//! status. A failure emits `error{error}` followed by `processing_status{error}`
//! and leaves any existing session in place.

use tracing::{debug, info, warn};

use colab_types::error::OrchestrationError;
use colab_types::session::{ClientEvent, ConnectionId, ProcessingStatus, Room, ServerEvent};

use crate::orchestrator::ChatOrchestrator;
use crate::orchestrator::room::{ChatRoom, ExchangeOutcome};
use crate::orchestrator::sink::MessageSink;
use crate::repository::agent::AgentRepository;

use super::registry::{SessionError, SessionHandle, SessionRegistry};

/// Error text sent when a team's agents cannot all be loaded.
pub const INCOMPLETE_TEAM_MESSAGE: &str = "Could not retrieve configurations for agents.";

pub type RoomRegistry = SessionRegistry<ChatRoom>;

/// Handle one client event for `connection`, reporting progress to `sink`.
pub async fn handle_client_event<A: AgentRepository>(
    orchestrator: &ChatOrchestrator<A>,
    registry: &RoomRegistry,
    connection: &ConnectionId,
    event: ClientEvent,
    sink: &dyn MessageSink,
) {
    sink.emit(ServerEvent::status(ProcessingStatus::Started));

    match run_event(orchestrator, registry, connection, &event, sink).await {
        Ok((outcome, handle)) => {
            sink.emit(ServerEvent::status(outcome.status()));
            if outcome == ExchangeOutcome::Terminated {
                registry.remove_if_current(connection, handle.generation());
                info!(connection = %connection, "Session terminated");
            }
        }
        Err(e) => {
            warn!(connection = %connection, error = %e, "Failed to process message");
            sink.emit(ServerEvent::error(client_message(&e)));
            sink.emit(ServerEvent::status(ProcessingStatus::Error));
        }
    }
}

async fn run_event<A: AgentRepository>(
    orchestrator: &ChatOrchestrator<A>,
    registry: &RoomRegistry,
    connection: &ConnectionId,
    event: &ClientEvent,
    sink: &dyn MessageSink,
) -> Result<(ExchangeOutcome, SessionHandle<ChatRoom>), SessionError> {
    if event.message().trim().is_empty() {
        return Err(OrchestrationError::EmptyMessage.into());
    }

    loop {
        let handle = open_session(orchestrator, registry, connection, event.room()).await?;
        let mut room = handle.lock().await;
        // The exchange ahead of us may have terminated or replaced this
        // session while we waited for the lock.
        if is_stale(registry, connection, &handle) {
            drop(room);
            registry.remove_if_current(connection, handle.generation());
            debug!(connection = %connection, generation = handle.generation(), "Session ended while queued, reopening");
            continue;
        }
        sink.emit(ServerEvent::status(ProcessingStatus::Processing));

        let exchange = orchestrator.run(&mut room, event.message(), sink).await?;
        if exchange.outcome == ExchangeOutcome::Terminated {
            handle.mark_terminated();
        }
        drop(room);
        return Ok((exchange.outcome, handle));
    }
}

fn is_stale(
    registry: &RoomRegistry,
    connection: &ConnectionId,
    handle: &SessionHandle<ChatRoom>,
) -> bool {
    handle.is_terminated() || !registry.is_current(connection, handle.generation())
}

/// Fetch the connection's session, replacing it if it was built for a
/// different room.
async fn open_session<A: AgentRepository>(
    orchestrator: &ChatOrchestrator<A>,
    registry: &RoomRegistry,
    connection: &ConnectionId,
    room: Room,
) -> Result<SessionHandle<ChatRoom>, SessionError> {
    let handle = registry
        .get_or_create(connection, || orchestrator.open_room(room))
        .await?;

    let current = handle.lock().await.room();
    if current == room || is_stale(registry, connection, &handle) {
        return Ok(handle);
    }

    debug!(connection = %connection, from = ?current, to = ?room, "Room changed, replacing session");
    registry.remove_if_current(connection, handle.generation());
    registry
        .get_or_create(connection, || orchestrator.open_room(room))
        .await
}

fn client_message(error: &SessionError) -> String {
    match error {
        SessionError::Init(OrchestrationError::IncompleteTeam { .. }) => {
            INCOMPLETE_TEAM_MESSAGE.to_string()
        }
        other => other.to_string(),
    }
}
