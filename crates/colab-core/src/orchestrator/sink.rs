//! Outbound event sinks for produced turns and status updates.

use tokio::sync::mpsc;
use tracing::trace;

use colab_types::session::ServerEvent;

/// Where the orchestrator pushes events as an exchange progresses.
///
/// `emit` must not block and must not fail: a sink whose receiver has gone
/// away drops the event.
pub trait MessageSink: Send + Sync {
    fn emit(&self, event: ServerEvent);
}

/// Discards every event. Used by the request/response path.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl MessageSink for NullSink {
    fn emit(&self, _event: ServerEvent) {}
}

/// Forwards events into a connection's outbound queue.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<ServerEvent>,
}

impl ChannelSink {
    pub fn new(tx: mpsc::UnboundedSender<ServerEvent>) -> Self {
        Self { tx }
    }
}

impl MessageSink for ChannelSink {
    fn emit(&self, event: ServerEvent) {
        if self.tx.send(event).is_err() {
            trace!("Connection closed, dropping event");
        }
    }
}
