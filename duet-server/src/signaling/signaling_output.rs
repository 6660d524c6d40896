use async_trait::async_trait;
use duet_core::{ConnectionId, SignalEvent};

/// Implemented by the WebSocket layer so rooms can reach their members.
#[async_trait]
pub trait SignalingOutput: Send + Sync {
    /// Deliver one event to one connection. Unknown connections are skipped.
    async fn send_event(&self, conn_id: ConnectionId, event: SignalEvent);
}
