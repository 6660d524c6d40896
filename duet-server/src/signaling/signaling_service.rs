use crate::signaling::SignalingOutput;
use async_trait::async_trait;
use axum::extract::ws::Message;
use dashmap::DashMap;
use duet_core::{ConnectionId, SignalEvent};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, warn};

/// Outbound queues of every open WebSocket, keyed by connection.
#[derive(Clone, Default)]
pub struct SignalingService {
    connections: Arc<DashMap<ConnectionId, mpsc::UnboundedSender<Message>>>,
}

impl SignalingService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_connection(&self, conn_id: ConnectionId, tx: mpsc::UnboundedSender<Message>) {
        self.connections.insert(conn_id, tx);
    }

    pub fn remove_connection(&self, conn_id: &ConnectionId) {
        self.connections.remove(conn_id);
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    pub fn send_signal(&self, conn_id: ConnectionId, event: &SignalEvent) {
        let Some(connection) = self.connections.get(&conn_id) else {
            warn!(
                "Attempted to send {} to disconnected {}",
                event.name(),
                conn_id
            );
            return;
        };

        match serde_json::to_string(event) {
            Ok(json) => {
                if let Err(e) = connection.send(Message::Text(json.into())) {
                    error!("Failed to send WS message to {}: {:?}", conn_id, e);
                }
            }
            Err(e) => error!("Failed to serialize signal {}: {}", event.name(), e),
        }
    }
}

#[async_trait]
impl SignalingOutput for SignalingService {
    async fn send_event(&self, conn_id: ConnectionId, event: SignalEvent) {
        self.send_signal(conn_id, &event);
    }
}
