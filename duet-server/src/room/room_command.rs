use duet_core::{ChatMessage, ConnectionId, SignalEvent};

/// Commands a room receives from the WebSocket layer.
#[derive(Debug)]
pub enum RoomCommand {
    /// A connection announced itself under a display name.
    Join {
        conn_id: ConnectionId,
        user_name: String,
    },

    Leave { conn_id: ConnectionId },

    /// Chat line to store and fan out to the other members.
    Chat {
        conn_id: ConnectionId,
        message: ChatMessage,
    },

    /// Negotiation event passed through to the other members untouched.
    Relay {
        conn_id: ConnectionId,
        event: SignalEvent,
    },

    /// The WebSocket closed.
    Disconnect { conn_id: ConnectionId },
}
