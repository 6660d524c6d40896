use crate::channel::SignalingChannel;
use crate::clock::Clock;
use crate::error::Rejected;
use crate::room::RoomState;
use duet_core::{ChatEntry, ChatMessage, OutgoingChat, SignalEvent};
use std::sync::Arc;
use tracing::debug;

/// Stamps outgoing chat and appends both directions to room history.
pub struct ChatPipeline {
    channel: Arc<dyn SignalingChannel>,
    clock: Arc<dyn Clock>,
}

impl ChatPipeline {
    pub fn new(channel: Arc<dyn SignalingChannel>, clock: Arc<dyn Clock>) -> Self {
        Self { channel, clock }
    }

    /// Emit and optimistically append. The server does not echo our own
    /// message back, so the local copy is the only one we will see.
    pub async fn send(
        &self,
        room: Option<&mut RoomState>,
        body: &str,
    ) -> Result<ChatMessage, Rejected> {
        if body.trim().is_empty() {
            return Err(Rejected::EmptyMessage);
        }
        let Some(room) = room else {
            return Err(Rejected::NoActiveRoom);
        };

        let outgoing = OutgoingChat {
            room_id: room.room_id().clone(),
            user_name: room.self_name().to_owned(),
            message: body.to_owned(),
            time: self.clock.now_label(),
        };
        self.channel
            .emit(SignalEvent::SendMessage(outgoing.clone()))
            .await?;

        let message = outgoing.into_message();
        room.append(ChatEntry::Message(message.clone()));
        Ok(message)
    }

    /// Appended verbatim, no deduplication.
    pub fn on_incoming(&self, room: Option<&mut RoomState>, message: ChatMessage) -> bool {
        let Some(room) = room else {
            debug!("Chat message with no active room, ignoring");
            return false;
        };
        room.append(ChatEntry::Message(message));
        true
    }
}
