use crate::channel::SignalingChannel;
use crate::clock::Clock;
use crate::error::{ChannelError, Rejected};
use crate::room::RoomState;
use duet_core::{ChatMessage, JoinRoom, LeaveRoom, RoomId, SignalEvent};
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    Joined,
    /// Same room as before; nothing was emitted.
    AlreadyJoined,
}

/// Tracks who is in the active room and what has been said there.
pub struct MembershipTracker {
    channel: Arc<dyn SignalingChannel>,
    clock: Arc<dyn Clock>,
    room: Option<RoomState>,
}

impl MembershipTracker {
    pub fn new(channel: Arc<dyn SignalingChannel>, clock: Arc<dyn Clock>) -> Self {
        Self {
            channel,
            clock,
            room: None,
        }
    }

    pub fn room(&self) -> Option<&RoomState> {
        self.room.as_ref()
    }

    pub fn room_mut(&mut self) -> Option<&mut RoomState> {
        self.room.as_mut()
    }

    pub fn room_id(&self) -> Option<&RoomId> {
        self.room.as_ref().map(RoomState::room_id)
    }

    pub async fn join(&mut self, room_id: RoomId, name: &str) -> Result<JoinOutcome, Rejected> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Rejected::EmptyName);
        }

        if let Some(current) = &self.room {
            if *current.room_id() == room_id {
                debug!("Already joined room {}", room_id);
                return Ok(JoinOutcome::AlreadyJoined);
            }
        }

        if !self.channel.is_connected() {
            return Err(ChannelError::Unavailable.into());
        }

        if self.room.is_some() {
            self.leave().await;
        }

        self.channel
            .emit(SignalEvent::JoinRoom(JoinRoom {
                room_id: room_id.clone(),
                user_name: name.to_owned(),
            }))
            .await?;

        info!("Joined room {} as {}", room_id, name);
        self.room = Some(RoomState::new(room_id, name));
        Ok(JoinOutcome::Joined)
    }

    /// Drop the active room. The leave notice is best effort: the server
    /// also treats a closed socket as a leave.
    pub async fn leave(&mut self) -> Option<RoomState> {
        let room = self.room.take()?;
        let leave = SignalEvent::LeaveRoom(LeaveRoom {
            room_id: room.room_id().clone(),
        });
        if let Err(e) = self.channel.emit(leave).await {
            debug!("Leave for room {} not sent: {}", room.room_id(), e);
        }
        info!("Left room {}", room.room_id());
        Some(room)
    }

    /// Re-announce ourselves after the channel reconnects. The server answers
    /// with a fresh history snapshot.
    pub async fn rejoin(&mut self) -> Result<(), ChannelError> {
        let Some(room) = &self.room else {
            return Ok(());
        };
        info!("Rejoining room {} after reconnect", room.room_id());
        self.channel
            .emit(SignalEvent::JoinRoom(JoinRoom {
                room_id: room.room_id().clone(),
                user_name: room.self_name().to_owned(),
            }))
            .await
    }

    pub fn on_history_snapshot(&mut self, messages: Vec<ChatMessage>) -> bool {
        let Some(room) = self.room.as_mut() else {
            debug!("History snapshot with no active room, ignoring");
            return false;
        };
        debug!("History snapshot: {} messages", messages.len());
        room.replace_history(messages);
        true
    }

    pub fn on_room_members(&mut self, names: Vec<String>) -> bool {
        let Some(room) = self.room.as_mut() else {
            return false;
        };
        room.replace_participants(names);
        true
    }

    pub fn on_participant_joined(&mut self, name: &str) -> bool {
        let name = name.trim();
        let sent_at = self.clock.now_label();
        let Some(room) = self.room.as_mut() else {
            return false;
        };
        if name.is_empty() {
            return false;
        }
        room.participant_joined(name, &sent_at);
        true
    }

    pub fn on_participant_left(&mut self, name: &str) -> bool {
        let name = name.trim();
        let sent_at = self.clock.now_label();
        let Some(room) = self.room.as_mut() else {
            return false;
        };
        room.participant_left(name, &sent_at)
    }
}
