use crate::error::{ClientError, Rejected};
use crate::room::JoinOutcome;
use duet_core::{ChatMessage, RoomId};
use tokio::sync::oneshot;

/// Requests from the front end. Every variant carries its reply slot.
#[derive(Debug)]
pub enum RoomCommand {
    JoinRoom {
        room_id: RoomId,
        user_name: String,
        reply: oneshot::Sender<Result<JoinOutcome, Rejected>>,
    },

    /// Replies whether a room was actually left.
    LeaveRoom { reply: oneshot::Sender<bool> },

    SendMessage {
        body: String,
        reply: oneshot::Sender<Result<ChatMessage, Rejected>>,
    },

    StartCall {
        reply: oneshot::Sender<Result<(), ClientError>>,
    },

    HangUp { reply: oneshot::Sender<bool> },

    /// `None` when there is no call to toggle.
    ToggleMic { reply: oneshot::Sender<Option<bool>> },

    ToggleCam { reply: oneshot::Sender<Option<bool>> },

    Shutdown { reply: oneshot::Sender<()> },
}
