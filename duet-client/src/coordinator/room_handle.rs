use crate::clock::Clock;
use crate::coordinator::{RoomCommand, RoomCoordinator};
use crate::error::ClientError;
use crate::negotiation::CallCollaborators;
use crate::projector::ViewState;
use crate::room::JoinOutcome;
use duet_core::{ChatMessage, RoomId};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch};

/// Cloneable front-end handle to a running [`RoomCoordinator`].
#[derive(Clone)]
pub struct RoomHandle {
    commands: mpsc::Sender<RoomCommand>,
    view: watch::Receiver<ViewState>,
}

impl RoomHandle {
    /// Spawn a coordinator on the current runtime.
    pub fn spawn(collaborators: CallCollaborators, clock: Arc<dyn Clock>) -> Self {
        let (commands, command_rx) = mpsc::channel(100);
        let (view_tx, view) = watch::channel(ViewState::default());

        let coordinator = RoomCoordinator::new(collaborators, clock, command_rx, view_tx);
        tokio::spawn(coordinator.run());

        Self { commands, view }
    }

    pub async fn join_room(
        &self,
        room_id: RoomId,
        name: impl Into<String>,
    ) -> Result<JoinOutcome, ClientError> {
        let user_name = name.into();
        let outcome = self
            .request(|reply| RoomCommand::JoinRoom {
                room_id,
                user_name,
                reply,
            })
            .await??;
        Ok(outcome)
    }

    pub async fn leave_room(&self) -> Result<bool, ClientError> {
        self.request(|reply| RoomCommand::LeaveRoom { reply }).await
    }

    pub async fn send_message(&self, body: impl Into<String>) -> Result<ChatMessage, ClientError> {
        let body = body.into();
        let message = self
            .request(|reply| RoomCommand::SendMessage { body, reply })
            .await??;
        Ok(message)
    }

    /// Resolves once the offer is out, capture failed, or the attempt was
    /// hung up or overtaken by the other peer's offer. The room keeps
    /// handling events and commands meanwhile.
    pub async fn start_call(&self) -> Result<(), ClientError> {
        self.request(|reply| RoomCommand::StartCall { reply })
            .await?
    }

    pub async fn hang_up(&self) -> Result<bool, ClientError> {
        self.request(|reply| RoomCommand::HangUp { reply }).await
    }

    pub async fn toggle_mic(&self) -> Result<Option<bool>, ClientError> {
        self.request(|reply| RoomCommand::ToggleMic { reply }).await
    }

    pub async fn toggle_cam(&self) -> Result<Option<bool>, ClientError> {
        self.request(|reply| RoomCommand::ToggleCam { reply }).await
    }

    /// Hang up, leave and stop the coordinator.
    pub async fn shutdown(&self) -> Result<(), ClientError> {
        self.request(|reply| RoomCommand::Shutdown { reply }).await
    }

    /// Receiver that wakes on every change to the projected view.
    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.view.clone()
    }

    /// Latest projected view.
    pub fn view(&self) -> ViewState {
        self.view.borrow().clone()
    }

    async fn request<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<T>) -> RoomCommand,
    ) -> Result<T, ClientError> {
        let (reply, rx) = oneshot::channel();
        self.commands
            .send(make(reply))
            .await
            .map_err(|_| ClientError::CoordinatorGone)?;
        rx.await.map_err(|_| ClientError::CoordinatorGone)
    }
}
