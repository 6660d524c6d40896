use crate::room::RoomCommand;
use crate::signaling::SignalingOutput;
use duet_core::{ChatMessage, ConnectionId, RoomId, SignalEvent};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

struct Member {
    conn_id: ConnectionId,
    name: String,
}

/// One room: members in join order and a bounded chat history.
pub struct Room {
    room_id: RoomId,
    members: Vec<Member>,
    history: VecDeque<ChatMessage>,
    history_limit: usize,
    command_rx: mpsc::Receiver<RoomCommand>,
    signaling: Arc<dyn SignalingOutput>,
}

impl Room {
    pub fn new(
        room_id: RoomId,
        history_limit: usize,
        command_rx: mpsc::Receiver<RoomCommand>,
        signaling: Arc<dyn SignalingOutput>,
    ) -> Self {
        Self {
            room_id,
            members: Vec::new(),
            history: VecDeque::new(),
            history_limit,
            command_rx,
            signaling,
        }
    }

    /// Runs until the room has nobody in it. The queue is then closed and
    /// any commands already in flight are handed back so the caller can
    /// route them to a fresh room.
    pub async fn run(mut self) -> Vec<RoomCommand> {
        info!("Room {} event loop started", self.room_id);

        while let Some(cmd) = self.command_rx.recv().await {
            self.handle_command(cmd).await;
            if self.members.is_empty() {
                info!("Room {} is empty, closing", self.room_id);
                break;
            }
        }

        self.command_rx.close();
        let mut leftovers = Vec::new();
        while let Ok(cmd) = self.command_rx.try_recv() {
            leftovers.push(cmd);
        }

        info!("Room {} event loop finished", self.room_id);
        leftovers
    }

    async fn handle_command(&mut self, cmd: RoomCommand) {
        match cmd {
            RoomCommand::Join { conn_id, user_name } => {
                let user_name = user_name.trim().to_owned();
                if user_name.is_empty() {
                    warn!("Join with blank name from {} ignored", conn_id);
                    return;
                }

                let rejoin = self.position(conn_id).is_some();
                if !rejoin {
                    info!("{} ({}) joined room {}", user_name, conn_id, self.room_id);
                    self.members.push(Member {
                        conn_id,
                        name: user_name.clone(),
                    });
                }

                let history = self.history.iter().cloned().collect();
                self.signaling
                    .send_event(conn_id, SignalEvent::ChatHistory(history))
                    .await;
                self.signaling
                    .send_event(conn_id, SignalEvent::RoomMembers(self.member_names()))
                    .await;

                if !rejoin {
                    self.broadcast(None, SignalEvent::UserJoined(user_name)).await;
                }
            }

            RoomCommand::Chat { conn_id, message } => {
                if self.position(conn_id).is_none() {
                    debug!("Chat from non-member {} ignored", conn_id);
                    return;
                }
                self.history.push_back(message.clone());
                while self.history.len() > self.history_limit {
                    self.history.pop_front();
                }
                self.broadcast(Some(conn_id), SignalEvent::ReceiveMessage(message))
                    .await;
            }

            RoomCommand::Relay { conn_id, event } => {
                if self.position(conn_id).is_none() {
                    debug!("{} from non-member {} ignored", event.name(), conn_id);
                    return;
                }
                debug!("Relaying {} from {}", event.name(), conn_id);
                self.broadcast(Some(conn_id), event).await;
            }

            RoomCommand::Leave { conn_id } | RoomCommand::Disconnect { conn_id } => {
                self.remove_member(conn_id).await;
            }
        }
    }

    async fn remove_member(&mut self, conn_id: ConnectionId) {
        let Some(pos) = self.position(conn_id) else {
            return;
        };
        let member = self.members.remove(pos);
        info!("{} ({}) left room {}", member.name, conn_id, self.room_id);
        self.broadcast(None, SignalEvent::UserLeft(member.name)).await;
    }

    /// Send to every member except `skip`.
    async fn broadcast(&self, skip: Option<ConnectionId>, event: SignalEvent) {
        for member in self.members.iter().filter(|m| Some(m.conn_id) != skip) {
            self.signaling.send_event(member.conn_id, event.clone()).await;
        }
    }

    fn position(&self, conn_id: ConnectionId) -> Option<usize> {
        self.members.iter().position(|m| m.conn_id == conn_id)
    }

    fn member_names(&self) -> Vec<String> {
        self.members.iter().map(|m| m.name.clone()).collect()
    }
}
