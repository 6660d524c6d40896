use crate::app::AppState;
use crate::room::{RoomCommand, RoomManager};
use axum::extract::State;
use axum::extract::WebSocketUpgrade;
use axum::extract::ws::{Message, WebSocket};
use axum::response::IntoResponse;
use duet_core::{ConnectionId, JoinRoom, RoomId, SignalEvent};
use futures::stream::SplitStream;
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    let conn_id = ConnectionId::new();

    ws.on_upgrade(move |socket| handle_socket(socket, conn_id, state))
}

async fn handle_socket(socket: WebSocket, conn_id: ConnectionId, state: AppState) {
    info!("New WebSocket connection: {}", conn_id);

    let (mut sender, receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel();

    state.signaling.add_connection(conn_id, tx);

    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(msg).await.is_err() {
                break;
            }
        }
    });

    let mut router = ConnectionRouter::new(conn_id, state.rooms.clone());

    tokio::select! {
        _ = (&mut send_task) => {},
        _ = router.pump(receiver) => {},
    };
    send_task.abort();

    router.disconnect().await;
    state.signaling.remove_connection(&conn_id);
    info!("WebSocket disconnected: {}", conn_id);
}

/// Routes one socket's events to the room it has joined. A socket is in at
/// most one room at a time.
struct ConnectionRouter {
    conn_id: ConnectionId,
    rooms: RoomManager,
    current: Option<(RoomId, mpsc::Sender<RoomCommand>)>,
}

impl ConnectionRouter {
    fn new(conn_id: ConnectionId, rooms: RoomManager) -> Self {
        Self {
            conn_id,
            rooms,
            current: None,
        }
    }

    async fn pump(&mut self, mut receiver: SplitStream<WebSocket>) {
        while let Some(Ok(msg)) = receiver.next().await {
            match msg {
                Message::Text(text) => match serde_json::from_str::<SignalEvent>(&text) {
                    Ok(event) => self.route(event).await,
                    Err(e) => warn!("Invalid signal from {}: {}", self.conn_id, e),
                },
                Message::Close(_) => break,
                _ => {}
            }
        }
    }

    async fn route(&mut self, event: SignalEvent) {
        match event {
            SignalEvent::JoinRoom(JoinRoom { room_id, user_name }) => {
                if room_id.as_str().trim().is_empty() {
                    warn!("Join with blank room id from {} ignored", self.conn_id);
                    return;
                }
                let switching = self
                    .current
                    .as_ref()
                    .is_some_and(|(current, _)| *current != room_id);
                if switching {
                    self.leave().await;
                }

                let room = self.rooms.get_room_sender(&room_id);
                let cmd = RoomCommand::Join {
                    conn_id: self.conn_id,
                    user_name,
                };
                if let Some(room) = self.deliver(&room_id, room, cmd).await {
                    self.current = Some((room_id, room));
                }
            }

            SignalEvent::LeaveRoom(payload) => {
                if self.is_current(&payload.room_id) {
                    self.leave().await;
                }
            }

            SignalEvent::SendMessage(chat) => {
                if !self.is_current(&chat.room_id) {
                    debug!("Chat for room {} not joined by {}", chat.room_id, self.conn_id);
                    return;
                }
                let cmd = RoomCommand::Chat {
                    conn_id: self.conn_id,
                    message: chat.into_message(),
                };
                self.deliver_current(cmd).await;
            }

            event if event.is_negotiation() => {
                if !event.room_id().is_some_and(|id| self.is_current(id)) {
                    debug!("{} outside joined room from {}", event.name(), self.conn_id);
                    return;
                }
                let cmd = RoomCommand::Relay {
                    conn_id: self.conn_id,
                    event,
                };
                self.deliver_current(cmd).await;
            }

            other => warn!("Unexpected {} from client {}", other.name(), self.conn_id),
        }
    }

    fn is_current(&self, room_id: &RoomId) -> bool {
        self.current.as_ref().is_some_and(|(id, _)| id == room_id)
    }

    async fn deliver_current(&mut self, cmd: RoomCommand) {
        let Some((room_id, room)) = self.current.take() else {
            return;
        };
        if let Some(room) = self.deliver(&room_id, room, cmd).await {
            self.current = Some((room_id, room));
        }
    }

    async fn leave(&mut self) {
        self.depart(RoomCommand::Leave {
            conn_id: self.conn_id,
        })
        .await;
    }

    async fn disconnect(&mut self) {
        self.depart(RoomCommand::Disconnect {
            conn_id: self.conn_id,
        })
        .await;
    }

    /// A closed room has no members left, so a departure needs no retry.
    async fn depart(&mut self, cmd: RoomCommand) {
        if let Some((room_id, room)) = self.current.take() {
            if room.send(cmd).await.is_err() {
                debug!("Room {} already closed", room_id);
            }
        }
    }

    /// Send to `room`, following the room to a fresh instance when the one
    /// we hold has shut down. Returns the sender that took the command.
    async fn deliver(
        &self,
        room_id: &RoomId,
        room: mpsc::Sender<RoomCommand>,
        cmd: RoomCommand,
    ) -> Option<mpsc::Sender<RoomCommand>> {
        let cmd = match room.send(cmd).await {
            Ok(()) => return Some(room),
            Err(mpsc::error::SendError(cmd)) => cmd,
        };

        debug!("Room {} closed under {}, reopening", room_id, self.conn_id);
        let fresh = self.rooms.get_room_sender(room_id);
        match fresh.send(cmd).await {
            Ok(()) => Some(fresh),
            Err(e) => {
                error!("Room died: {}", e);
                None
            }
        }
    }
}
