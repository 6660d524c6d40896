use crate::room::{Room, RoomCommand};
use crate::signaling::SignalingOutput;
use dashmap::DashMap;
use duet_core::RoomId;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Spawns one [`Room`] actor per room id on first use and drops it again
/// once the room empties.
#[derive(Clone)]
pub struct RoomManager {
    rooms: Arc<DashMap<RoomId, mpsc::Sender<RoomCommand>>>,
    signaling: Arc<dyn SignalingOutput>,
    history_limit: usize,
}

impl RoomManager {
    pub fn new(signaling: Arc<dyn SignalingOutput>, history_limit: usize) -> Self {
        Self {
            rooms: Arc::new(DashMap::new()),
            signaling,
            history_limit,
        }
    }

    pub fn get_room_sender(&self, room_id: &RoomId) -> mpsc::Sender<RoomCommand> {
        let mut entry = self
            .rooms
            .entry(room_id.clone())
            .or_insert_with(|| self.spawn_room(room_id));

        if entry.is_closed() {
            *entry = self.spawn_room(room_id);
        }
        entry.value().clone()
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    fn spawn_room(&self, room_id: &RoomId) -> mpsc::Sender<RoomCommand> {
        info!("Creating new room: {}", room_id);
        let (tx, rx) = mpsc::channel(100);
        let room = Room::new(
            room_id.clone(),
            self.history_limit,
            rx,
            self.signaling.clone(),
        );

        let manager = self.clone();
        let room_id = room_id.clone();
        tokio::spawn(async move {
            let leftovers = room.run().await;
            manager.reclaim(&room_id, leftovers).await;
        });
        tx
    }

    /// Forget a finished room. Commands that raced its shutdown go to a
    /// fresh instance.
    async fn reclaim(&self, room_id: &RoomId, leftovers: Vec<RoomCommand>) {
        if self
            .rooms
            .remove_if(room_id, |_, tx| tx.is_closed())
            .is_some()
        {
            info!("Room {} removed", room_id);
        }
        if leftovers.is_empty() {
            return;
        }

        debug!("Rerouting {} commands for room {}", leftovers.len(), room_id);
        let room = self.get_room_sender(room_id);
        for cmd in leftovers {
            if room.send(cmd).await.is_err() {
                warn!("Room {} closed while rerouting", room_id);
                return;
            }
        }
    }
}
