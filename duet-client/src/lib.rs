pub mod channel;
pub mod chat;
pub mod clock;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod negotiation;
pub mod projector;
pub mod room;

pub use channel::{ChannelEvent, SignalingChannel, WsChannel};
pub use clock::{Clock, FixedClock, LocalClock};
pub use config::{ClientConfig, ReconnectPolicy};
pub use coordinator::{ClientBuilder, RoomHandle};
pub use error::*;
pub use projector::{LineOrigin, ViewState};

use duet_core::RoomId;

/// Fresh random room id to share with the other participant.
pub fn create_room() -> RoomId {
    RoomId::generate()
}
