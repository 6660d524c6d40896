use crate::negotiation::{LocalMedia, TrackKind};
use anyhow::Result;
use async_trait::async_trait;
use duet_core::{IceCandidate, SessionDescription};
use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    New,
    Connecting,
    Connected,
    Disconnected,
    Failed,
    Closed,
}

/// Events a peer-connection handle raises on its own.
#[derive(Debug, Clone, PartialEq)]
pub enum PeerEvent {
    /// Discovered locally; must be forwarded in this order.
    LocalCandidate(IceCandidate),
    LinkState(LinkState),
    RemoteTrack(TrackKind),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TaggedPeerEvent {
    pub session_id: u64,
    pub event: PeerEvent,
}

/// Where a handle reports its events, tagged with the owning session so
/// stragglers from a torn-down session can be told apart.
#[derive(Debug, Clone)]
pub struct PeerEventSink {
    session_id: u64,
    tx: mpsc::UnboundedSender<TaggedPeerEvent>,
}

impl PeerEventSink {
    pub fn new(session_id: u64, tx: mpsc::UnboundedSender<TaggedPeerEvent>) -> Self {
        Self { session_id, tx }
    }

    pub fn session_id(&self) -> u64 {
        self.session_id
    }

    pub fn send(&self, event: PeerEvent) -> bool {
        self.tx
            .send(TaggedPeerEvent {
                session_id: self.session_id,
                event,
            })
            .is_ok()
    }
}

/// One direct peer connection. Owned exclusively by a negotiation session.
#[async_trait]
pub trait PeerLink: Send + Sync {
    async fn attach_media(&self, media: &LocalMedia) -> Result<()>;

    /// Create an offer and apply it as the local description.
    async fn create_offer(&self) -> Result<SessionDescription>;

    /// Create an answer and apply it as the local description.
    async fn create_answer(&self) -> Result<SessionDescription>;

    async fn set_remote_description(&self, description: SessionDescription) -> Result<()>;

    async fn add_ice_candidate(&self, candidate: IceCandidate) -> Result<()>;

    async fn close(&self) -> Result<()>;
}

#[async_trait]
pub trait PeerLinkFactory: Send + Sync {
    async fn open(&self, events: PeerEventSink) -> Result<Box<dyn PeerLink>>;
}
