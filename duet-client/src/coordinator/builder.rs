use crate::channel::{SignalingChannel, WsChannel};
use crate::clock::{Clock, LocalClock};
use crate::config::ClientConfig;
use crate::coordinator::RoomHandle;
use crate::error::ClientError;
use crate::negotiation::{
    CallCollaborators, MediaCapture, PeerLinkFactory, RtcPeerLinkFactory, SilentCapture,
};
use std::sync::Arc;

/// Wires the WebSocket channel, the `webrtc` peer links and a capture
/// backend into a running coordinator.
pub struct ClientBuilder {
    config: ClientConfig,
    capture: Arc<dyn MediaCapture>,
    clock: Arc<dyn Clock>,
    links: Option<Arc<dyn PeerLinkFactory>>,
}

impl ClientBuilder {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            capture: Arc::new(SilentCapture),
            clock: Arc::new(LocalClock),
            links: None,
        }
    }

    pub fn with_capture(mut self, capture: Arc<dyn MediaCapture>) -> Self {
        self.capture = capture;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_peer_links(mut self, links: Arc<dyn PeerLinkFactory>) -> Self {
        self.links = Some(links);
        self
    }

    pub async fn connect(self) -> Result<RoomHandle, ClientError> {
        let channel = WsChannel::connect(&self.config.server_url, self.config.reconnect.clone())
            .await?;
        Ok(self.spawn_with(Arc::new(channel)))
    }

    /// Start a coordinator over an already established channel.
    pub fn spawn_with(self, channel: Arc<dyn SignalingChannel>) -> RoomHandle {
        let links: Arc<dyn PeerLinkFactory> = match self.links {
            Some(links) => links,
            None => Arc::new(RtcPeerLinkFactory::new(self.config.ice_servers.clone())),
        };
        let collaborators = CallCollaborators {
            channel,
            capture: self.capture,
            links,
        };
        RoomHandle::spawn(collaborators, self.clock)
    }
}
