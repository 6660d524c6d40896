use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChannelError {
    #[error("signaling channel is not connected")]
    Unavailable,

    #[error("failed to encode signal: {0}")]
    Encode(String),

    #[error("failed to connect to signaling server: {0}")]
    Connect(String),
}

/// Why media capture failed. Surfaced to the user; never retried automatically.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CaptureError {
    #[error("permission to capture media was denied: {0}")]
    PermissionDenied(String),

    #[error("no capture device available: {0}")]
    DeviceUnavailable(String),
}

/// The only negotiation failure that reaches the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CallError {
    #[error(transparent)]
    Capture(#[from] CaptureError),
}

/// Input rejected locally before anything is emitted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejected {
    #[error("display name is empty")]
    EmptyName,

    #[error("room id is empty")]
    EmptyRoomId,

    #[error("message is empty")]
    EmptyMessage,

    #[error("no active room")]
    NoActiveRoom,

    #[error(transparent)]
    Channel(#[from] ChannelError),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    #[error(transparent)]
    Rejected(#[from] Rejected),

    #[error(transparent)]
    Call(#[from] CallError),

    #[error(transparent)]
    Channel(#[from] ChannelError),

    #[error("room coordinator has shut down")]
    CoordinatorGone,
}

/// Failures absorbed inside a negotiation session. They close the session
/// and are logged, never returned to the caller.
#[derive(Debug, Error)]
pub enum NegotiationError {
    #[error("no peer connection handle")]
    NoLink,

    #[error("peer connection handle already used by this session")]
    LinkSpent,

    #[error("peer connection entered {0:?}")]
    LinkLost(crate::negotiation::LinkState),

    #[error(transparent)]
    Link(#[from] anyhow::Error),

    #[error(transparent)]
    Channel(#[from] ChannelError),
}
