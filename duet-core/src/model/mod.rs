mod chat;
mod connection;
mod room;
mod signaling;

pub use chat::{ChatEntry, ChatMessage, NoticeKind, SystemNotice};
pub use connection::ConnectionId;
pub use room::{InvalidRoomId, RoomId};
pub use signaling::{
    AnswerPayload, CandidatePayload, IceCandidate, IceServerConfig, JoinRoom, LeaveRoom,
    OfferPayload, OutgoingChat, SdpKind, SessionDescription, SignalEvent,
};
