use serde::{Deserialize, Serialize};

use crate::model::chat::ChatMessage;
use crate::model::room::RoomId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IceServerConfig {
    pub urls: Vec<String>,
    pub username: Option<String>,
    pub credential: Option<String>,
}

impl IceServerConfig {
    pub fn stun(url: impl Into<String>) -> Self {
        Self {
            urls: vec![url.into()],
            username: None,
            credential: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SdpKind {
    Offer,
    Answer,
}

/// Session description exchanged during offer/answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionDescription {
    #[serde(rename = "type")]
    pub kind: SdpKind,
    pub sdp: String,
}

impl SessionDescription {
    pub fn offer(sdp: impl Into<String>) -> Self {
        Self {
            kind: SdpKind::Offer,
            sdp: sdp.into(),
        }
    }

    pub fn answer(sdp: impl Into<String>) -> Self {
        Self {
            kind: SdpKind::Answer,
            sdp: sdp.into(),
        }
    }
}

/// ICE candidate descriptor in the browser's `RTCIceCandidateInit` shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IceCandidate {
    pub candidate: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sdp_mid: Option<String>,
    #[serde(
        default,
        rename = "sdpMLineIndex",
        skip_serializing_if = "Option::is_none"
    )]
    pub sdp_m_line_index: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username_fragment: Option<String>,
}

impl IceCandidate {
    pub fn new(candidate: impl Into<String>) -> Self {
        Self {
            candidate: candidate.into(),
            sdp_mid: None,
            sdp_m_line_index: None,
            username_fragment: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinRoom {
    pub room_id: RoomId,
    pub user_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveRoom {
    pub room_id: RoomId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutgoingChat {
    pub room_id: RoomId,
    pub user_name: String,
    pub message: String,
    pub time: String,
}

impl OutgoingChat {
    pub fn into_message(self) -> ChatMessage {
        ChatMessage {
            author: self.user_name,
            body: self.message,
            sent_at: self.time,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferPayload {
    pub room_id: RoomId,
    pub offer: SessionDescription,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerPayload {
    pub room_id: RoomId,
    pub answer: SessionDescription,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidatePayload {
    pub room_id: RoomId,
    pub candidate: IceCandidate,
}

/// Every named event carried by the signaling channel, in both directions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum SignalEvent {
    JoinRoom(JoinRoom),
    LeaveRoom(LeaveRoom),
    ChatHistory(Vec<ChatMessage>),
    RoomMembers(Vec<String>),
    UserJoined(String),
    UserLeft(String),
    SendMessage(OutgoingChat),
    ReceiveMessage(ChatMessage),
    Offer(OfferPayload),
    Answer(AnswerPayload),
    Candidate(CandidatePayload),
}

impl SignalEvent {
    pub fn name(&self) -> &'static str {
        match self {
            SignalEvent::JoinRoom(_) => "join-room",
            SignalEvent::LeaveRoom(_) => "leave-room",
            SignalEvent::ChatHistory(_) => "chat-history",
            SignalEvent::RoomMembers(_) => "room-members",
            SignalEvent::UserJoined(_) => "user-joined",
            SignalEvent::UserLeft(_) => "user-left",
            SignalEvent::SendMessage(_) => "send-message",
            SignalEvent::ReceiveMessage(_) => "receive-message",
            SignalEvent::Offer(_) => "offer",
            SignalEvent::Answer(_) => "answer",
            SignalEvent::Candidate(_) => "candidate",
        }
    }

    /// Room the event is scoped to, for events that carry one.
    pub fn room_id(&self) -> Option<&RoomId> {
        match self {
            SignalEvent::JoinRoom(p) => Some(&p.room_id),
            SignalEvent::LeaveRoom(p) => Some(&p.room_id),
            SignalEvent::SendMessage(p) => Some(&p.room_id),
            SignalEvent::Offer(p) => Some(&p.room_id),
            SignalEvent::Answer(p) => Some(&p.room_id),
            SignalEvent::Candidate(p) => Some(&p.room_id),
            _ => None,
        }
    }

    /// Negotiation traffic the relay forwards untouched to the other peer.
    pub fn is_negotiation(&self) -> bool {
        matches!(
            self,
            SignalEvent::Offer(_) | SignalEvent::Answer(_) | SignalEvent::Candidate(_)
        )
    }
}
