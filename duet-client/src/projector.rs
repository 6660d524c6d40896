use crate::negotiation::{NegotiationSession, NegotiationState};
use crate::room::RoomState;
use duet_core::{ChatEntry, RoomId};

pub const WAITING_LABEL: &str = "Waiting...";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineOrigin {
    System,
    Own,
    Remote,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatLine {
    pub origin: LineOrigin,
    pub author: String,
    pub body: String,
    pub sent_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParticipantView {
    pub name: String,
    pub is_self: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallView {
    pub state: NegotiationState,
    pub mic_enabled: bool,
    pub cam_enabled: bool,
    pub remote_label: String,
    pub remote_media: bool,
}

impl Default for CallView {
    fn default() -> Self {
        Self {
            state: NegotiationState::Idle,
            mic_enabled: true,
            cam_enabled: true,
            remote_label: WAITING_LABEL.to_owned(),
            remote_media: false,
        }
    }
}

/// Everything a front end needs to draw the room. Derived, never edited.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewState {
    pub room_id: Option<RoomId>,
    pub self_name: Option<String>,
    pub participants: Vec<ParticipantView>,
    pub lines: Vec<ChatLine>,
    pub call: CallView,
    pub connected: bool,
    pub alert: Option<String>,
}

impl ViewState {
    pub fn in_room(&self) -> bool {
        self.room_id.is_some()
    }
}

pub fn project(
    room: Option<&RoomState>,
    session: Option<&NegotiationSession>,
    connected: bool,
    alert: Option<&str>,
) -> ViewState {
    let mut view = ViewState {
        connected,
        alert: alert.map(str::to_owned),
        ..ViewState::default()
    };

    if let Some(room) = room {
        view.room_id = Some(room.room_id().clone());
        view.self_name = Some(room.self_name().to_owned());
        view.participants = room
            .participants()
            .iter()
            .map(|name| ParticipantView {
                name: name.clone(),
                is_self: name == room.self_name(),
            })
            .collect();
        view.lines = room
            .history()
            .iter()
            .map(|entry| chat_line(entry, room.self_name()))
            .collect();
    }

    if let Some(session) = session {
        let remote_label = match room.and_then(|r| r.others().next()) {
            Some(name) if session.remote_media() => name.to_owned(),
            _ => WAITING_LABEL.to_owned(),
        };
        view.call = CallView {
            state: session.state(),
            mic_enabled: session.mic_enabled(),
            cam_enabled: session.cam_enabled(),
            remote_label,
            remote_media: session.remote_media(),
        };
    }

    view
}

fn chat_line(entry: &ChatEntry, self_name: &str) -> ChatLine {
    let origin = match entry {
        ChatEntry::Notice(_) => LineOrigin::System,
        ChatEntry::Message(m) if m.author == self_name => LineOrigin::Own,
        ChatEntry::Message(_) => LineOrigin::Remote,
    };
    ChatLine {
        origin,
        author: entry.author().to_owned(),
        body: entry.body(),
        sent_at: entry.sent_at().to_owned(),
    }
}
