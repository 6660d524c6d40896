use duet_core::utils::ANONYMOUS_AUTHOR;
use duet_core::{ChatEntry, ChatMessage, RoomId, SystemNotice};

/// Membership and history of the one room this process has joined.
///
/// `participants` keeps join order and never holds duplicates. `history`
/// keeps local append order; nothing here sorts by timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct RoomState {
    room_id: RoomId,
    self_name: String,
    participants: Vec<String>,
    history: Vec<ChatEntry>,
}

impl RoomState {
    /// The server does not always list us, so we insert ourselves up front.
    /// A blank name becomes `Anonymous`.
    pub fn new(room_id: RoomId, self_name: impl Into<String>) -> Self {
        let self_name = match self_name.into().trim() {
            "" => ANONYMOUS_AUTHOR.to_owned(),
            name => name.to_owned(),
        };
        Self {
            room_id,
            participants: vec![self_name.clone()],
            self_name,
            history: Vec::new(),
        }
    }

    pub fn room_id(&self) -> &RoomId {
        &self.room_id
    }

    pub fn self_name(&self) -> &str {
        &self.self_name
    }

    pub fn participants(&self) -> &[String] {
        &self.participants
    }

    pub fn history(&self) -> &[ChatEntry] {
        &self.history
    }

    pub fn contains(&self, name: &str) -> bool {
        self.participants.iter().any(|p| p == name)
    }

    /// Participants other than ourselves, in join order.
    pub fn others(&self) -> impl Iterator<Item = &str> {
        self.participants
            .iter()
            .map(String::as_str)
            .filter(move |p| *p != self.self_name)
    }

    /// Reconnects redeliver the full history, so this always replaces.
    pub fn replace_history(&mut self, messages: Vec<ChatMessage>) {
        self.history = messages.into_iter().map(ChatEntry::Message).collect();
    }

    /// Replace membership with a server snapshot, collapsing duplicates and
    /// keeping ourselves listed.
    pub fn replace_participants(&mut self, names: Vec<String>) {
        let mut participants: Vec<String> = Vec::with_capacity(names.len() + 1);
        for name in names {
            let name = name.trim();
            if name.is_empty() || participants.iter().any(|p| p == name) {
                continue;
            }
            participants.push(name.to_owned());
        }
        if !participants.iter().any(|p| *p == self.self_name) {
            participants.push(self.self_name.clone());
        }
        self.participants = participants;
    }

    /// Returns whether the name was newly inserted. The notice is appended
    /// either way.
    pub fn participant_joined(&mut self, name: &str, sent_at: &str) -> bool {
        let inserted = !self.contains(name);
        if inserted {
            self.participants.push(name.to_owned());
        }
        self.history
            .push(ChatEntry::Notice(SystemNotice::joined(name, sent_at)));
        inserted
    }

    /// Removing an absent name changes nothing and appends nothing.
    pub fn participant_left(&mut self, name: &str, sent_at: &str) -> bool {
        let Some(pos) = self.participants.iter().position(|p| p == name) else {
            return false;
        };
        self.participants.remove(pos);
        self.history
            .push(ChatEntry::Notice(SystemNotice::left(name, sent_at)));
        true
    }

    pub fn append(&mut self, entry: ChatEntry) {
        self.history.push(entry);
    }
}
