use serde::{Deserialize, Serialize};

use crate::utils::SYSTEM_AUTHOR;

/// A message written by a participant, as carried on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    #[serde(rename = "userName")]
    pub author: String,
    #[serde(rename = "message")]
    pub body: String,
    /// Display-only hour:minute stamp. Never used for ordering.
    #[serde(rename = "time")]
    pub sent_at: String,
}

impl ChatMessage {
    pub fn new(
        author: impl Into<String>,
        body: impl Into<String>,
        sent_at: impl Into<String>,
    ) -> Self {
        Self {
            author: author.into(),
            body: body.into(),
            sent_at: sent_at.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Joined,
    Left,
}

/// Membership notice synthesized locally, never sent over the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemNotice {
    pub kind: NoticeKind,
    pub name: String,
    pub sent_at: String,
}

impl SystemNotice {
    pub fn joined(name: impl Into<String>, sent_at: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Joined,
            name: name.into(),
            sent_at: sent_at.into(),
        }
    }

    pub fn left(name: impl Into<String>, sent_at: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Left,
            name: name.into(),
            sent_at: sent_at.into(),
        }
    }

    pub fn body(&self) -> String {
        match self.kind {
            NoticeKind::Joined => format!("{} joined the room", self.name),
            NoticeKind::Left => format!("{} left the room", self.name),
        }
    }
}

/// One line of room history, in local append order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatEntry {
    Notice(SystemNotice),
    Message(ChatMessage),
}

impl ChatEntry {
    pub fn author(&self) -> &str {
        match self {
            ChatEntry::Notice(_) => SYSTEM_AUTHOR,
            ChatEntry::Message(msg) => &msg.author,
        }
    }

    pub fn body(&self) -> String {
        match self {
            ChatEntry::Notice(notice) => notice.body(),
            ChatEntry::Message(msg) => msg.body.clone(),
        }
    }

    pub fn sent_at(&self) -> &str {
        match self {
            ChatEntry::Notice(notice) => &notice.sent_at,
            ChatEntry::Message(msg) => &msg.sent_at,
        }
    }

    pub fn is_notice(&self) -> bool {
        matches!(self, ChatEntry::Notice(_))
    }
}

impl From<ChatMessage> for ChatEntry {
    fn from(msg: ChatMessage) -> Self {
        ChatEntry::Message(msg)
    }
}

impl From<SystemNotice> for ChatEntry {
    fn from(notice: SystemNotice) -> Self {
        ChatEntry::Notice(notice)
    }
}
