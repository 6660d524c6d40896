use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::utils::ROOM_ID_LEN;

/// Opaque room identifier. Immutable once a room has been joined.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(String);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidRoomId;

impl fmt::Display for InvalidRoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("room id is empty")
    }
}

impl std::error::Error for InvalidRoomId {}

impl RoomId {
    /// Random short id: six lowercase base-36 digits.
    pub fn generate() -> Self {
        let mut n = Uuid::new_v4().as_u128();
        let mut id = String::with_capacity(ROOM_ID_LEN);
        for _ in 0..ROOM_ID_LEN {
            let digit = (n % 36) as u32;
            n /= 36;
            id.push(char::from_digit(digit, 36).unwrap_or('0'));
        }
        Self(id)
    }

    pub fn parse(raw: &str) -> Result<Self, InvalidRoomId> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(InvalidRoomId);
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<str> for RoomId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for RoomId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}
