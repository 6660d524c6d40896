/// Public reflection service used for candidate gathering when no ICE
/// servers are configured.
pub const DEFAULT_STUN_ADDR: &str = "stun:stun.l.google.com:19302";

/// Author label shown for synthetic membership notices.
pub const SYSTEM_AUTHOR: &str = "System";

/// Author used when a message is sent before a display name is known.
pub const ANONYMOUS_AUTHOR: &str = "Anonymous";

/// Length of identifiers produced by [`crate::RoomId::generate`].
pub const ROOM_ID_LEN: usize = 6;
