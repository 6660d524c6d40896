use duet_client::clock::FixedClock;
use duet_client::room::MembershipTracker;
use duet_core::ChatEntry;
use std::sync::Arc;

use crate::integration::init_tracing;
use crate::utils::{MockChannel, TEST_TIME, chat, room_id};

async fn joined_tracker(channel: &MockChannel, name: &str) -> MembershipTracker {
    let mut membership = MembershipTracker::new(
        Arc::new(channel.clone()),
        Arc::new(FixedClock(TEST_TIME.into())),
    );
    membership.join(room_id(), name).await.unwrap();
    membership
}

#[tokio::test]
async fn test_join_and_leave_notices() {
    init_tracing();
    let channel = MockChannel::new();
    let mut membership = joined_tracker(&channel, "Alice").await;

    assert!(membership.on_participant_joined("Bob"));
    assert!(membership.on_participant_left("Bob"));

    let room = membership.room().unwrap();
    assert_eq!(room.participants(), ["Alice".to_string()]);

    let bodies: Vec<_> = room.history().iter().map(ChatEntry::body).collect();
    assert_eq!(bodies, vec!["Bob joined the room", "Bob left the room"]);
    assert!(room.history().iter().all(|e| e.author() == "System"));
    assert!(room.history().iter().all(|e| e.sent_at() == TEST_TIME));
}

#[tokio::test]
async fn test_removing_absent_name_is_a_noop() {
    init_tracing();
    let channel = MockChannel::new();
    let mut membership = joined_tracker(&channel, "Alice").await;

    assert!(!membership.on_participant_left("Mallory"));

    let room = membership.room().unwrap();
    assert_eq!(room.participants(), ["Alice".to_string()]);
    assert!(room.history().is_empty());
}

#[tokio::test]
async fn test_history_snapshot_replaces_instead_of_merging() {
    init_tracing();
    let channel = MockChannel::new();
    let mut membership = joined_tracker(&channel, "Alice").await;

    membership.on_participant_joined("Bob");
    membership.on_history_snapshot(vec![chat("Bob", "one"), chat("Alice", "two")]);
    membership.on_history_snapshot(vec![chat("Bob", "one")]);

    let history = membership.room().unwrap().history();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0], ChatEntry::Message(chat("Bob", "one")));
}

#[tokio::test]
async fn test_member_snapshot_keeps_self_and_drops_duplicates() {
    init_tracing();
    let channel = MockChannel::new();
    let mut membership = joined_tracker(&channel, "Bob").await;

    membership.on_room_members(vec!["Alice".into(), "Alice".into(), " ".into()]);

    let room = membership.room().unwrap();
    assert_eq!(room.participants(), ["Alice".to_string(), "Bob".to_string()]);
}

#[tokio::test]
async fn test_events_without_room_are_ignored() {
    init_tracing();
    let mut membership = MembershipTracker::new(
        Arc::new(MockChannel::new()),
        Arc::new(FixedClock(TEST_TIME.into())),
    );

    assert!(!membership.on_participant_joined("Bob"));
    assert!(!membership.on_history_snapshot(vec![chat("Bob", "hi")]));
    assert!(membership.room().is_none());
}
