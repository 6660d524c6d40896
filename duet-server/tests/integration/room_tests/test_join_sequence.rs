use duet_core::{ConnectionId, SignalEvent};
use duet_server::RoomCommand;

use crate::integration::{create_test_room, init_tracing};
use crate::utils::{drain, wait_for_event};

#[tokio::test]
async fn test_joiner_gets_snapshots_then_announcement() {
    init_tracing();
    let (room_tx, mut signal_rx, signaling) = create_test_room(500);
    let alice = ConnectionId::new();

    room_tx
        .send(RoomCommand::Join {
            conn_id: alice,
            user_name: "Alice".into(),
        })
        .await
        .unwrap();
    wait_for_event(&mut signal_rx, alice, "user-joined")
        .await
        .expect("Alice should hear her own arrival");

    assert_eq!(
        signaling.names_for(alice).await,
        vec!["chat-history", "room-members", "user-joined"]
    );
    assert_eq!(
        signaling.events_for(alice).await[1],
        SignalEvent::RoomMembers(vec!["Alice".into()])
    );
}

#[tokio::test]
async fn test_second_joiner_is_announced_to_everyone() {
    init_tracing();
    let (room_tx, mut signal_rx, signaling) = create_test_room(500);
    let alice = ConnectionId::new();
    let bob = ConnectionId::new();

    for (conn_id, name) in [(alice, "Alice"), (bob, "Bob")] {
        room_tx
            .send(RoomCommand::Join {
                conn_id,
                user_name: name.into(),
            })
            .await
            .unwrap();
    }
    wait_for_event(&mut signal_rx, bob, "user-joined").await.unwrap();
    drain(&mut signal_rx).await;

    let bob_events = signaling.events_for(bob).await;
    assert_eq!(
        bob_events[1],
        SignalEvent::RoomMembers(vec!["Alice".into(), "Bob".into()])
    );
    assert!(
        signaling
            .events_for(alice)
            .await
            .contains(&SignalEvent::UserJoined("Bob".into()))
    );
}

#[tokio::test]
async fn test_rejoin_resends_snapshots_only() {
    init_tracing();
    let (room_tx, mut signal_rx, signaling) = create_test_room(500);
    let alice = ConnectionId::new();

    for _ in 0..2 {
        room_tx
            .send(RoomCommand::Join {
                conn_id: alice,
                user_name: "Alice".into(),
            })
            .await
            .unwrap();
    }
    drain(&mut signal_rx).await;

    assert_eq!(
        signaling.names_for(alice).await,
        vec![
            "chat-history",
            "room-members",
            "user-joined",
            "chat-history",
            "room-members",
        ]
    );
}

#[tokio::test]
async fn test_blank_name_is_not_admitted() {
    init_tracing();
    let (room_tx, mut signal_rx, signaling) = create_test_room(500);
    let ghost = ConnectionId::new();

    room_tx
        .send(RoomCommand::Join {
            conn_id: ghost,
            user_name: "  ".into(),
        })
        .await
        .unwrap();

    assert!(drain(&mut signal_rx).await.is_empty());
    assert_eq!(signaling.total().await, 0);
}
