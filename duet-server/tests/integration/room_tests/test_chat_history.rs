use duet_core::{ChatMessage, ConnectionId, SignalEvent};
use duet_server::RoomCommand;
use tokio::sync::mpsc;

use crate::integration::{create_test_room, init_tracing};
use crate::utils::{drain, wait_for_event};

fn line(author: &str, body: &str) -> ChatMessage {
    ChatMessage {
        author: author.into(),
        body: body.into(),
        sent_at: "10:00".into(),
    }
}

async fn join(room_tx: &mpsc::Sender<RoomCommand>, conn_id: ConnectionId, name: &str) {
    room_tx
        .send(RoomCommand::Join {
            conn_id,
            user_name: name.into(),
        })
        .await
        .unwrap();
}

#[tokio::test]
async fn test_chat_is_not_echoed_to_sender() {
    init_tracing();
    let (room_tx, mut signal_rx, signaling) = create_test_room(500);
    let alice = ConnectionId::new();
    let bob = ConnectionId::new();
    join(&room_tx, alice, "Alice").await;
    join(&room_tx, bob, "Bob").await;
    drain(&mut signal_rx).await;

    room_tx
        .send(RoomCommand::Chat {
            conn_id: alice,
            message: line("Alice", "hi"),
        })
        .await
        .unwrap();

    let delivered = wait_for_event(&mut signal_rx, bob, "receive-message")
        .await
        .unwrap();
    assert_eq!(delivered.event, SignalEvent::ReceiveMessage(line("Alice", "hi")));
    drain(&mut signal_rx).await;
    assert!(
        !signaling
            .names_for(alice)
            .await
            .contains(&"receive-message")
    );
}

#[tokio::test]
async fn test_late_joiner_gets_history_in_order() {
    init_tracing();
    let (room_tx, mut signal_rx, signaling) = create_test_room(500);
    let alice = ConnectionId::new();
    let carol = ConnectionId::new();
    join(&room_tx, alice, "Alice").await;

    for body in ["one", "two", "three"] {
        room_tx
            .send(RoomCommand::Chat {
                conn_id: alice,
                message: line("Alice", body),
            })
            .await
            .unwrap();
    }
    join(&room_tx, carol, "Carol").await;
    wait_for_event(&mut signal_rx, carol, "chat-history")
        .await
        .unwrap();

    assert_eq!(
        signaling.events_for(carol).await[0],
        SignalEvent::ChatHistory(vec![
            line("Alice", "one"),
            line("Alice", "two"),
            line("Alice", "three"),
        ])
    );
}

#[tokio::test]
async fn test_history_is_bounded() {
    init_tracing();
    let (room_tx, mut signal_rx, signaling) = create_test_room(2);
    let alice = ConnectionId::new();
    let carol = ConnectionId::new();
    join(&room_tx, alice, "Alice").await;

    for body in ["one", "two", "three"] {
        room_tx
            .send(RoomCommand::Chat {
                conn_id: alice,
                message: line("Alice", body),
            })
            .await
            .unwrap();
    }
    join(&room_tx, carol, "Carol").await;
    wait_for_event(&mut signal_rx, carol, "chat-history")
        .await
        .unwrap();

    assert_eq!(
        signaling.events_for(carol).await[0],
        SignalEvent::ChatHistory(vec![line("Alice", "two"), line("Alice", "three")])
    );
}

#[tokio::test]
async fn test_chat_from_non_member_is_dropped() {
    init_tracing();
    let (room_tx, mut signal_rx, signaling) = create_test_room(500);
    let alice = ConnectionId::new();
    join(&room_tx, alice, "Alice").await;
    drain(&mut signal_rx).await;

    room_tx
        .send(RoomCommand::Chat {
            conn_id: ConnectionId::new(),
            message: line("Mallory", "spam"),
        })
        .await
        .unwrap();

    assert!(drain(&mut signal_rx).await.is_empty());
    assert_eq!(signaling.events_for(alice).await.len(), 3);
}
