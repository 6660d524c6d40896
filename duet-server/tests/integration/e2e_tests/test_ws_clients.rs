use duet_client::negotiation::NegotiationState;
use duet_client::{ClientBuilder, ClientConfig, FixedClock, RoomHandle, ViewState};
use duet_core::RoomId;
use duet_server::{ServerConfig, serve_on};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

use crate::integration::{TEST_ROOM, init_tracing};

/// Timeout for a view change to propagate across the relay (ms).
const VIEW_TIMEOUT_MS: u64 = 5000;

async fn start_server() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(serve_on(listener, ServerConfig::default()));
    format!("ws://{}/ws", addr)
}

async fn connect(url: &str) -> RoomHandle {
    let config = ClientConfig::default()
        .with_server_url(url)
        .with_ice_servers(Vec::new());
    ClientBuilder::new(config)
        .with_clock(Arc::new(FixedClock("10:00".into())))
        .connect()
        .await
        .expect("Failed to connect client")
}

async fn wait_view(handle: &RoomHandle, predicate: impl FnMut(&ViewState) -> bool) -> ViewState {
    let mut rx = handle.subscribe();
    let view = tokio::time::timeout(Duration::from_millis(VIEW_TIMEOUT_MS), rx.wait_for(predicate))
        .await
        .expect("Timed out waiting for view")
        .expect("Coordinator gone");
    view.clone()
}

async fn joined_pair(url: &str) -> (RoomHandle, RoomHandle) {
    let room_id = RoomId::parse(TEST_ROOM).unwrap();
    let alice = connect(url).await;
    let bob = connect(url).await;

    alice.join_room(room_id.clone(), "Alice").await.unwrap();
    wait_view(&alice, |v| !v.lines.is_empty()).await;
    bob.join_room(room_id, "Bob").await.unwrap();

    wait_view(&alice, |v| v.participants.len() == 2).await;
    wait_view(&bob, |v| v.participants.len() == 2).await;
    (alice, bob)
}

#[tokio::test(flavor = "multi_thread")]
async fn test_two_clients_meet_and_chat() {
    init_tracing();
    let url = start_server().await;
    let (alice, bob) = joined_pair(&url).await;

    for handle in [&alice, &bob] {
        let view = wait_view(handle, |v| {
            v.lines.iter().any(|l| l.body == "Bob joined the room")
        })
        .await;
        let mut names: Vec<_> = view.participants.iter().map(|p| p.name.clone()).collect();
        names.sort();
        assert_eq!(names, vec!["Alice", "Bob"]);
    }

    alice.send_message("hi").await.unwrap();
    let view = wait_view(&bob, |v| v.lines.iter().any(|l| l.body == "hi")).await;
    assert_eq!(view.lines.iter().filter(|l| l.body == "hi").count(), 1);
    assert_eq!(
        alice.view().lines.iter().filter(|l| l.body == "hi").count(),
        1,
        "Sender keeps only its optimistic copy"
    );

    alice.shutdown().await.unwrap();
    bob.shutdown().await.unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn test_call_negotiates_through_relay() {
    init_tracing();
    let url = start_server().await;
    let (alice, bob) = joined_pair(&url).await;

    alice.start_call().await.unwrap();

    wait_view(&bob, |v| v.call.state == NegotiationState::Connected).await;
    wait_view(&alice, |v| v.call.state == NegotiationState::Connected).await;

    assert_eq!(alice.hang_up().await, Ok(true));
    alice.shutdown().await.unwrap();
    bob.shutdown().await.unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn test_departure_is_seen_by_the_other_side() {
    init_tracing();
    let url = start_server().await;
    let (alice, bob) = joined_pair(&url).await;

    bob.shutdown().await.unwrap();

    let view = wait_view(&alice, |v| v.participants.len() == 1).await;
    assert!(view.lines.iter().any(|l| l.body == "Bob left the room"));
    alice.shutdown().await.unwrap();
}
