use duet_client::projector::LineOrigin;
use duet_client::room::JoinOutcome;
use duet_client::{ClientError, Rejected};
use duet_core::{OfferPayload, RoomId, SessionDescription, SignalEvent};

use crate::integration::init_tracing;
use crate::utils::{ClientRig, TEST_ROOM, chat, room_id};

#[tokio::test]
async fn test_two_users_see_each_other_and_the_join_notice() {
    init_tracing();
    let mut alice = ClientRig::spawn();
    let mut bob = ClientRig::spawn();

    alice.join_as("Alice", &[]).await;
    bob.join_as("Bob", &["Alice"]).await;

    // Server broadcasts Bob's arrival to Alice as well.
    alice.channel.inject(SignalEvent::UserJoined("Bob".into()));
    let alice_view = alice.wait_for(|v| v.participants.len() == 2).await;

    let names = |v: &duet_client::ViewState| -> Vec<String> {
        v.participants.iter().map(|p| p.name.clone()).collect()
    };
    assert_eq!(names(&alice_view), vec!["Alice", "Bob"]);

    let bob_view = bob.handle.view();
    let mut bob_names = names(&bob_view);
    bob_names.sort();
    assert_eq!(bob_names, vec!["Alice", "Bob"]);

    for view in [&alice_view, &bob_view] {
        assert_eq!(view.room_id.as_ref().map(RoomId::as_str), Some(TEST_ROOM));
        assert!(view.lines.iter().any(|l| l.origin == LineOrigin::System
            && l.author == "System"
            && l.body == "Bob joined the room"));
    }
}

#[tokio::test]
async fn test_chat_reaches_the_other_side_once() {
    init_tracing();
    let mut alice = ClientRig::spawn();
    let mut bob = ClientRig::spawn();
    alice.join_as("Alice", &[]).await;
    bob.join_as("Bob", &["Alice"]).await;

    let sent = alice.handle.send_message("hi").await.unwrap();
    assert_eq!(sent, chat("Alice", "hi"));

    let alice_view = alice.handle.view();
    let own = alice_view.lines.last().unwrap();
    assert_eq!(own.origin, LineOrigin::Own);
    assert_eq!((own.author.as_str(), own.body.as_str()), ("Alice", "hi"));

    // Relay the emitted message to Bob the way the server does.
    let emitted = alice.wait_for_emit("send-message", 1).await;
    let SignalEvent::SendMessage(outgoing) = emitted[0].clone() else {
        panic!("expected send-message");
    };
    bob.channel
        .inject(SignalEvent::ReceiveMessage(outgoing.into_message()));

    let bob_view = bob
        .wait_for(|v| v.lines.iter().any(|l| l.body == "hi"))
        .await;
    let received: Vec<_> = bob_view.lines.iter().filter(|l| l.body == "hi").collect();
    assert_eq!(received.len(), 1, "Bob never sees a duplicate");
    assert_eq!(received[0].origin, LineOrigin::Remote);
    assert_eq!(received[0].author, "Alice");
}

#[tokio::test]
async fn test_rejected_inputs_generate_no_traffic() {
    init_tracing();
    let mut rig = ClientRig::spawn();

    assert_eq!(
        rig.handle.send_message("hi").await,
        Err(ClientError::Rejected(Rejected::NoActiveRoom))
    );
    assert_eq!(
        rig.handle.join_room(room_id(), " ").await,
        Err(ClientError::Rejected(Rejected::EmptyName))
    );
    assert_eq!(
        rig.handle.start_call().await,
        Err(ClientError::Rejected(Rejected::NoActiveRoom))
    );
    assert!(rig.channel.emitted().await.is_empty());

    rig.join_as("Alice", &[]).await;
    rig.channel.clear().await;
    assert_eq!(
        rig.handle.send_message("   ").await,
        Err(ClientError::Rejected(Rejected::EmptyMessage))
    );
    assert_eq!(
        rig.handle.join_room(room_id(), "Alice").await,
        Ok(JoinOutcome::AlreadyJoined)
    );
    assert!(rig.channel.emitted().await.is_empty());
}

#[tokio::test]
async fn test_events_for_other_rooms_are_ignored() {
    init_tracing();
    let mut rig = ClientRig::spawn();
    rig.join_as("Alice", &["Bob"]).await;

    rig.channel.inject(SignalEvent::Offer(OfferPayload {
        room_id: RoomId::parse("other1").unwrap(),
        offer: SessionDescription::offer("stray"),
    }));
    rig.channel.inject(SignalEvent::UserJoined("Carol".into()));
    rig.wait_for(|v| v.participants.len() == 3).await;

    assert_eq!(rig.channel.count("answer").await, 0);
    assert_eq!(rig.links.opened(), 0);
}

#[tokio::test]
async fn test_leave_and_shutdown() {
    init_tracing();
    let mut rig = ClientRig::spawn();
    rig.join_as("Alice", &[]).await;

    assert_eq!(rig.handle.leave_room().await, Ok(true));
    assert_eq!(rig.handle.leave_room().await, Ok(false));
    assert!(!rig.handle.view().in_room());
    assert_eq!(rig.channel.count("leave-room").await, 1);

    rig.handle.shutdown().await.unwrap();
    assert_eq!(
        rig.handle.send_message("hi").await,
        Err(ClientError::CoordinatorGone)
    );
}
