use duet_client::CaptureError;
use duet_client::negotiation::{CallProgress, NegotiationState};
use duet_core::{SdpKind, SessionDescription, SignalEvent};

use crate::integration::init_tracing;
use crate::utils::{LinkCall, MockCapture, MockChannel, SessionRig, candidate};

#[tokio::test]
async fn test_remote_offer_is_answered() {
    init_tracing();
    let mut rig = SessionRig::new();

    let outcome = rig.remote_offer(SessionDescription::offer("remote")).await;

    assert_eq!(outcome, CallProgress::Answered);
    assert_eq!(rig.session.state(), NegotiationState::Connected);
    assert_eq!(rig.capture.acquired(), 1, "Answerer captures symmetrically");
    assert_eq!(
        rig.links.calls().await,
        vec![
            LinkCall::AttachMedia(2),
            LinkCall::SetRemote(SdpKind::Offer),
            LinkCall::CreateAnswer,
        ]
    );

    let answers = rig.channel.emitted_named("answer").await;
    assert!(matches!(
        answers.as_slice(),
        [SignalEvent::Answer(p)] if p.answer.kind == SdpKind::Answer
    ));
}

#[tokio::test]
async fn test_answer_goes_out_receive_only_when_capture_fails() {
    init_tracing();
    let mut rig = SessionRig::with(MockChannel::new(), MockCapture::denying());

    let outcome = rig.remote_offer(SessionDescription::offer("remote")).await;

    assert!(matches!(
        outcome,
        CallProgress::AnsweredWithoutMedia(CaptureError::PermissionDenied(_))
    ));
    assert_eq!(rig.session.state(), NegotiationState::Connected);
    assert!(!rig.session.has_local_media());
    assert!(
        !rig.links
            .calls()
            .await
            .iter()
            .any(|c| matches!(c, LinkCall::AttachMedia(_)))
    );
    assert_eq!(rig.channel.count("answer").await, 1);
}

#[tokio::test]
async fn test_glare_first_offer_wins() {
    init_tracing();
    let mut rig = SessionRig::new();
    rig.start_call().await.unwrap();

    let outcome = rig.remote_offer(SessionDescription::offer("theirs")).await;

    assert_eq!(outcome, CallProgress::Ignored);
    assert_eq!(rig.session.state(), NegotiationState::OfferSent);
    assert_eq!(rig.channel.count("answer").await, 0);
}

#[tokio::test]
async fn test_renegotiation_reuses_the_connection() {
    init_tracing();
    let mut rig = SessionRig::new();

    rig.remote_offer(SessionDescription::offer("first")).await;
    let outcome = rig.remote_offer(SessionDescription::offer("second")).await;

    assert_eq!(outcome, CallProgress::Answered);
    assert_eq!(rig.session.state(), NegotiationState::Connected);
    assert_eq!(rig.links.opened(), 1);
    assert_eq!(rig.capture.acquired(), 1);
    assert_eq!(rig.channel.count("answer").await, 2);
}

#[tokio::test]
async fn test_candidates_queued_before_offer_are_flushed_before_answer() {
    init_tracing();
    let mut rig = SessionRig::new();

    for n in 0..2 {
        rig.session.on_remote_candidate(candidate(n)).await;
    }
    assert_eq!(rig.session.pending_candidates(), 2);

    rig.remote_offer(SessionDescription::offer("remote")).await;

    assert_eq!(rig.session.pending_candidates(), 0);
    assert_eq!(
        rig.links.calls().await,
        vec![
            LinkCall::AttachMedia(2),
            LinkCall::SetRemote(SdpKind::Offer),
            LinkCall::AddCandidate(candidate(0).candidate),
            LinkCall::AddCandidate(candidate(1).candidate),
            LinkCall::CreateAnswer,
        ]
    );
}

#[tokio::test]
async fn test_offer_received_while_capturing_to_call_is_answered() {
    init_tracing();
    let mut rig = SessionRig::new();

    let CallProgress::NeedsMedia(request) = rig.session.begin_call() else {
        panic!("an idle session asks for media first");
    };
    let outcome = rig
        .session
        .on_remote_offer(SessionDescription::offer("theirs"))
        .await;
    assert_eq!(outcome, CallProgress::Ignored);
    assert_eq!(rig.session.state(), NegotiationState::AwaitingMedia);

    let progress = rig.capture_and_resume(request).await;

    assert_eq!(progress, CallProgress::Answered);
    assert_eq!(rig.session.state(), NegotiationState::Connected);
    assert_eq!(rig.channel.count("offer").await, 0);
    assert_eq!(rig.channel.count("answer").await, 1);
}
