use crate::channel::SignalingChannel;
use crate::error::{CaptureError, NegotiationError};
use crate::negotiation::{
    LinkState, LocalMedia, MediaCapture, MediaRequest, NegotiationState, PeerEventSink, PeerLink,
    PeerLinkFactory, TaggedPeerEvent, TrackKind,
};
use duet_core::{
    AnswerPayload, CandidatePayload, IceCandidate, OfferPayload, RoomId, SdpKind,
    SessionDescription, SignalEvent,
};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Collaborators a session drives. Cheap to clone.
#[derive(Clone)]
pub struct CallCollaborators {
    pub channel: Arc<dyn SignalingChannel>,
    pub capture: Arc<dyn MediaCapture>,
    pub links: Arc<dyn PeerLinkFactory>,
}

/// Where a call stands after the session handled one input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallProgress {
    /// Parked in `AwaitingMedia`. The owner runs the capture and reports
    /// back through `on_media`.
    NeedsMedia(MediaRequest),
    Offered,
    Answered,
    /// Capture failed; the answer went out receive-only.
    AnsweredWithoutMedia(CaptureError),
    /// Capture failed while calling out; the session is now closed.
    CaptureFailed(CaptureError),
    Ignored,
    /// Negotiation broke; the session is now closed.
    Failed,
}

/// What the session does once local media arrives.
#[derive(Debug, Clone, PartialEq, Eq)]
enum MediaIntent {
    Offer,
    Answer(SessionDescription),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateDisposition {
    Applied,
    /// Held until the next remote description is applied.
    Queued,
    Dropped,
}

/// One call attempt between us and the other peer in the room.
///
/// Owns the local media and the peer-connection handle exclusively. The
/// handle is opened at most once; after `Closed` a new session is needed.
pub struct NegotiationSession {
    id: u64,
    room_id: RoomId,
    state: NegotiationState,
    local_media: Option<LocalMedia>,
    intent: Option<MediaIntent>,
    link: Option<Box<dyn PeerLink>>,
    link_opened: bool,
    media_attached: bool,
    remote_description_applied: bool,
    pending_remote_candidates: VecDeque<IceCandidate>,
    mic_enabled: bool,
    cam_enabled: bool,
    remote_media: bool,
    collaborators: CallCollaborators,
    events: PeerEventSink,
}

impl NegotiationSession {
    pub fn new(
        id: u64,
        room_id: RoomId,
        collaborators: CallCollaborators,
        events: mpsc::UnboundedSender<TaggedPeerEvent>,
    ) -> Self {
        Self {
            id,
            room_id,
            state: NegotiationState::Idle,
            local_media: None,
            intent: None,
            link: None,
            link_opened: false,
            media_attached: false,
            remote_description_applied: false,
            pending_remote_candidates: VecDeque::new(),
            mic_enabled: true,
            cam_enabled: true,
            remote_media: false,
            collaborators,
            events: PeerEventSink::new(id, events),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn room_id(&self) -> &RoomId {
        &self.room_id
    }

    pub fn state(&self) -> NegotiationState {
        self.state
    }

    pub fn has_link(&self) -> bool {
        self.link.is_some()
    }

    pub fn has_local_media(&self) -> bool {
        self.local_media.is_some()
    }

    pub fn pending_candidates(&self) -> usize {
        self.pending_remote_candidates.len()
    }

    pub fn mic_enabled(&self) -> bool {
        self.mic_enabled
    }

    pub fn cam_enabled(&self) -> bool {
        self.cam_enabled
    }

    pub fn remote_media(&self) -> bool {
        self.remote_media
    }

    /// Ask for local media so an offer can follow.
    ///
    /// Calls in any state but `Idle`, or with the channel down, are ignored.
    /// The offer goes out from `on_media`.
    pub fn begin_call(&mut self) -> CallProgress {
        if self.state != NegotiationState::Idle {
            debug!("startCall ignored in state {}", self.state);
            return CallProgress::Ignored;
        }
        if !self.collaborators.channel.is_connected() {
            debug!("startCall ignored: signaling channel unavailable");
            return CallProgress::Ignored;
        }

        self.intent = Some(MediaIntent::Offer);
        self.transition(NegotiationState::AwaitingMedia);
        CallProgress::NeedsMedia(MediaRequest::audio_video())
    }

    /// Resume after capture settled. Media that shows up after a hang-up is
    /// stopped and dropped.
    pub async fn on_media(&mut self, result: Result<LocalMedia, CaptureError>) -> CallProgress {
        let intent = match self.intent.take() {
            Some(intent) if self.state == NegotiationState::AwaitingMedia => intent,
            _ => {
                debug!("Late capture result for session {} discarded", self.id);
                if let Ok(mut media) = result {
                    media.stop();
                }
                return CallProgress::Ignored;
            }
        };

        match intent {
            MediaIntent::Offer => {
                let media = match result {
                    Ok(media) => media,
                    Err(e) => {
                        warn!("Media capture failed for session {}: {}", self.id, e);
                        self.hang_up().await;
                        return CallProgress::CaptureFailed(e);
                    }
                };
                self.adopt_media(media);
                match self.send_offer().await {
                    Ok(()) => CallProgress::Offered,
                    Err(e) => {
                        self.fail(e).await;
                        CallProgress::Failed
                    }
                }
            }
            MediaIntent::Answer(offer) => {
                let capture_failure = match result {
                    Ok(media) => {
                        self.adopt_media(media);
                        None
                    }
                    Err(e) => {
                        warn!("Answering receive-only, capture failed: {}", e);
                        Some(e)
                    }
                };
                if let Err(e) = self.send_answer(offer).await {
                    self.fail(e).await;
                    return CallProgress::Failed;
                }
                match capture_failure {
                    Some(e) => CallProgress::AnsweredWithoutMedia(e),
                    None => CallProgress::Answered,
                }
            }
        }
    }

    async fn send_offer(&mut self) -> Result<(), NegotiationError> {
        self.ensure_link().await?;
        self.attach_local_media().await?;

        let offer = self.link()?.create_offer().await?;
        self.collaborators
            .channel
            .emit(SignalEvent::Offer(OfferPayload {
                room_id: self.room_id.clone(),
                offer,
            }))
            .await?;

        info!("Offer sent for session {}", self.id);
        self.transition(NegotiationState::OfferSent);
        Ok(())
    }

    /// Answer a remote offer. From `Idle` we capture first so the call is
    /// symmetric; `Connected` treats it as a renegotiation. In `OfferSent`
    /// the first offer wins and this one is dropped. An offer that lands
    /// while our own capture is pending arrived first, so we answer it
    /// instead of offering.
    pub async fn on_remote_offer(&mut self, offer: SessionDescription) -> CallProgress {
        if offer.kind != SdpKind::Offer {
            debug!("Ignoring non-offer description delivered as offer");
            return CallProgress::Ignored;
        }
        match self.state {
            NegotiationState::Idle => {
                self.intent = Some(MediaIntent::Answer(offer));
                self.transition(NegotiationState::AwaitingMedia);
                return CallProgress::NeedsMedia(MediaRequest::audio_video());
            }
            NegotiationState::AwaitingMedia => {
                if self.intent == Some(MediaIntent::Offer) {
                    debug!("Remote offer beat ours for session {}, answering", self.id);
                    self.intent = Some(MediaIntent::Answer(offer));
                } else {
                    debug!("Remote offer ignored: already answering");
                }
                return CallProgress::Ignored;
            }
            NegotiationState::AnswerPending | NegotiationState::Connected => {}
            NegotiationState::OfferSent => {
                debug!("Remote offer ignored: local offer already sent");
                return CallProgress::Ignored;
            }
            NegotiationState::Closed => {
                debug!("Remote offer ignored in state {}", self.state);
                return CallProgress::Ignored;
            }
        }

        match self.send_answer(offer).await {
            Ok(()) => CallProgress::Answered,
            Err(e) => {
                self.fail(e).await;
                CallProgress::Failed
            }
        }
    }

    async fn send_answer(&mut self, offer: SessionDescription) -> Result<(), NegotiationError> {
        self.ensure_link().await?;
        self.attach_local_media().await?;
        self.transition(NegotiationState::AnswerPending);

        self.link()?.set_remote_description(offer).await?;
        self.remote_description_applied = true;
        self.flush_pending_candidates().await;

        let answer = self.link()?.create_answer().await?;
        self.collaborators
            .channel
            .emit(SignalEvent::Answer(AnswerPayload {
                room_id: self.room_id.clone(),
                answer,
            }))
            .await?;

        info!("Answer sent for session {}", self.id);
        self.transition(NegotiationState::Connected);
        Ok(())
    }

    /// Only meaningful in `OfferSent`; duplicates and late answers are no-ops.
    pub async fn on_remote_answer(&mut self, answer: SessionDescription) -> bool {
        if self.state != NegotiationState::OfferSent
            || self.link.is_none()
            || answer.kind != SdpKind::Answer
        {
            debug!("Remote answer ignored in state {}", self.state);
            return false;
        }

        if let Err(e) = self.apply_remote_answer(answer).await {
            self.fail(e).await;
            return false;
        }
        true
    }

    async fn apply_remote_answer(
        &mut self,
        answer: SessionDescription,
    ) -> Result<(), NegotiationError> {
        self.link()?.set_remote_description(answer).await?;
        self.remote_description_applied = true;
        self.transition(NegotiationState::Connected);
        self.flush_pending_candidates().await;
        Ok(())
    }

    /// Apply now if a remote description is in place, otherwise queue in
    /// arrival order.
    pub async fn on_remote_candidate(&mut self, candidate: IceCandidate) -> CandidateDisposition {
        if self.state == NegotiationState::Closed {
            debug!("Remote candidate dropped: session {} closed", self.id);
            return CandidateDisposition::Dropped;
        }
        if self.link.is_some() && self.remote_description_applied {
            self.apply_candidate(candidate).await;
            return CandidateDisposition::Applied;
        }
        self.pending_remote_candidates.push_back(candidate);
        CandidateDisposition::Queued
    }

    /// Forward a locally discovered candidate to the other peer.
    pub async fn on_local_candidate(&self, candidate: IceCandidate) -> bool {
        if self.state == NegotiationState::Closed {
            return false;
        }
        let event = SignalEvent::Candidate(CandidatePayload {
            room_id: self.room_id.clone(),
            candidate,
        });
        match self.collaborators.channel.emit(event).await {
            Ok(()) => true,
            Err(e) => {
                debug!("Local candidate not forwarded: {}", e);
                false
            }
        }
    }

    pub async fn on_link_state(&mut self, link_state: LinkState) {
        match link_state {
            LinkState::Failed | LinkState::Closed if self.state != NegotiationState::Closed => {
                self.fail(NegotiationError::LinkLost(link_state)).await;
            }
            LinkState::Connected => info!("Media path up for session {}", self.id),
            LinkState::Disconnected => warn!("Media path interrupted for session {}", self.id),
            _ => {}
        }
    }

    pub fn on_remote_track(&mut self, kind: TrackKind) {
        debug!("Remote {:?} media for session {}", kind, self.id);
        self.remote_media = true;
    }

    /// Local only, no renegotiation. Returns the new flag.
    pub fn toggle_mic(&mut self) -> bool {
        self.mic_enabled = !self.mic_enabled;
        if let Some(media) = &self.local_media {
            media.set_enabled(TrackKind::Audio, self.mic_enabled);
        }
        self.mic_enabled
    }

    pub fn toggle_cam(&mut self) -> bool {
        self.cam_enabled = !self.cam_enabled;
        if let Some(media) = &self.local_media {
            media.set_enabled(TrackKind::Video, self.cam_enabled);
        }
        self.cam_enabled
    }

    /// Release the handle and media exactly once. Returns `false` when the
    /// session was already closed.
    pub async fn hang_up(&mut self) -> bool {
        if self.state == NegotiationState::Closed {
            return false;
        }

        if let Some(link) = self.link.take() {
            if let Err(e) = link.close().await {
                warn!("Failed to close peer connection for session {}: {}", self.id, e);
            }
        }
        if let Some(mut media) = self.local_media.take() {
            media.stop();
        }
        self.intent = None;
        self.pending_remote_candidates.clear();

        info!("Session {} closed", self.id);
        self.transition(NegotiationState::Closed);
        true
    }

    async fn fail(&mut self, err: NegotiationError) {
        error!("Negotiation failed for session {}: {}", self.id, err);
        self.hang_up().await;
    }

    fn adopt_media(&mut self, media: LocalMedia) {
        media.set_enabled(TrackKind::Audio, self.mic_enabled);
        media.set_enabled(TrackKind::Video, self.cam_enabled);
        self.local_media = Some(media);
    }

    fn link(&self) -> Result<&dyn PeerLink, NegotiationError> {
        self.link.as_deref().ok_or(NegotiationError::NoLink)
    }

    async fn ensure_link(&mut self) -> Result<(), NegotiationError> {
        if self.link.is_some() {
            return Ok(());
        }
        if self.link_opened {
            return Err(NegotiationError::LinkSpent);
        }
        self.link_opened = true;
        let link = self.collaborators.links.open(self.events.clone()).await?;
        info!("Peer connection opened for session {}", self.id);
        self.link = Some(link);
        Ok(())
    }

    async fn attach_local_media(&mut self) -> Result<(), NegotiationError> {
        if self.media_attached {
            return Ok(());
        }
        let (Some(link), Some(media)) = (self.link.as_deref(), self.local_media.as_ref()) else {
            return Ok(());
        };
        link.attach_media(media).await?;
        self.media_attached = true;
        Ok(())
    }

    async fn apply_candidate(&self, candidate: IceCandidate) {
        let Some(link) = self.link.as_deref() else {
            return;
        };
        if let Err(e) = link.add_ice_candidate(candidate).await {
            warn!("Failed to add ICE candidate for session {}: {}", self.id, e);
        }
    }

    async fn flush_pending_candidates(&mut self) {
        if !self.pending_remote_candidates.is_empty() {
            debug!(
                "Applying {} queued candidates for session {}",
                self.pending_remote_candidates.len(),
                self.id
            );
        }
        while let Some(candidate) = self.pending_remote_candidates.pop_front() {
            self.apply_candidate(candidate).await;
        }
    }

    fn transition(&mut self, next: NegotiationState) {
        debug!("Session {}: {} -> {}", self.id, self.state, next);
        self.state = next;
    }
}

impl Drop for NegotiationSession {
    fn drop(&mut self) {
        if let Some(mut media) = self.local_media.take() {
            media.stop();
        }
    }
}
