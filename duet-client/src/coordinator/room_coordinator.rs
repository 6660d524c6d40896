use crate::channel::ChannelEvent;
use crate::chat::ChatPipeline;
use crate::clock::Clock;
use crate::coordinator::RoomCommand;
use crate::error::{CallError, CaptureError, ClientError, Rejected};
use crate::negotiation::{
    CallCollaborators, CallProgress, LocalMedia, MediaRequest, NegotiationSession,
    NegotiationState, PeerEvent, TaggedPeerEvent,
};
use crate::projector::{ViewState, project};
use crate::room::{JoinOutcome, MembershipTracker};
use duet_core::{RoomId, SignalEvent};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, info, warn};

/// Outcome of a capture running off the actor loop.
struct MediaReady {
    session_id: u64,
    result: Result<LocalMedia, CaptureError>,
}

/// A `start_call` reply held back until the session's capture settles.
struct PendingStart {
    session_id: u64,
    reply: oneshot::Sender<Result<(), ClientError>>,
}

/// Actor owning the active room, its chat and the current call.
///
/// Commands, channel events and peer events are handled one at a time to
/// completion; events that arrive meanwhile wait in their queues. Media
/// capture runs in its own task and re-enters as a `MediaReady` event, so a
/// pending permission prompt never stalls the room.
pub struct RoomCoordinator {
    membership: MembershipTracker,
    chat: ChatPipeline,
    collaborators: CallCollaborators,
    session: Option<NegotiationSession>,
    next_session_id: u64,
    alert: Option<String>,
    pending_start: Option<PendingStart>,
    command_rx: mpsc::Receiver<RoomCommand>,
    channel_rx: mpsc::UnboundedReceiver<ChannelEvent>,
    peer_tx: mpsc::UnboundedSender<TaggedPeerEvent>,
    peer_rx: mpsc::UnboundedReceiver<TaggedPeerEvent>,
    media_tx: mpsc::UnboundedSender<MediaReady>,
    media_rx: mpsc::UnboundedReceiver<MediaReady>,
    view_tx: watch::Sender<ViewState>,
}

impl RoomCoordinator {
    pub fn new(
        collaborators: CallCollaborators,
        clock: Arc<dyn Clock>,
        command_rx: mpsc::Receiver<RoomCommand>,
        view_tx: watch::Sender<ViewState>,
    ) -> Self {
        let channel_rx = collaborators.channel.subscribe();
        let (peer_tx, peer_rx) = mpsc::unbounded_channel();
        let (media_tx, media_rx) = mpsc::unbounded_channel();

        Self {
            membership: MembershipTracker::new(collaborators.channel.clone(), clock.clone()),
            chat: ChatPipeline::new(collaborators.channel.clone(), clock),
            collaborators,
            session: None,
            next_session_id: 0,
            alert: None,
            pending_start: None,
            command_rx,
            channel_rx,
            peer_tx,
            peer_rx,
            media_tx,
            media_rx,
            view_tx,
        }
    }

    pub async fn run(mut self) {
        info!("Room coordinator started");
        self.publish();

        loop {
            tokio::select! {
                cmd = self.command_rx.recv() => {
                    match cmd {
                        Some(c) => {
                            if !self.handle_command(c).await {
                                break;
                            }
                        }
                        None => {
                            info!("All room handles dropped. Shutting down coordinator.");
                            self.shutdown().await;
                            break;
                        }
                    }
                }

                evt = self.channel_rx.recv() => {
                    match evt {
                        Some(e) => self.handle_channel_event(e).await,
                        None => {
                            warn!("Signaling channel closed unexpectedly");
                            self.shutdown().await;
                            break;
                        }
                    }
                }

                Some(evt) = self.peer_rx.recv() => self.handle_peer_event(evt).await,

                Some(ready) = self.media_rx.recv() => self.handle_media(ready).await,
            }

            self.settle_pending_start();
            self.publish();
        }

        self.publish();
        info!("Room coordinator finished");
    }

    /// Returns `false` once the coordinator should stop.
    async fn handle_command(&mut self, cmd: RoomCommand) -> bool {
        match cmd {
            RoomCommand::JoinRoom {
                room_id,
                user_name,
                reply,
            } => {
                let leaving = self
                    .membership
                    .room_id()
                    .is_some_and(|current| *current != room_id);
                if leaving {
                    self.end_call().await;
                }
                let result = self.membership.join(room_id, &user_name).await;
                if matches!(result, Ok(JoinOutcome::Joined)) {
                    self.alert = None;
                }
                self.respond(reply, result);
            }

            RoomCommand::LeaveRoom { reply } => {
                self.end_call().await;
                let left = self.membership.leave().await.is_some();
                self.respond(reply, left);
            }

            RoomCommand::SendMessage { body, reply } => {
                let result = self.chat.send(self.membership.room_mut(), &body).await;
                if let Err(e) = &result {
                    debug!("Chat message rejected: {}", e);
                }
                self.respond(reply, result);
            }

            RoomCommand::StartCall { reply } => self.start_call(reply),

            RoomCommand::HangUp { reply } => {
                let closed = match self.session.as_mut() {
                    Some(session) => session.hang_up().await,
                    None => false,
                };
                self.respond(reply, closed);
            }

            RoomCommand::ToggleMic { reply } => {
                let enabled = self.open_session().map(NegotiationSession::toggle_mic);
                self.respond(reply, enabled);
            }

            RoomCommand::ToggleCam { reply } => {
                let enabled = self.open_session().map(NegotiationSession::toggle_cam);
                self.respond(reply, enabled);
            }

            RoomCommand::Shutdown { reply } => {
                self.shutdown().await;
                self.respond(reply, ());
                return false;
            }
        }
        true
    }

    /// Parks the reply until capture settles; the offer goes out from
    /// `handle_media`.
    fn start_call(&mut self, reply: oneshot::Sender<Result<(), ClientError>>) {
        let Some(room_id) = self.membership.room_id().cloned() else {
            self.respond(reply, Err(Rejected::NoActiveRoom.into()));
            return;
        };
        self.ensure_session(&room_id);
        let Some(session) = self.session.as_mut() else {
            self.respond(reply, Ok(()));
            return;
        };

        let session_id = session.id();
        let CallProgress::NeedsMedia(request) = session.begin_call() else {
            self.respond(reply, Ok(()));
            return;
        };

        self.alert = None;
        self.settle_pending_start();
        self.pending_start = Some(PendingStart { session_id, reply });
        self.spawn_capture(session_id, request);
    }

    fn spawn_capture(&self, session_id: u64, request: MediaRequest) {
        debug!("Capturing media for session {}", session_id);
        let capture = self.collaborators.capture.clone();
        let media_tx = self.media_tx.clone();
        tokio::spawn(async move {
            let result = capture.acquire(request).await;
            let ready = MediaReady { session_id, result };
            if let Err(mpsc::error::SendError(ready)) = media_tx.send(ready) {
                if let Ok(mut media) = ready.result {
                    media.stop();
                }
            }
        });
    }

    async fn handle_media(&mut self, ready: MediaReady) {
        let Some(session) = self
            .session
            .as_mut()
            .filter(|s| s.id() == ready.session_id)
        else {
            debug!("Discarding media for stale session {}", ready.session_id);
            if let Ok(mut media) = ready.result {
                media.stop();
            }
            return;
        };

        match session.on_media(ready.result).await {
            CallProgress::CaptureFailed(e) => {
                self.alert = Some(e.to_string());
                if let Some(pending) = self.take_pending_start(ready.session_id) {
                    self.respond(pending.reply, Err(CallError::from(e).into()));
                }
            }
            CallProgress::AnsweredWithoutMedia(e) => {
                self.alert = Some(format!("Answered without local media: {}", e));
            }
            _ => {}
        }
    }

    fn take_pending_start(&mut self, session_id: u64) -> Option<PendingStart> {
        if self
            .pending_start
            .as_ref()
            .is_some_and(|p| p.session_id == session_id)
        {
            return self.pending_start.take();
        }
        None
    }

    /// Release a held `start_call` reply once its session has moved past
    /// capture: offered, answered instead, hung up or replaced.
    fn settle_pending_start(&mut self) {
        let Some(session_id) = self.pending_start.as_ref().map(|p| p.session_id) else {
            return;
        };
        let still_capturing = self
            .session
            .as_ref()
            .is_some_and(|s| s.id() == session_id && s.state() == NegotiationState::AwaitingMedia);
        if still_capturing {
            return;
        }
        if let Some(pending) = self.pending_start.take() {
            self.respond(pending.reply, Ok(()));
        }
    }

    async fn handle_channel_event(&mut self, event: ChannelEvent) {
        match event {
            ChannelEvent::Signal(signal) => self.handle_signal(signal).await,
            ChannelEvent::Disconnected => {
                warn!("Signaling channel lost, waiting for reconnect");
            }
            ChannelEvent::Reconnected => {
                if let Err(e) = self.membership.rejoin().await {
                    warn!("Failed to rejoin after reconnect: {}", e);
                }
            }
        }
    }

    async fn handle_signal(&mut self, signal: SignalEvent) {
        if let Some(room_id) = signal.room_id() {
            if self.membership.room_id() != Some(room_id) {
                debug!("Ignoring {} for room {}", signal.name(), room_id);
                return;
            }
        }

        match signal {
            SignalEvent::ChatHistory(messages) => {
                self.membership.on_history_snapshot(messages);
            }

            SignalEvent::RoomMembers(names) => {
                self.membership.on_room_members(names);
            }

            SignalEvent::UserJoined(name) => {
                self.membership.on_participant_joined(&name);
            }

            SignalEvent::UserLeft(name) => {
                if !self.membership.on_participant_left(&name) {
                    return;
                }
                let alone = self
                    .membership
                    .room()
                    .is_some_and(|room| room.others().next().is_none());
                if alone && self.end_call().await {
                    info!("{} left, call ended", name);
                }
            }

            SignalEvent::ReceiveMessage(message) => {
                self.chat.on_incoming(self.membership.room_mut(), message);
            }

            SignalEvent::Offer(payload) => {
                self.ensure_session(&payload.room_id);
                let Some(session) = self.session.as_mut() else {
                    return;
                };
                let session_id = session.id();
                if let CallProgress::NeedsMedia(request) =
                    session.on_remote_offer(payload.offer).await
                {
                    self.spawn_capture(session_id, request);
                }
            }

            SignalEvent::Answer(payload) => match self.session.as_mut() {
                Some(session) => {
                    session.on_remote_answer(payload.answer).await;
                }
                None => debug!("Answer with no call in progress, ignoring"),
            },

            SignalEvent::Candidate(payload) => {
                self.ensure_session(&payload.room_id);
                if let Some(session) = self.session.as_mut() {
                    session.on_remote_candidate(payload.candidate).await;
                }
            }

            other => debug!("Ignoring {} from server", other.name()),
        }
    }

    async fn handle_peer_event(&mut self, tagged: TaggedPeerEvent) {
        let Some(session) = self
            .session
            .as_mut()
            .filter(|s| s.id() == tagged.session_id)
        else {
            debug!("Discarding event from stale session {}", tagged.session_id);
            return;
        };

        match tagged.event {
            PeerEvent::LocalCandidate(candidate) => {
                session.on_local_candidate(candidate).await;
            }
            PeerEvent::LinkState(state) => session.on_link_state(state).await,
            PeerEvent::RemoteTrack(kind) => session.on_remote_track(kind),
        }
    }

    /// Replace a missing or closed session with a fresh `Idle` one.
    fn ensure_session(&mut self, room_id: &RoomId) {
        let live = self
            .session
            .as_ref()
            .is_some_and(|s| s.state() != NegotiationState::Closed);
        if live {
            return;
        }

        self.next_session_id += 1;
        debug!("Opening negotiation session {}", self.next_session_id);
        self.session = Some(NegotiationSession::new(
            self.next_session_id,
            room_id.clone(),
            self.collaborators.clone(),
            self.peer_tx.clone(),
        ));
    }

    fn open_session(&mut self) -> Option<&mut NegotiationSession> {
        self.session
            .as_mut()
            .filter(|s| s.state() != NegotiationState::Closed)
    }

    /// Hang up and forget the session. Returns whether a call was closed.
    async fn end_call(&mut self) -> bool {
        let Some(mut session) = self.session.take() else {
            return false;
        };
        session.hang_up().await
    }

    async fn shutdown(&mut self) {
        self.end_call().await;
        self.settle_pending_start();
        self.membership.leave().await;
    }

    /// Publish first so a caller that awaited the reply sees the new view.
    fn respond<T>(&self, reply: oneshot::Sender<T>, value: T) {
        self.publish();
        let _ = reply.send(value);
    }

    fn publish(&self) {
        let view = project(
            self.membership.room(),
            self.session.as_ref(),
            self.collaborators.channel.is_connected(),
            self.alert.as_deref(),
        );
        self.view_tx.send_if_modified(|current| {
            if *current == view {
                return false;
            }
            *current = view;
            true
        });
    }
}
