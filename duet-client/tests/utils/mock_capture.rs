use async_trait::async_trait;
use duet_client::CaptureError;
use duet_client::negotiation::{LocalMedia, MediaCapture, MediaRequest, MediaTrack, TrackKind};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::{Mutex, Notify};

use crate::utils::EFFECT_TIMEOUT_MS;

/// Track that counts how often it was stopped.
pub struct CountingTrack {
    id: String,
    kind: TrackKind,
    enabled: AtomicBool,
    stops: AtomicUsize,
}

impl CountingTrack {
    pub fn new(id: impl Into<String>, kind: TrackKind) -> Self {
        Self {
            id: id.into(),
            kind,
            enabled: AtomicBool::new(true),
            stops: AtomicUsize::new(0),
        }
    }

    pub fn stops(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }
}

impl MediaTrack for CountingTrack {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> TrackKind {
        self.kind
    }

    fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
    }

    fn stop(&self) {
        self.stops.fetch_add(1, Ordering::SeqCst);
    }
}

/// Capture backend that either hands out counting tracks or refuses. A
/// gated capture holds every request until `release`, like a permission
/// prompt the user has not answered yet.
#[derive(Default)]
pub struct MockCapture {
    deny: AtomicBool,
    gated: AtomicBool,
    gate: Notify,
    waiting: AtomicUsize,
    acquired: AtomicUsize,
    tracks: Mutex<Vec<Arc<CountingTrack>>>,
}

impl MockCapture {
    pub fn allowing() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn denying() -> Arc<Self> {
        let capture = Self::default();
        capture.deny.store(true, Ordering::SeqCst);
        Arc::new(capture)
    }

    pub fn gated() -> Arc<Self> {
        let capture = Self::default();
        capture.gated.store(true, Ordering::SeqCst);
        Arc::new(capture)
    }

    /// Let one held request through.
    pub fn release(&self) {
        self.gate.notify_one();
    }

    /// Wait until `count` requests are parked at the gate.
    pub async fn wait_for_waiting(&self, count: usize) {
        let deadline = tokio::time::Instant::now() + Duration::from_millis(EFFECT_TIMEOUT_MS);
        while self.waiting.load(Ordering::SeqCst) < count {
            if tokio::time::Instant::now() > deadline {
                panic!("timed out waiting for {count} pending captures");
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }

    pub fn set_deny(&self, deny: bool) {
        self.deny.store(deny, Ordering::SeqCst);
    }

    pub fn acquired(&self) -> usize {
        self.acquired.load(Ordering::SeqCst)
    }

    /// Every track handed out so far.
    pub async fn tracks(&self) -> Vec<Arc<CountingTrack>> {
        self.tracks.lock().await.clone()
    }
}

#[async_trait]
impl MediaCapture for MockCapture {
    async fn acquire(&self, request: MediaRequest) -> Result<LocalMedia, CaptureError> {
        if self.gated.load(Ordering::SeqCst) {
            self.waiting.fetch_add(1, Ordering::SeqCst);
            self.gate.notified().await;
            self.waiting.fetch_sub(1, Ordering::SeqCst);
        }
        if self.deny.load(Ordering::SeqCst) {
            return Err(CaptureError::PermissionDenied("denied by test".into()));
        }
        let n = self.acquired.fetch_add(1, Ordering::SeqCst);

        let mut created = Vec::new();
        if request.audio {
            created.push(Arc::new(CountingTrack::new(format!("audio-{n}"), TrackKind::Audio)));
        }
        if request.video {
            created.push(Arc::new(CountingTrack::new(format!("video-{n}"), TrackKind::Video)));
        }
        self.tracks.lock().await.extend(created.iter().cloned());

        let tracks = created
            .into_iter()
            .map(|t| t as Arc<dyn MediaTrack>)
            .collect();
        Ok(LocalMedia::new(tracks))
    }
}
