use crate::error::CaptureError;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use webrtc::track::track_local::TrackLocal;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackKind {
    Audio,
    Video,
}

/// One captured track. Owned by the session that acquired it.
pub trait MediaTrack: Send + Sync {
    fn id(&self) -> &str;

    fn kind(&self) -> TrackKind;

    fn is_enabled(&self) -> bool;

    fn set_enabled(&self, enabled: bool);

    fn stop(&self);

    /// Sendable track for a `webrtc` peer connection, if this capture has one.
    fn rtc_track(&self) -> Option<Arc<dyn TrackLocal + Send + Sync>> {
        None
    }
}

/// Opaque captured stream: a set of tracks that can be muted per kind and
/// stopped once.
pub struct LocalMedia {
    tracks: Vec<Arc<dyn MediaTrack>>,
    stopped: bool,
}

impl LocalMedia {
    pub fn new(tracks: Vec<Arc<dyn MediaTrack>>) -> Self {
        Self {
            tracks,
            stopped: false,
        }
    }

    pub fn tracks(&self) -> &[Arc<dyn MediaTrack>] {
        &self.tracks
    }

    pub fn has(&self, kind: TrackKind) -> bool {
        self.tracks.iter().any(|t| t.kind() == kind)
    }

    /// Flip every track of `kind`; returns how many tracks were touched.
    pub fn set_enabled(&self, kind: TrackKind, enabled: bool) -> usize {
        let mut touched = 0;
        for track in self.tracks.iter().filter(|t| t.kind() == kind) {
            track.set_enabled(enabled);
            touched += 1;
        }
        touched
    }

    /// Stops every track. Returns `false` if already stopped.
    pub fn stop(&mut self) -> bool {
        if self.stopped {
            return false;
        }
        for track in &self.tracks {
            track.stop();
        }
        self.stopped = true;
        true
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }
}

impl fmt::Debug for LocalMedia {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalMedia")
            .field("tracks", &self.tracks.len())
            .field("stopped", &self.stopped)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MediaRequest {
    pub audio: bool,
    pub video: bool,
}

impl MediaRequest {
    pub fn audio_video() -> Self {
        Self {
            audio: true,
            video: true,
        }
    }
}

/// Device capture collaborator.
#[async_trait]
pub trait MediaCapture: Send + Sync {
    async fn acquire(&self, request: MediaRequest) -> Result<LocalMedia, CaptureError>;
}
