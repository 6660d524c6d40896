use crate::error::CaptureError;
use crate::negotiation::{LocalMedia, MediaCapture, MediaRequest, MediaTrack, TrackKind};
use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use webrtc::api::media_engine::{MIME_TYPE_OPUS, MIME_TYPE_VP8};
use webrtc::rtp_transceiver::rtp_codec::RTCRtpCodecCapability;
use webrtc::track::track_local::TrackLocal;
use webrtc::track::track_local::track_local_static_sample::TrackLocalStaticSample;

const STREAM_ID: &str = "duet";

/// A negotiable track that never carries samples.
pub struct SilentTrack {
    id: String,
    kind: TrackKind,
    enabled: AtomicBool,
    stopped: AtomicBool,
    rtc: Arc<TrackLocalStaticSample>,
}

impl SilentTrack {
    pub fn new(kind: TrackKind) -> Self {
        let (id, mime_type) = match kind {
            TrackKind::Audio => ("audio", MIME_TYPE_OPUS),
            TrackKind::Video => ("video", MIME_TYPE_VP8),
        };
        let rtc = Arc::new(TrackLocalStaticSample::new(
            RTCRtpCodecCapability {
                mime_type: mime_type.to_owned(),
                ..Default::default()
            },
            id.to_owned(),
            STREAM_ID.to_owned(),
        ));
        Self {
            id: id.to_owned(),
            kind,
            enabled: AtomicBool::new(true),
            stopped: AtomicBool::new(false),
            rtc,
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }
}

impl MediaTrack for SilentTrack {
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
        self.stopped.store(true, Ordering::SeqCst);
    }

    fn rtc_track(&self) -> Option<Arc<dyn TrackLocal + Send + Sync>> {
        let track: Arc<dyn TrackLocal + Send + Sync> = self.rtc.clone();
        Some(track)
    }
}

/// Capture backend for hosts without camera or microphone access: hands out
/// opus and VP8 tracks so negotiation runs end to end.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentCapture;

#[async_trait]
impl MediaCapture for SilentCapture {
    async fn acquire(&self, request: MediaRequest) -> Result<LocalMedia, CaptureError> {
        let mut tracks: Vec<Arc<dyn MediaTrack>> = Vec::new();
        if request.audio {
            tracks.push(Arc::new(SilentTrack::new(TrackKind::Audio)));
        }
        if request.video {
            tracks.push(Arc::new(SilentTrack::new(TrackKind::Video)));
        }
        if tracks.is_empty() {
            return Err(CaptureError::DeviceUnavailable(
                "no track kinds requested".to_owned(),
            ));
        }
        Ok(LocalMedia::new(tracks))
    }
}
