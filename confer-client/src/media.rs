use confer_core::MediaKind;
use std::fmt;
use std::sync::Arc;
use webrtc::api::media_engine::{MIME_TYPE_OPUS, MIME_TYPE_VP8};
use webrtc::rtp_transceiver::rtp_codec::RTCRtpCodecCapability;
use webrtc::track::track_local::TrackLocal;
use webrtc::track::track_local::track_local_static_sample::TrackLocalStaticSample;

/// One outgoing track handed to us by whoever owns the capture devices.
#[derive(Clone)]
pub struct LocalTrack {
    id: String,
    kind: MediaKind,
    track: Arc<dyn TrackLocal + Send + Sync>,
}

impl LocalTrack {
    pub fn new(kind: MediaKind, track: Arc<dyn TrackLocal + Send + Sync>) -> Self {
        Self {
            id: track.id().to_owned(),
            kind,
            track,
        }
    }

    /// Opus sample track. Samples are written by the capture side.
    pub fn audio(id: impl Into<String>, stream_id: impl Into<String>) -> Self {
        Self::sample(MediaKind::Audio, MIME_TYPE_OPUS, id.into(), stream_id.into())
    }

    /// VP8 sample track.
    pub fn video(id: impl Into<String>, stream_id: impl Into<String>) -> Self {
        Self::sample(MediaKind::Video, MIME_TYPE_VP8, id.into(), stream_id.into())
    }

    fn sample(kind: MediaKind, mime_type: &str, id: String, stream_id: String) -> Self {
        let track = Arc::new(TrackLocalStaticSample::new(
            RTCRtpCodecCapability {
                mime_type: mime_type.to_owned(),
                ..Default::default()
            },
            id,
            stream_id,
        ));
        Self::new(kind, track)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> MediaKind {
        self.kind
    }

    pub fn track(&self) -> Arc<dyn TrackLocal + Send + Sync> {
        Arc::clone(&self.track)
    }
}

impl fmt::Debug for LocalTrack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalTrack")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .finish()
    }
}

/// Snapshot of the outgoing media. At most one track per kind is sent; when
/// several are present the first one of each kind wins.
#[derive(Debug, Clone, Default)]
pub struct LocalMedia {
    tracks: Vec<LocalTrack>,
}

impl LocalMedia {
    pub fn new(tracks: Vec<LocalTrack>) -> Self {
        Self { tracks }
    }

    pub fn with_track(mut self, track: LocalTrack) -> Self {
        self.tracks.push(track);
        self
    }

    pub fn tracks(&self) -> impl Iterator<Item = &LocalTrack> {
        MediaKind::ALL
            .into_iter()
            .filter_map(move |kind| self.track(kind))
    }

    pub fn track(&self, kind: MediaKind) -> Option<&LocalTrack> {
        self.tracks.iter().find(|t| t.kind == kind)
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}
