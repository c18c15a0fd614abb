use confer_core::MediaKind;
use std::fmt;
use std::sync::Arc;
use webrtc::track::track_remote::TrackRemote;

/// An inbound track. `remote` is the live webrtc track when the session runs
/// over a real transport; it is what a renderer reads RTP from.
#[derive(Clone)]
pub struct RemoteTrack {
    pub id: String,
    pub kind: MediaKind,
    pub stream_id: String,
    pub remote: Option<Arc<TrackRemote>>,
}

impl RemoteTrack {
    pub fn new(id: impl Into<String>, kind: MediaKind, stream_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            stream_id: stream_id.into(),
            remote: None,
        }
    }
}

impl PartialEq for RemoteTrack {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.kind == other.kind && self.stream_id == other.stream_id
    }
}

impl fmt::Debug for RemoteTrack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteTrack")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("stream_id", &self.stream_id)
            .field("live", &self.remote.is_some())
            .finish()
    }
}

/// The media a remote peer sends us, grouped by its stream id.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteStream {
    pub id: String,
    tracks: Vec<RemoteTrack>,
}

impl RemoteStream {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            tracks: Vec::new(),
        }
    }

    /// Adds the track, replacing one with the same id.
    pub fn add_track(&mut self, track: RemoteTrack) {
        match self.tracks.iter_mut().find(|t| t.id == track.id) {
            Some(existing) => *existing = track,
            None => self.tracks.push(track),
        }
    }

    pub fn tracks(&self) -> &[RemoteTrack] {
        &self.tracks
    }

    pub fn track(&self, kind: MediaKind) -> Option<&RemoteTrack> {
        self.tracks.iter().find(|t| t.kind == kind)
    }

    pub fn has(&self, kind: MediaKind) -> bool {
        self.track(kind).is_some()
    }
}
