use crate::{PeerConnectionState, RemoteStream, RemoteTrack};
use confer_core::UserId;
use std::collections::BTreeMap;

/// Read-only view of one remote participant.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PeerView {
    /// Absent until the first inbound track arrives.
    pub stream: Option<RemoteStream>,
    pub connection_state: PeerConnectionState,
    /// Learned from the peer's offer or answer.
    pub display_name: Option<String>,
    pub hand_raised: bool,
}

impl PeerView {
    /// Puts the track on the current stream, or starts a new stream when the
    /// peer switched stream ids.
    pub fn add_track(&mut self, track: RemoteTrack) {
        if let Some(stream) = self.stream.as_mut().filter(|s| s.id == track.stream_id) {
            stream.add_track(track);
            return;
        }
        let mut stream = RemoteStream::new(track.stream_id.clone());
        stream.add_track(track);
        self.stream = Some(stream);
    }
}

/// Every remote participant we hold a session with.
pub type PeerTable = BTreeMap<UserId, PeerView>;
