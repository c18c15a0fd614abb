use crate::{PeerConnectionState, RemoteTrack};
use confer_core::UserId;
use serde_json::Value;

/// Identifies one incarnation of a peer session. A session re-created for the
/// same remote gets a new epoch, so late callbacks of the old one can be told
/// apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionKey {
    pub remote: UserId,
    pub epoch: u64,
}

/// Callbacks of a transport, fed back into the manager's event loop.
#[derive(Debug, Clone)]
pub enum TransportEvent {
    /// A local ICE candidate to trickle to the remote peer.
    CandidateGenerated(SessionKey, Value),

    TrackReceived(SessionKey, RemoteTrack),

    StateChanged(SessionKey, PeerConnectionState),
}

impl TransportEvent {
    pub fn key(&self) -> SessionKey {
        match self {
            TransportEvent::CandidateGenerated(key, _)
            | TransportEvent::TrackReceived(key, _)
            | TransportEvent::StateChanged(key, _) => *key,
        }
    }
}
