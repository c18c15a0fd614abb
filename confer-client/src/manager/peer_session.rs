use crate::{PeerConnectionState, PeerTransport};
use serde_json::Value;
use std::sync::Arc;

/// Negotiation bookkeeping for one remote peer.
pub(super) struct PeerSession {
    pub epoch: u64,
    pub transport: Arc<dyn PeerTransport>,
    pub state: PeerConnectionState,
    /// We sent an offer and have not applied the matching answer yet.
    pub awaiting_answer: bool,
    pub has_remote_description: bool,
    /// Candidates held back until the remote description is set.
    pub pending_candidates: Vec<Value>,
}

impl PeerSession {
    pub fn new(epoch: u64, transport: Arc<dyn PeerTransport>) -> Self {
        Self {
            epoch,
            transport,
            state: PeerConnectionState::New,
            awaiting_answer: false,
            has_remote_description: false,
            pending_candidates: Vec::new(),
        }
    }
}
