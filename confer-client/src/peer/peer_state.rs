use std::fmt;

/// Connection state of one peer session, as reported by its transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PeerConnectionState {
    #[default]
    New,
    Connecting,
    Connected,
    Disconnected,
    Failed,
    Closed,
}

impl PeerConnectionState {
    /// A session in one of these states is kept and renegotiated in place
    /// when the remote side sends a new offer.
    pub fn is_live(self) -> bool {
        matches!(
            self,
            PeerConnectionState::New
                | PeerConnectionState::Connecting
                | PeerConnectionState::Connected
        )
    }

    /// Negotiation is underway or done.
    pub fn is_established(self) -> bool {
        matches!(
            self,
            PeerConnectionState::Connecting | PeerConnectionState::Connected
        )
    }
}

impl fmt::Display for PeerConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PeerConnectionState::New => "new",
            PeerConnectionState::Connecting => "connecting",
            PeerConnectionState::Connected => "connected",
            PeerConnectionState::Disconnected => "disconnected",
            PeerConnectionState::Failed => "failed",
            PeerConnectionState::Closed => "closed",
        };
        f.write_str(s)
    }
}
