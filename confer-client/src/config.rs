use confer_core::utils::{DEFAULT_STUN_ADDR, DEFAULT_STUN_ADDR_2};
use confer_core::{IceServerConfig, RoomId, UserId};

/// What to do with a remote ICE candidate that arrives before the session has
/// a remote description to apply it against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EarlyCandidatePolicy {
    /// Log and discard the candidate.
    #[default]
    Drop,
    /// Queue it on the session and apply it right after the remote
    /// description is set.
    Buffer,
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// WebSocket endpoint of the signaling server, e.g. `ws://host:5000/ws`.
    pub server_url: String,
    pub room_id: RoomId,
    pub user_id: UserId,
    /// Sent along with every offer and answer so peers can label us.
    pub display_name: String,
    /// Used until the server pushes its own `ice-config`.
    pub ice_servers: Vec<IceServerConfig>,
    pub early_candidates: EarlyCandidatePolicy,
}

impl ClientConfig {
    pub fn new(
        server_url: impl Into<String>,
        room_id: impl Into<RoomId>,
        display_name: impl Into<String>,
    ) -> Self {
        Self {
            server_url: server_url.into(),
            room_id: room_id.into(),
            user_id: UserId::new(),
            display_name: display_name.into(),
            ice_servers: vec![
                IceServerConfig::stun(DEFAULT_STUN_ADDR),
                IceServerConfig::stun(DEFAULT_STUN_ADDR_2),
            ],
            early_candidates: EarlyCandidatePolicy::default(),
        }
    }

    pub fn with_user_id(mut self, user_id: UserId) -> Self {
        self.user_id = user_id;
        self
    }

    pub fn with_ice_servers(mut self, ice_servers: Vec<IceServerConfig>) -> Self {
        self.ice_servers = ice_servers;
        self
    }

    pub fn with_early_candidates(mut self, policy: EarlyCandidatePolicy) -> Self {
        self.early_candidates = policy;
        self
    }
}
