use crate::{LocalTrack, Result, SessionDescription, SessionKey, TransportEvent};
use async_trait::async_trait;
use confer_core::{IceServerConfig, MediaKind};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::mpsc;

/// The media session with one remote peer.
#[async_trait]
pub trait PeerTransport: Send + Sync {
    /// Creates an offer and installs it as the local description.
    async fn create_offer(&self) -> Result<SessionDescription>;

    /// Creates an answer and installs it as the local description.
    async fn create_answer(&self) -> Result<SessionDescription>;

    async fn set_remote_description(&self, desc: SessionDescription) -> Result<()>;

    async fn add_ice_candidate(&self, candidate: Value) -> Result<()>;

    /// Id of the track currently sent for `kind`, `None` when no sender
    /// carries a track of that kind.
    async fn sender_track(&self, kind: MediaKind) -> Option<String>;

    /// Swaps the track of the existing sender of the same kind. Does not
    /// require renegotiation.
    async fn replace_track(&self, track: &LocalTrack) -> Result<()>;

    /// Adds a new sender. The session must be renegotiated afterwards.
    async fn add_track(&self, track: &LocalTrack) -> Result<()>;

    async fn close(&self) -> Result<()>;
}

#[async_trait]
pub trait TransportFactory: Send + Sync {
    /// Creates a transport whose callbacks are reported on `events`, tagged
    /// with `key`.
    async fn create(
        &self,
        key: SessionKey,
        ice_servers: &[IceServerConfig],
        events: mpsc::Sender<TransportEvent>,
    ) -> Result<Arc<dyn PeerTransport>>;
}
