use async_trait::async_trait;
use confer_core::{ConnectionId, ServerMessage};

/// Outbound side of the relay: whatever owns the client sockets implements
/// this so the relay can push messages without knowing about WebSockets.
///
/// Delivery is fire-and-forget. Sending to a connection that is already gone
/// is a silent no-op.
#[async_trait]
pub trait SignalingOutput: Send + Sync {
    async fn send(&self, connection_id: ConnectionId, msg: ServerMessage);
}
