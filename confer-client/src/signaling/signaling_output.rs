use async_trait::async_trait;
use confer_core::ClientMessage;

/// Outbound side of the client's signaling connection.
///
/// Fire-and-forget: if the connection is gone the message is dropped.
#[async_trait]
pub trait SignalingOutput: Send + Sync {
    async fn send(&self, msg: ClientMessage);
}
