use crate::relay::RelayCommand;
use crate::signaling::SignalingOutput;
use async_trait::async_trait;
use confer_core::{ConnectionId, IceConfig, IceServerConfig, ServerMessage};
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error};

struct SignalingInner {
    connections: DashMap<ConnectionId, mpsc::UnboundedSender<ServerMessage>>,
    ice_servers: Vec<IceServerConfig>,
}

/// Owns the outbound half of every client socket and hands inbound messages
/// to the relay actor.
#[derive(Clone)]
pub struct SignalingService {
    inner: Arc<SignalingInner>,
    pub(crate) relay_tx: mpsc::Sender<RelayCommand>,
}

impl SignalingService {
    pub fn new(relay_tx: mpsc::Sender<RelayCommand>, ice_servers: Vec<IceServerConfig>) -> Self {
        Self {
            inner: Arc::new(SignalingInner {
                connections: DashMap::new(),
                ice_servers,
            }),
            relay_tx,
        }
    }

    pub fn get_ice_servers(&self) -> Vec<IceServerConfig> {
        self.inner.ice_servers.clone()
    }

    pub fn add_connection(
        &self,
        connection_id: ConnectionId,
        tx: mpsc::UnboundedSender<ServerMessage>,
    ) {
        self.inner.connections.insert(connection_id, tx);
        self.send_signal(
            connection_id,
            ServerMessage::IceConfig(IceConfig {
                ice_servers: self.get_ice_servers(),
            }),
        );
    }

    pub fn remove_connection(&self, connection_id: &ConnectionId) {
        self.inner.connections.remove(connection_id);
    }

    pub fn connection_count(&self) -> usize {
        self.inner.connections.len()
    }

    pub fn send_signal(&self, connection_id: ConnectionId, msg: ServerMessage) {
        let Some(connection) = self.inner.connections.get(&connection_id) else {
            debug!(
                "Connection {} is gone, dropping '{}'",
                connection_id,
                msg.op()
            );
            return;
        };
        if let Err(e) = connection.send(msg) {
            error!("Failed to queue message for {}: {}", connection_id, e);
        }
    }

    pub async fn relay(&self, cmd: RelayCommand) -> Result<(), mpsc::error::SendError<RelayCommand>> {
        self.relay_tx.send(cmd).await
    }
}

#[async_trait]
impl SignalingOutput for SignalingService {
    async fn send(&self, connection_id: ConnectionId, msg: ServerMessage) {
        self.send_signal(connection_id, msg);
    }
}
