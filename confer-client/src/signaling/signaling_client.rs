use crate::{Result, SignalingOutput};
use async_trait::async_trait;
use confer_core::{ClientMessage, ServerMessage};
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, error, info, warn};

/// Capacity of the inbound server message queue.
const INBOUND_CAPACITY: usize = 256;

/// WebSocket connection to the signaling server.
///
/// Cloning is cheap. The socket is closed once every clone is dropped.
#[derive(Clone)]
pub struct SignalingClient {
    tx: mpsc::UnboundedSender<ClientMessage>,
}

impl SignalingClient {
    /// Connects and returns the client together with the stream of server
    /// messages. The receiver yields `None` once the server goes away.
    pub async fn connect(url: &str) -> Result<(Self, mpsc::Receiver<ServerMessage>)> {
        let (socket, _) = connect_async(url).await?;
        info!("Connected to signaling server at {}", url);

        let (mut sink, mut stream) = socket.split();
        let (out_tx, mut out_rx) = mpsc::unbounded_channel::<ClientMessage>();
        let (in_tx, in_rx) = mpsc::channel::<ServerMessage>(INBOUND_CAPACITY);

        tokio::spawn(async move {
            while let Some(msg) = out_rx.recv().await {
                let json = match serde_json::to_string(&msg) {
                    Ok(json) => json,
                    Err(e) => {
                        error!("Failed to encode '{}': {}", msg.op(), e);
                        continue;
                    }
                };
                if sink.send(Message::text(json)).await.is_err() {
                    break;
                }
            }
            let _ = sink.close().await;
            debug!("Signaling writer finished");
        });

        tokio::spawn(async move {
            while let Some(frame) = stream.next().await {
                match frame {
                    Ok(Message::Text(text)) => match serde_json::from_str::<ServerMessage>(&text) {
                        Ok(msg) => {
                            if in_tx.send(msg).await.is_err() {
                                break;
                            }
                        }
                        Err(e) => warn!("Invalid server message: {}", e),
                    },
                    Ok(Message::Close(_)) => break,
                    Ok(_) => {}
                    Err(e) => {
                        warn!("Signaling connection error: {}", e);
                        break;
                    }
                }
            }
            info!("Signaling connection closed");
        });

        Ok((Self { tx: out_tx }, in_rx))
    }
}

#[async_trait]
impl SignalingOutput for SignalingClient {
    async fn send(&self, msg: ClientMessage) {
        let op = msg.op();
        if self.tx.send(msg).is_err() {
            warn!("Signaling connection is closed, dropping '{}'", op);
        }
    }
}
