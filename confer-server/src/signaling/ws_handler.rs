use crate::{RelayCommand, SignalingService};
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use confer_core::{ClientMessage, ConnectionId};
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(service): State<SignalingService>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, service))
}

async fn handle_socket(socket: WebSocket, service: SignalingService) {
    let connection_id = ConnectionId::new();
    info!("New WebSocket connection: {}", connection_id);

    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel();

    service.add_connection(connection_id, tx);

    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let json = match serde_json::to_string(&msg) {
                Ok(json) => json,
                Err(e) => {
                    error!("Failed to encode '{}': {}", msg.op(), e);
                    continue;
                }
            };
            if sender.send(Message::Text(json.into())).await.is_err() {
                break;
            }
        }
    });

    let mut recv_task = tokio::spawn({
        let service = service.clone();

        async move {
            while let Some(Ok(msg)) = receiver.next().await {
                match msg {
                    Message::Text(text) => match serde_json::from_str::<ClientMessage>(&text) {
                        Ok(message) => {
                            let cmd = RelayCommand::Inbound {
                                connection_id,
                                message,
                            };
                            if let Err(e) = service.relay(cmd).await {
                                error!("Relay died: {}", e);
                                break;
                            }
                        }
                        Err(e) => warn!("Invalid message from {}: {}", connection_id, e),
                    },
                    Message::Close(_) => break,
                    _ => {}
                }
            }
        }
    });

    tokio::select! {
        _ = (&mut send_task) => recv_task.abort(),
        _ = (&mut recv_task) => send_task.abort(),
    };

    if let Err(e) = service.relay(RelayCommand::Disconnect { connection_id }).await {
        error!("Relay died before disconnect of {}: {}", connection_id, e);
    }
    service.remove_connection(&connection_id);
    info!("WebSocket disconnected: {}", connection_id);
}
