pub mod routing_tests;

use confer_server::{ServerConfig, serve_on};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::Level;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_test_writer()
        .try_init();
}

/// Starts a full server on an ephemeral local port.
pub async fn spawn_server() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("No local address");

    tokio::spawn(async move {
        if let Err(e) = serve_on(listener, ServerConfig::default()).await {
            tracing::error!("Test server stopped: {}", e);
        }
    });

    addr
}
