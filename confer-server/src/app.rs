use crate::{RelayCommand, ServerConfig, SignalingRelay, SignalingService, ws_handler};
use axum::{Router, routing::get};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

/// Builds the HTTP router and spawns the relay actor behind it.
/// Must be called from within a tokio runtime.
pub fn router(config: &ServerConfig) -> Router {
    let (relay_tx, relay_rx) = mpsc::channel::<RelayCommand>(config.relay_capacity);
    let signaling = SignalingService::new(relay_tx, config.ice_servers.clone());

    let relay = SignalingRelay::new(relay_rx, Arc::new(signaling.clone()));
    tokio::spawn(async move {
        relay.run().await;
    });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(health))
        .route("/ws", get(ws_handler))
        .layer(cors)
        .with_state(signaling)
}

async fn health() -> &'static str {
    "Signaling server is running"
}

pub async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    let listener = TcpListener::bind(config.bind_addr).await?;
    serve_on(listener, config).await
}

/// Serves on an already bound listener. Tests bind to port 0 and pass it here.
pub async fn serve_on(listener: TcpListener, config: ServerConfig) -> anyhow::Result<()> {
    let app = router(&config);
    info!("Signaling server listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
