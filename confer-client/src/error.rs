use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("webrtc error: {0}")]
    WebRtc(#[from] webrtc::Error),

    #[error("signaling connection error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("invalid payload: {0}")]
    Payload(#[from] serde_json::Error),

    #[error("{0} channel closed")]
    ChannelClosed(&'static str),

    #[error("transport error: {0}")]
    Transport(String),
}

pub type Result<T> = std::result::Result<T, ClientError>;
