use async_trait::async_trait;
use confer_client::SignalingOutput;
use confer_core::{ClientMessage, SessionSignal, UserId};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Mock SignalingOutput that captures everything the manager sends.
#[derive(Clone, Default)]
pub struct RecordingSignaling {
    sent: Arc<Mutex<Vec<ClientMessage>>>,
}

impl RecordingSignaling {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub async fn sent(&self) -> Vec<ClientMessage> {
        self.sent.lock().await.clone()
    }

    pub async fn count_op(&self, op: &str) -> usize {
        self.sent
            .lock()
            .await
            .iter()
            .filter(|m| m.op() == op)
            .count()
    }

    pub async fn offers_to(&self, target: &UserId) -> Vec<SessionSignal> {
        self.sent
            .lock()
            .await
            .iter()
            .filter_map(|m| match m {
                ClientMessage::Offer(signal) if &signal.target == target => Some(signal.clone()),
                _ => None,
            })
            .collect()
    }

    pub async fn answers_to(&self, target: &UserId) -> Vec<SessionSignal> {
        self.sent
            .lock()
            .await
            .iter()
            .filter_map(|m| match m {
                ClientMessage::Answer(signal) if &signal.target == target => Some(signal.clone()),
                _ => None,
            })
            .collect()
    }

    pub async fn clear(&self) {
        self.sent.lock().await.clear();
    }
}

#[async_trait]
impl SignalingOutput for RecordingSignaling {
    async fn send(&self, msg: ClientMessage) {
        tracing::debug!("[RecordingSignaling] '{}'", msg.op());
        self.sent.lock().await.push(msg);
    }
}
