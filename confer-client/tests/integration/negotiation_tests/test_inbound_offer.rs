use confer_client::{LocalMedia, PeerConnectionState, SdpKind, SessionDescription};
use confer_core::UserId;
use serde_json::json;

use crate::integration::init_tracing;
use crate::utils::{TestManager, TransportCall, mic, offer_sdp};

#[tokio::test]
async fn test_offer_creates_session_and_answers_caller() {
    init_tracing();
    let mut t = TestManager::new(LocalMedia::default().with_track(mic("mic-1")));
    let bob = UserId::new();

    t.manager
        .handle_offer(bob, offer_sdp(), Some("bob".into()))
        .await;

    let transport = t.factory.latest_for(&bob).await;
    assert_eq!(
        transport.calls().await,
        vec![
            TransportCall::AddTrack("mic-1".into()),
            TransportCall::SetRemote(SdpKind::Offer),
            TransportCall::CreateAnswer,
        ]
    );

    let answers = t.signaling.answers_to(&bob).await;
    assert_eq!(answers.len(), 1);
    assert_eq!(answers[0].username.as_deref(), Some("alice"));
    let desc = SessionDescription::from_value(answers[0].sdp.clone()).unwrap();
    assert_eq!(desc.kind, SdpKind::Answer);

    let view = t.peers.borrow().get(&bob).cloned().unwrap();
    assert_eq!(view.display_name.as_deref(), Some("bob"));
}

#[tokio::test]
async fn test_offer_on_live_session_renegotiates_in_place() {
    init_tracing();
    let mut t = TestManager::new(LocalMedia::default());
    let bob = UserId::new();

    t.manager.handle_offer(bob, offer_sdp(), None).await;
    t.set_state(&bob, PeerConnectionState::Connected).await;

    t.manager.handle_offer(bob, offer_sdp(), None).await;

    assert_eq!(t.factory.created().await, 1);
    let transport = t.factory.latest_for(&bob).await;
    assert_eq!(transport.count(&TransportCall::SetRemote(SdpKind::Offer)).await, 2);
    assert!(!transport.is_closed().await);
    assert_eq!(t.signaling.answers_to(&bob).await.len(), 2);
    assert_eq!(t.peer_state(&bob), Some(PeerConnectionState::Connected));
}

#[tokio::test]
async fn test_offer_on_closed_session_recreates_it() {
    init_tracing();
    let mut t = TestManager::new(LocalMedia::default());
    let bob = UserId::new();

    t.manager.handle_offer(bob, offer_sdp(), None).await;
    t.set_state(&bob, PeerConnectionState::Disconnected).await;

    t.manager.handle_offer(bob, offer_sdp(), None).await;

    let transports = t.factory.transports_for(&bob).await;
    assert_eq!(transports.len(), 2);
    assert!(transports[0].is_closed().await);
}

#[tokio::test]
async fn test_malformed_offer_is_ignored() {
    init_tracing();
    let mut t = TestManager::new(LocalMedia::default());
    let bob = UserId::new();

    t.manager
        .handle_offer(bob, json!({ "type": "offer" }), None)
        .await;
    t.manager
        .handle_offer(bob, json!({ "type": "answer", "sdp": "" }), None)
        .await;

    assert_eq!(t.factory.created().await, 0);
    assert!(t.signaling.sent().await.is_empty());
}
