use confer_client::{LocalMedia, PeerConnectionState, SdpKind, SessionDescription};
use confer_core::{ServerMessage, UserId};

use crate::integration::init_tracing;
use crate::utils::{TestManager, TransportCall, cam, mic};

#[tokio::test]
async fn test_peer_joined_creates_session_and_sends_offer() {
    init_tracing();
    let media = LocalMedia::default().with_track(mic("mic-1")).with_track(cam("cam-1"));
    let mut t = TestManager::new(media);
    let bob = UserId::new();

    t.peer_joined(bob).await;

    let transport = t.factory.latest_for(&bob).await;
    assert_eq!(
        transport.calls().await,
        vec![
            TransportCall::AddTrack("mic-1".into()),
            TransportCall::AddTrack("cam-1".into()),
            TransportCall::CreateOffer,
        ]
    );

    let offers = t.signaling.offers_to(&bob).await;
    assert_eq!(offers.len(), 1);
    assert_eq!(offers[0].caller, t.manager.user_id());
    assert_eq!(offers[0].username.as_deref(), Some("alice"));
    let desc = SessionDescription::from_value(offers[0].sdp.clone()).unwrap();
    assert_eq!(desc.kind, SdpKind::Offer);

    assert_eq!(t.peer_state(&bob), Some(PeerConnectionState::New));
}

#[tokio::test]
async fn test_initiate_is_skipped_while_connecting_or_connected() {
    init_tracing();
    let mut t = TestManager::new(LocalMedia::default());
    let bob = UserId::new();

    t.peer_joined(bob).await;
    t.set_state(&bob, PeerConnectionState::Connecting).await;
    t.peer_joined(bob).await;

    t.set_state(&bob, PeerConnectionState::Connected).await;
    t.peer_joined(bob).await;

    assert_eq!(t.factory.created().await, 1);
    assert_eq!(t.signaling.offers_to(&bob).await.len(), 1);
}

#[tokio::test]
async fn test_failed_session_is_closed_and_recreated() {
    init_tracing();
    let mut t = TestManager::new(LocalMedia::default());
    let bob = UserId::new();

    t.peer_joined(bob).await;
    t.manager
        .handle_server_message(ServerMessage::HandToggled(confer_core::HandToggle {
            room_id: "r1".into(),
            user_id: bob,
            raised: true,
            extra: Default::default(),
        }))
        .await;
    t.set_state(&bob, PeerConnectionState::Failed).await;

    t.peer_joined(bob).await;

    let transports = t.factory.transports_for(&bob).await;
    assert_eq!(transports.len(), 2);
    assert!(transports[0].is_closed().await);
    assert!(!transports[1].is_closed().await);
    assert!(transports[1].key.epoch > transports[0].key.epoch);

    // Re-creation resets the connection but keeps what we know about the peer.
    let view = t.peers.borrow().get(&bob).cloned().unwrap();
    assert_eq!(view.connection_state, PeerConnectionState::New);
    assert!(view.hand_raised);
    assert_eq!(t.signaling.offers_to(&bob).await.len(), 2);
}

#[tokio::test]
async fn test_peer_joined_about_ourselves_is_ignored() {
    init_tracing();
    let mut t = TestManager::new(LocalMedia::default());
    let me = t.manager.user_id();

    t.peer_joined(me).await;

    assert_eq!(t.factory.created().await, 0);
    assert!(t.signaling.sent().await.is_empty());
}

#[tokio::test]
async fn test_ice_config_from_server_is_used_for_new_sessions() {
    init_tracing();
    let mut t = TestManager::new(LocalMedia::default());
    let turn = confer_core::IceServerConfig {
        urls: vec!["turn:turn.example.org:3478".into()],
        username: Some("u".into()),
        credential: Some("p".into()),
    };

    t.manager
        .handle_server_message(ServerMessage::IceConfig(confer_core::IceConfig {
            ice_servers: vec![turn.clone()],
        }))
        .await;
    t.peer_joined(UserId::new()).await;

    assert_eq!(t.factory.last_ice_servers().await, vec![turn]);
}
