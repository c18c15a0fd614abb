use confer_core::{ClientMessage, JoinRoom, PeerNotice, RoomId, ServerMessage, SessionSignal, UserId};
use serde_json::json;

use crate::integration::{init_tracing, spawn_server};
use crate::utils::TestClient;

fn join(room: &str, user_id: UserId) -> ClientMessage {
    ClientMessage::JoinRoom(JoinRoom {
        room_id: RoomId::from(room),
        user_id,
    })
}

#[tokio::test]
async fn test_ice_config_is_pushed_on_connect() {
    init_tracing();
    let addr = spawn_server().await;

    let mut client = TestClient::connect(addr).await.expect("connect");
    match client.recv().await.expect("first message") {
        ServerMessage::IceConfig(config) => assert!(!config.ice_servers.is_empty()),
        other => panic!("expected ice-config, got {:?}", other),
    }
}

#[tokio::test]
async fn test_two_clients_negotiate_over_websocket() {
    init_tracing();
    let addr = spawn_server().await;
    let (alice, bob) = (UserId::new(), UserId::new());

    let mut a = TestClient::connect(addr).await.expect("connect a");
    a.send(&join("ws-room", alice)).await.expect("join a");
    let host = a
        .recv_until(|m| matches!(m, ServerMessage::YouAreHost(_)))
        .await
        .expect("you-are-host");
    assert_eq!(host, ServerMessage::YouAreHost(true));

    let mut b = TestClient::connect(addr).await.expect("connect b");
    b.send(&join("ws-room", bob)).await.expect("join b");
    let host = b
        .recv_until(|m| matches!(m, ServerMessage::YouAreHost(_)))
        .await
        .expect("you-are-host");
    assert_eq!(host, ServerMessage::YouAreHost(false));

    let joined = a.recv().await.expect("peer-joined");
    assert_eq!(joined, ServerMessage::PeerJoined(PeerNotice { user_id: bob }));

    let offer = SessionSignal {
        target: bob,
        caller: alice,
        username: Some("alice".into()),
        sdp: json!({ "type": "offer", "sdp": "v=0\r\n" }),
    };
    a.send(&ClientMessage::Offer(offer.clone())).await.expect("offer");
    assert_eq!(b.recv().await.expect("offer"), ServerMessage::Offer(offer));

    b.close().await.expect("close b");
    let left = a.recv().await.expect("peer-left");
    assert_eq!(left, ServerMessage::PeerLeft(PeerNotice { user_id: bob }));
}

#[tokio::test]
async fn test_invalid_json_does_not_kill_the_connection() {
    init_tracing();
    let addr = spawn_server().await;

    let mut client = TestClient::connect(addr).await.expect("connect");
    client.recv().await.expect("ice-config");

    client.send_raw("{not json").await.expect("send garbage");
    client
        .send_raw(r#"{"op":"no-such-op","d":{}}"#)
        .await
        .expect("send unknown op");
    assert!(client.try_recv().await.expect("socket alive").is_none());

    client.send(&join("r", UserId::new())).await.expect("join");
    let host = client
        .recv_until(|m| matches!(m, ServerMessage::YouAreHost(_)))
        .await
        .expect("you-are-host");
    assert_eq!(host, ServerMessage::YouAreHost(true));
}

#[tokio::test]
async fn test_room_event_payload_is_forwarded_as_is() {
    init_tracing();
    let addr = spawn_server().await;
    let (alice, bob) = (UserId::new(), UserId::new());

    let mut a = TestClient::connect(addr).await.expect("connect a");
    a.send(&join("r1", alice)).await.expect("join a");
    a.recv_until(|m| matches!(m, ServerMessage::YouAreHost(_)))
        .await
        .expect("you-are-host");

    let mut b = TestClient::connect(addr).await.expect("connect b");
    b.send(&join("r1", bob)).await.expect("join b");
    b.recv_until(|m| matches!(m, ServerMessage::YouAreHost(_)))
        .await
        .expect("you-are-host");

    // No `time`, plus a field the server has never heard of.
    let payload = json!({
        "roomId": "r1",
        "userId": alice.to_string(),
        "username": "alice",
        "text": "hi",
        "color": "teal"
    });
    a.send_raw(&json!({ "op": "send-message", "d": payload }).to_string())
        .await
        .expect("send chat");

    let received = b.recv_raw_op("receive-message").await.expect("receive-message");
    assert_eq!(received["d"], payload);
}
