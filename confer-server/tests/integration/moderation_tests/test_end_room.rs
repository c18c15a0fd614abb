use confer_core::{ClientMessage, RoomId, ServerMessage};

use crate::integration::init_tracing;
use crate::utils::{TestMember, TestRelay};

#[tokio::test]
async fn test_host_ends_room_for_everyone() {
    init_tracing();
    let mut relay = TestRelay::new();
    let (a, b, c) = (TestMember::new(), TestMember::new(), TestMember::new());
    for m in [&a, &b, &c] {
        relay.join(m, "r1").await;
    }
    relay.signaling.clear().await;

    relay.send(&a, ClientMessage::EndRoom).await;

    for m in [&a, &b, &c] {
        assert_eq!(relay.received(m).await, vec![ServerMessage::RoomEnded]);
    }
    assert!(relay.relay.registry().room(&RoomId::from("r1")).is_none());
    assert!(relay.relay.registry().room_of(&b.connection_id).is_none());
}

#[tokio::test]
async fn test_end_room_from_non_host_is_ignored() {
    init_tracing();
    let mut relay = TestRelay::new();
    let (a, b) = (TestMember::new(), TestMember::new());
    relay.join(&a, "r1").await;
    relay.join(&b, "r1").await;
    relay.signaling.clear().await;

    relay.send(&b, ClientMessage::EndRoom).await;

    assert_eq!(relay.signaling.count().await, 0);
    assert_eq!(relay.relay.registry().connections(&RoomId::from("r1")).len(), 2);
}

#[tokio::test]
async fn test_room_can_be_reused_after_end() {
    init_tracing();
    let mut relay = TestRelay::new();
    let (a, b) = (TestMember::new(), TestMember::new());
    relay.join(&a, "r1").await;
    relay.join(&b, "r1").await;
    relay.send(&a, ClientMessage::EndRoom).await;
    relay.signaling.clear().await;

    relay.join(&b, "r1").await;

    assert_eq!(relay.received(&b).await, vec![ServerMessage::YouAreHost(true)]);
}
