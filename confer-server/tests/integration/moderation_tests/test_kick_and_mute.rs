use confer_core::{ClientMessage, ModerationTarget, PeerNotice, RoomId, ServerMessage};

use crate::integration::init_tracing;
use crate::utils::{TestMember, TestRelay};

fn target(member: &TestMember) -> ModerationTarget {
    ModerationTarget {
        target_user_id: member.user_id,
        room_id: RoomId::from("r1"),
    }
}

async fn room_of_three() -> (TestRelay, TestMember, TestMember, TestMember) {
    let mut relay = TestRelay::new();
    let (a, b, c) = (TestMember::new(), TestMember::new(), TestMember::new());
    for m in [&a, &b, &c] {
        relay.join(m, "r1").await;
    }
    relay.signaling.clear().await;
    (relay, a, b, c)
}

#[tokio::test]
async fn test_host_kicks_member() {
    init_tracing();
    let (mut relay, host, b, c) = room_of_three().await;

    relay.send(&host, ClientMessage::KickUser(target(&b))).await;

    let left = ServerMessage::PeerLeft(PeerNotice { user_id: b.user_id });
    assert_eq!(relay.received(&b).await, vec![ServerMessage::Kicked]);
    assert_eq!(relay.received(&host).await, vec![left.clone()]);
    assert_eq!(relay.received(&c).await, vec![left]);
    assert_eq!(
        relay.relay.registry().connections(&RoomId::from("r1")),
        vec![host.connection_id, c.connection_id]
    );
}

#[tokio::test]
async fn test_kick_removes_every_tab_of_the_user() {
    init_tracing();
    let mut relay = TestRelay::new();
    let host = TestMember::new();
    let b = TestMember::new();
    let b2 = b.another_tab();
    for m in [&host, &b, &b2] {
        relay.join(m, "r1").await;
    }
    relay.signaling.clear().await;

    relay.send(&host, ClientMessage::KickUser(target(&b))).await;

    assert_eq!(relay.received(&b2).await, vec![ServerMessage::Kicked]);
    assert_eq!(
        relay.relay.registry().connections(&RoomId::from("r1")),
        vec![host.connection_id]
    );
}

#[tokio::test]
async fn test_kick_from_non_host_is_ignored() {
    init_tracing();
    let (mut relay, host, b, c) = room_of_three().await;

    relay.send(&b, ClientMessage::KickUser(target(&c))).await;
    relay.send(&b, ClientMessage::KickUser(target(&host))).await;

    assert_eq!(relay.signaling.count().await, 0);
    assert_eq!(relay.relay.registry().connections(&RoomId::from("r1")).len(), 3);
}

#[tokio::test]
async fn test_host_mutes_member() {
    init_tracing();
    let (mut relay, host, b, c) = room_of_three().await;

    relay.send(&host, ClientMessage::MuteUser(target(&c))).await;

    assert_eq!(relay.received(&c).await, vec![ServerMessage::MutedByHost]);
    assert!(relay.received(&b).await.is_empty());
    assert!(relay.received(&host).await.is_empty());
}

#[tokio::test]
async fn test_mute_from_non_host_is_ignored() {
    init_tracing();
    let (mut relay, host, b, _c) = room_of_three().await;

    relay.send(&b, ClientMessage::MuteUser(target(&host))).await;

    assert_eq!(relay.signaling.count().await, 0);
}
