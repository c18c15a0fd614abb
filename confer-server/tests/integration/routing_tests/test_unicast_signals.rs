use confer_core::{ClientMessage, IceSignal, ServerMessage, SessionSignal, UserId};
use serde_json::json;

use crate::integration::init_tracing;
use crate::utils::{TestMember, TestRelay};

fn offer(from: &TestMember, to: UserId) -> SessionSignal {
    SessionSignal {
        target: to,
        caller: from.user_id,
        username: Some("alice".into()),
        sdp: json!({ "type": "offer", "sdp": "v=0\r\n", "x-extra": [1, 2, 3] }),
    }
}

#[tokio::test]
async fn test_offer_reaches_only_the_target() {
    init_tracing();
    let mut relay = TestRelay::new();
    let (a, b, c) = (TestMember::new(), TestMember::new(), TestMember::new());
    for m in [&a, &b, &c] {
        relay.join(m, "r1").await;
    }
    relay.signaling.clear().await;

    let signal = offer(&a, b.user_id);
    relay.send(&a, ClientMessage::Offer(signal.clone())).await;

    // Payload is forwarded untouched.
    assert_eq!(relay.received(&b).await, vec![ServerMessage::Offer(signal)]);
    assert!(relay.received(&a).await.is_empty());
    assert!(relay.received(&c).await.is_empty());
}

#[tokio::test]
async fn test_answer_and_candidate_are_unicast() {
    init_tracing();
    let mut relay = TestRelay::new();
    let (a, b) = (TestMember::new(), TestMember::new());
    relay.join(&a, "r1").await;
    relay.join(&b, "r1").await;
    relay.signaling.clear().await;

    let answer = SessionSignal {
        target: a.user_id,
        caller: b.user_id,
        username: None,
        sdp: json!({ "type": "answer", "sdp": "v=0\r\n" }),
    };
    let candidate = IceSignal {
        target: a.user_id,
        caller: b.user_id,
        candidate: json!({ "candidate": "candidate:1 1 UDP 1 10.0.0.1 5000 typ host" }),
    };
    relay.send(&b, ClientMessage::Answer(answer.clone())).await;
    relay.send(&b, ClientMessage::IceCandidate(candidate.clone())).await;

    assert_eq!(
        relay.received(&a).await,
        vec![
            ServerMessage::Answer(answer),
            ServerMessage::IceCandidate(candidate)
        ]
    );
    assert!(relay.received(&b).await.is_empty());
}

#[tokio::test]
async fn test_every_connection_of_the_target_user_receives() {
    init_tracing();
    let mut relay = TestRelay::new();
    let a = TestMember::new();
    let b = TestMember::new();
    let b2 = b.another_tab();
    for m in [&a, &b, &b2] {
        relay.join(m, "r1").await;
    }
    relay.signaling.clear().await;

    let signal = offer(&a, b.user_id);
    relay.send(&a, ClientMessage::Offer(signal.clone())).await;

    assert_eq!(relay.received(&b).await, vec![ServerMessage::Offer(signal.clone())]);
    assert_eq!(relay.received(&b2).await, vec![ServerMessage::Offer(signal)]);
}

#[tokio::test]
async fn test_signal_to_unknown_user_is_dropped() {
    init_tracing();
    let mut relay = TestRelay::new();
    let a = TestMember::new();
    relay.join(&a, "r1").await;
    relay.signaling.clear().await;

    relay.send(&a, ClientMessage::Offer(offer(&a, UserId::new()))).await;

    assert_eq!(relay.signaling.count().await, 0);
}

#[tokio::test]
async fn test_disconnected_user_no_longer_receives() {
    init_tracing();
    let mut relay = TestRelay::new();
    let (a, b) = (TestMember::new(), TestMember::new());
    relay.join(&a, "r1").await;
    relay.join(&b, "r1").await;
    relay.disconnect(&b).await;
    relay.signaling.clear().await;

    relay.send(&a, ClientMessage::Offer(offer(&a, b.user_id))).await;

    assert!(relay.received(&b).await.is_empty());
}
