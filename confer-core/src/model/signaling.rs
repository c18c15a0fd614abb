use crate::model::peer::UserId;
use crate::model::room::RoomId;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IceServerConfig {
    pub urls: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credential: Option<String>,
}

impl IceServerConfig {
    pub fn stun(url: impl Into<String>) -> Self {
        Self {
            urls: vec![url.into()],
            username: None,
            credential: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IceConfig {
    pub ice_servers: Vec<IceServerConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinRoom {
    pub room_id: RoomId,
    pub user_id: UserId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeerNotice {
    pub user_id: UserId,
}

/// Offer or answer addressed to one user. `sdp` is never inspected by the relay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSignal {
    pub target: UserId,
    pub caller: UserId,
    #[serde(default)]
    pub username: Option<String>,
    pub sdp: Value,
}

/// Trickle ICE candidate addressed to one user. `candidate` is opaque to the relay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IceSignal {
    pub target: UserId,
    pub caller: UserId,
    pub candidate: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandToggle {
    pub room_id: RoomId,
    pub user_id: UserId,
    #[serde(default)]
    pub raised: bool,
    /// Fields the relay does not know about, passed through untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub room_id: RoomId,
    pub user_id: UserId,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub username: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub text: String,
    /// Display string chosen by the sender.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub time: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reaction {
    pub room_id: RoomId,
    pub user_id: UserId,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub emoji: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModerationTarget {
    pub target_user_id: UserId,
    pub room_id: RoomId,
}

/// Everything a client may send to the signaling server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", content = "d", rename_all = "kebab-case")]
pub enum ClientMessage {
    JoinRoom(JoinRoom),
    Offer(SessionSignal),
    Answer(SessionSignal),
    IceCandidate(IceSignal),
    EndRoom,
    ToggleHand(HandToggle),
    SendMessage(ChatMessage),
    SendReaction(Reaction),
    KickUser(ModerationTarget),
    MuteUser(ModerationTarget),
}

impl ClientMessage {
    pub fn op(&self) -> &'static str {
        match self {
            ClientMessage::JoinRoom(_) => "join-room",
            ClientMessage::Offer(_) => "offer",
            ClientMessage::Answer(_) => "answer",
            ClientMessage::IceCandidate(_) => "ice-candidate",
            ClientMessage::EndRoom => "end-room",
            ClientMessage::ToggleHand(_) => "toggle-hand",
            ClientMessage::SendMessage(_) => "send-message",
            ClientMessage::SendReaction(_) => "send-reaction",
            ClientMessage::KickUser(_) => "kick-user",
            ClientMessage::MuteUser(_) => "mute-user",
        }
    }
}

/// Everything the signaling server may push to a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", content = "d", rename_all = "kebab-case")]
pub enum ServerMessage {
    IceConfig(IceConfig),
    YouAreHost(bool),
    PeerJoined(PeerNotice),
    PeerLeft(PeerNotice),
    Offer(SessionSignal),
    Answer(SessionSignal),
    IceCandidate(IceSignal),
    RoomEnded,
    HandToggled(HandToggle),
    ReceiveMessage(ChatMessage),
    ReceiveReaction(Reaction),
    Kicked,
    MutedByHost,
}

impl ServerMessage {
    pub fn op(&self) -> &'static str {
        match self {
            ServerMessage::IceConfig(_) => "ice-config",
            ServerMessage::YouAreHost(_) => "you-are-host",
            ServerMessage::PeerJoined(_) => "peer-joined",
            ServerMessage::PeerLeft(_) => "peer-left",
            ServerMessage::Offer(_) => "offer",
            ServerMessage::Answer(_) => "answer",
            ServerMessage::IceCandidate(_) => "ice-candidate",
            ServerMessage::RoomEnded => "room-ended",
            ServerMessage::HandToggled(_) => "hand-toggled",
            ServerMessage::ReceiveMessage(_) => "receive-message",
            ServerMessage::ReceiveReaction(_) => "receive-reaction",
            ServerMessage::Kicked => "kicked",
            ServerMessage::MutedByHost => "muted-by-host",
        }
    }
}
