mod media;
mod peer;
mod room;
mod signaling;

pub use media::MediaKind;
pub use peer::{ConnectionId, IdError, MemberIdentity, UserId};
pub use room::RoomId;
pub use signaling::{
    ChatMessage, ClientMessage, HandToggle, IceConfig, IceServerConfig, IceSignal, JoinRoom,
    ModerationTarget, PeerNotice, Reaction, ServerMessage, SessionSignal,
};
