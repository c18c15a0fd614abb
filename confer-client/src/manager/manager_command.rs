use crate::LocalMedia;
use confer_core::UserId;

/// Local intents, sent to the manager by whoever drives the conference.
#[derive(Debug)]
pub enum ManagerCommand {
    /// The set of outgoing tracks changed (device switch, camera on, screen share).
    SetLocalMedia(LocalMedia),
    ToggleHand(bool),
    SendChat(String),
    SendReaction(String),
    /// Host only.
    Kick(UserId),
    /// Host only.
    Mute(UserId),
    /// Host only.
    EndMeetingForAll,
    Leave,
}
