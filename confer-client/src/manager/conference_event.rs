use confer_core::{ChatMessage, Reaction};

/// Room-level happenings that are not part of the peer table.
#[derive(Debug, Clone, PartialEq)]
pub enum ConferenceEvent {
    /// Answer to our join.
    HostStatus(bool),
    /// Our own hand, updated as soon as we toggle it.
    HandRaised(bool),
    /// Chat line, either received or our own.
    Chat(ChatMessage),
    Reaction(Reaction),
    /// The host asked us to mute. Muting the microphone is up to the caller.
    MutedByHost,

    Kicked,
    RoomEnded,
    /// The signaling connection went away.
    Disconnected,
    Left,
}

impl ConferenceEvent {
    /// After one of these the manager has closed every session and stopped.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ConferenceEvent::Kicked
                | ConferenceEvent::RoomEnded
                | ConferenceEvent::Disconnected
                | ConferenceEvent::Left
        )
    }
}
