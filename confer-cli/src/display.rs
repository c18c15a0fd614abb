use colored::*;
use confer_client::{ConferenceEvent, PeerConnectionState, PeerTable, PeerView};
use confer_core::UserId;
use std::fmt;

/// A participant as shown on screen: its name, or the start of its id.
pub fn label(id: &UserId, view: Option<&PeerView>) -> String {
    match view.and_then(|v| v.display_name.as_deref()) {
        Some(name) => name.to_owned(),
        None => id.to_string().chars().take(8).collect(),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PeerChange {
    Joined(String),
    State(String, PeerConnectionState),
    Hand(String, bool),
    Media(String, usize),
    Left(String),
}

/// What changed between two snapshots of the peer table.
pub fn diff_peers(prev: &PeerTable, next: &PeerTable) -> Vec<PeerChange> {
    let mut changes = Vec::new();

    for (id, view) in next {
        let name = label(id, Some(view));
        let Some(old) = prev.get(id) else {
            changes.push(PeerChange::Joined(name.clone()));
            if view.connection_state != PeerConnectionState::New {
                changes.push(PeerChange::State(name, view.connection_state));
            }
            continue;
        };

        if old.connection_state != view.connection_state {
            changes.push(PeerChange::State(name.clone(), view.connection_state));
        }
        if old.hand_raised != view.hand_raised {
            changes.push(PeerChange::Hand(name.clone(), view.hand_raised));
        }
        let tracks = |v: &PeerView| v.stream.as_ref().map_or(0, |s| s.tracks().len());
        if tracks(old) != tracks(view) {
            changes.push(PeerChange::Media(name, tracks(view)));
        }
    }

    for (id, view) in prev {
        if !next.contains_key(id) {
            changes.push(PeerChange::Left(label(id, Some(view))));
        }
    }

    changes
}

impl fmt::Display for PeerChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PeerChange::Joined(name) => write!(f, "{} {}", "+".green().bold(), name.bold()),
            PeerChange::State(name, state) => {
                let state = match state {
                    PeerConnectionState::Connected => state.to_string().green(),
                    PeerConnectionState::Failed | PeerConnectionState::Disconnected => {
                        state.to_string().red()
                    }
                    _ => state.to_string().yellow(),
                };
                write!(f, "  {} is {}", name, state)
            }
            PeerChange::Hand(name, true) => write!(f, "✋ {} raised their hand", name.bold()),
            PeerChange::Hand(name, false) => write!(f, "   {} lowered their hand", name),
            PeerChange::Media(name, tracks) => {
                write!(f, "  {} is sending {} track(s)", name, tracks)
            }
            PeerChange::Left(name) => write!(f, "{} {}", "-".red().bold(), name),
        }
    }
}

/// Renders an event for the terminal, looking names up in `peers`.
pub fn describe_event(event: &ConferenceEvent, peers: &PeerTable) -> String {
    match event {
        ConferenceEvent::HostStatus(true) => "You are the host".cyan().bold().to_string(),
        ConferenceEvent::HostStatus(false) => "Joined the meeting".cyan().to_string(),
        ConferenceEvent::HandRaised(true) => "✋ Your hand is raised".to_string(),
        ConferenceEvent::HandRaised(false) => "Your hand is lowered".to_string(),
        ConferenceEvent::Chat(chat) => format!(
            "[{}] {}: {}",
            chat.time.dimmed(),
            chat.username.bold(),
            chat.text
        ),
        ConferenceEvent::Reaction(reaction) => {
            let from = label(&reaction.user_id, peers.get(&reaction.user_id));
            format!("{} {}", reaction.emoji, from.dimmed())
        }
        ConferenceEvent::MutedByHost => "The host asked you to mute".yellow().bold().to_string(),
        ConferenceEvent::Kicked => "You were removed by the host".red().bold().to_string(),
        ConferenceEvent::RoomEnded => "The host ended the meeting".red().bold().to_string(),
        ConferenceEvent::Disconnected => "Lost connection to the server".red().bold().to_string(),
        ConferenceEvent::Left => "You left the meeting".cyan().to_string(),
    }
}

pub fn describe_peers(peers: &PeerTable) -> String {
    if peers.is_empty() {
        return "Nobody else is here".dimmed().to_string();
    }
    peers
        .iter()
        .map(|(id, view)| {
            let hand = if view.hand_raised { " ✋" } else { "" };
            format!(
                "  {} ({}) {}{}",
                label(id, Some(view)).bold(),
                id,
                view.connection_state,
                hand
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
