use anyhow::{Result, bail};
use confer_client::PeerTable;
use confer_core::UserId;

/// One line typed by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Hand,
    React(String),
    Kick(String),
    Mute(String),
    End,
    Leave,
    Peers,
    Help,
    Chat(String),
}

pub const HELP: &str = "\
/hand             raise or lower your hand
/react <emoji>    send a reaction
/kick <user>      remove a participant (host only)
/mute <user>      ask a participant to mute (host only)
/end              end the meeting for everyone (host only)
/peers            list participants
/leave            leave the meeting
<text>            send a chat message";

/// Parses a line from stdin. Blank lines yield `None`.
pub fn parse(line: &str) -> Result<Option<Input>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let Some(command) = line.strip_prefix('/') else {
        return Ok(Some(Input::Chat(line.to_owned())));
    };

    let (name, arg) = match command.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (command, ""),
    };

    let input = match (name, arg) {
        ("hand", _) => Input::Hand,
        ("end", _) => Input::End,
        ("leave" | "quit", _) => Input::Leave,
        ("peers", _) => Input::Peers,
        ("help", _) => Input::Help,
        ("react" | "kick" | "mute", "") => bail!("/{} needs an argument", name),
        ("react", emoji) => Input::React(emoji.to_owned()),
        ("kick", user) => Input::Kick(user.to_owned()),
        ("mute", user) => Input::Mute(user.to_owned()),
        _ => bail!("Unknown command '/{}', try /help", name),
    };
    Ok(Some(input))
}

/// Finds a participant by id, id prefix or display name.
pub fn resolve_user(peers: &PeerTable, query: &str) -> Result<UserId> {
    if let Ok(id) = query.parse::<UserId>() {
        return Ok(id);
    }

    let matches: Vec<UserId> = peers
        .iter()
        .filter(|(id, view)| {
            view.display_name.as_deref() == Some(query) || id.to_string().starts_with(query)
        })
        .map(|(id, _)| *id)
        .collect();

    match matches.as_slice() {
        [id] => Ok(*id),
        [] => bail!("No participant matches '{}'", query),
        _ => bail!("'{}' matches {} participants, use the id", query, matches.len()),
    }
}
