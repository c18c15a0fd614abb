mod conference_event;
mod manager_command;
mod peer_manager;
mod peer_session;

pub use conference_event::*;
pub use manager_command::*;
pub use peer_manager::*;
