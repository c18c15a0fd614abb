mod relay_command;
mod signaling_relay;

pub use relay_command::*;
pub use signaling_relay::*;
