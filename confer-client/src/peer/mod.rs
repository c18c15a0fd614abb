mod peer_state;
mod peer_view;
mod remote_stream;

pub use peer_state::*;
pub use peer_view::*;
pub use remote_stream::*;
