mod peer_transport;
mod rtc_transport;
mod session_description;
mod transport_event;

pub use peer_transport::*;
pub use rtc_transport::*;
pub use session_description::*;
pub use transport_event::*;
