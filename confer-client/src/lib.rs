mod conference;
mod config;
mod error;
mod manager;
mod media;
mod peer;
mod signaling;
mod transport;

pub use conference::*;
pub use config::*;
pub use error::*;
pub use manager::*;
pub use media::*;
pub use peer::*;
pub use signaling::*;
pub use transport::*;
