pub mod mock_signaling;

pub use mock_signaling::*;
pub use mock_transport::*;
pub use test_manager::*;
