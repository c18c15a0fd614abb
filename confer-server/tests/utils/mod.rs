pub mod relay_helpers;

pub use mock_signaling::*;
pub use relay_helpers::*;
pub use test_client::*;
