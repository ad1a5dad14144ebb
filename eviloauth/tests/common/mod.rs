pub mod fixtures;
pub mod mock_server;

pub use fixtures::*;
pub use mock_server::spawn_mock_server;
