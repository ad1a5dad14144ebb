mod errors;
mod target;
mod token_store;
mod types;

pub use errors::StorageError;
pub use types::{TargetSelector, TokenStore};
