use thiserror::Error;

use crate::token::TokenError;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("Token not found: {0}")]
    NotFound(String),

    /// The destination key already holds a different token
    #[error("Cannot rename {from} to {to}: key already holds a different token")]
    KeyConflict { from: String, to: String },

    /// `target set` named a key that is not in the store
    #[error("Unknown token: {0}")]
    UnknownToken(String),

    /// The target still names a key that has since been removed from the store
    #[error("Target {0} no longer exists in the token store")]
    StaleTarget(String),

    #[error("No target set")]
    NoTarget,

    #[error(transparent)]
    Token(#[from] TokenError),
}
