//! Error types for console command dispatch

use thiserror::Error;

use crate::idp::IdpError;
use crate::storage::StorageError;
use crate::token::TokenError;

/// Every failure a console command can report.
///
/// All variants are non-fatal: the console prints the message and reads the next line.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// Malformed input value, such as an empty raw token or a bad `HHMM`
    #[error("Invalid value: {0}")]
    Validation(String),

    #[error("{resource} not found: {id}")]
    NotFound { resource: String, id: String },

    #[error("IDP {name} is not supported. Supported IDPs: {supported}")]
    UnsupportedIdp { name: String, supported: String },

    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error("Unknown subcommand for '{verb}': {sub}")]
    UnknownSubcommand { verb: String, sub: String },

    /// The command is well-formed but its prerequisites are not met
    #[error("{0}")]
    Precondition(String),

    #[error("Target {0} no longer exists. Pick another with 'target set <token_key>'")]
    StaleTarget(String),

    #[error("Module {module} failed: {message}")]
    ModuleExecution { module: String, message: String },

    #[error("External service error: {0}")]
    ExternalService(String),

    /// Wrong number of arguments for a known command
    #[error("Usage: {0}")]
    Usage(String),

    #[error("Cannot rename {from} to {to}: key already holds a different token")]
    KeyConflict { from: String, to: String },

    #[error("{0}")]
    NotApplicable(String),
}

impl DispatchError {
    /// Log the error and return self
    pub fn log(self) -> Self {
        match &self {
            Self::ModuleExecution { module, message } => {
                tracing::error!("Module {} failed: {}", module, message)
            }
            Self::ExternalService(msg) => tracing::error!("External service error: {}", msg),
            Self::StaleTarget(key) => tracing::warn!("Stale target: {}", key),
            Self::KeyConflict { from, to } => tracing::warn!("Key conflict: {} -> {}", from, to),
            other => tracing::debug!("Command failed: {}", other),
        }
        self
    }

    pub(crate) fn token_not_found(key: &str) -> Self {
        Self::NotFound {
            resource: "Token".to_string(),
            id: key.to_string(),
        }
    }
}

impl From<TokenError> for DispatchError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::NotApplicable { .. } => Self::NotApplicable(err.to_string()),
            TokenError::EmptyToken
            | TokenError::InvalidExpiry(_)
            | TokenError::InvalidPrincipal(_)
            | TokenError::ExpiryOutOfRange(_) => Self::Validation(err.to_string()),
        }
    }
}

impl From<StorageError> for DispatchError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(key) | StorageError::UnknownToken(key) => {
                Self::token_not_found(&key)
            }
            StorageError::KeyConflict { from, to } => Self::KeyConflict { from, to },
            StorageError::StaleTarget(key) => Self::StaleTarget(key),
            StorageError::NoTarget => Self::Precondition(
                "No target set. Use 'target set <token_key>' first".to_string(),
            ),
            StorageError::Token(err) => err.into(),
        }
    }
}

impl From<IdpError> for DispatchError {
    fn from(err: IdpError) -> Self {
        match err {
            IdpError::Unsupported { name, supported } => Self::UnsupportedIdp { name, supported },
            IdpError::TokenExchange(_) | IdpError::Refresh(_) | IdpError::Utils(_) => {
                Self::ExternalService(err.to_string())
            }
            IdpError::Url(_) => Self::Validation(err.to_string()),
            IdpError::MissingClientId(_)
            | IdpError::NotConfigured
            | IdpError::NotCodeFlow
            | IdpError::StateMismatch
            | IdpError::SessionConsumed => Self::Precondition(err.to_string()),
        }
    }
}
