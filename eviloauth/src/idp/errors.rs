use thiserror::Error;

use crate::utils::UtilError;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IdpError {
    #[error("IDP {name} is not supported. Supported IDPs: {supported}")]
    Unsupported { name: String, supported: String },

    #[error("No client id configured for {0}")]
    MissingClientId(String),

    #[error("IDP not configured yet")]
    NotConfigured,

    #[error("The configured IDP does not use the authorization code flow")]
    NotCodeFlow,

    #[error("State parameter does not match the configured session")]
    StateMismatch,

    #[error("IDP session already consumed")]
    SessionConsumed,

    #[error("Token exchange error: {0}")]
    TokenExchange(String),

    #[error("Token refresh error: {0}")]
    Refresh(String),

    #[error("Invalid URL: {0}")]
    Url(String),

    #[error("Utils error: {0}")]
    Utils(String),
}

impl From<UtilError> for IdpError {
    fn from(err: UtilError) -> Self {
        Self::Utils(err.to_string())
    }
}
