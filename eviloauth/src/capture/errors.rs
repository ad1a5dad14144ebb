use thiserror::Error;

use crate::idp::IdpError;
use crate::token::TokenError;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CaptureError {
    #[error("No token provided")]
    NoToken,

    #[error("No authorization code provided")]
    MissingCode,

    /// The IDP redirected back with an error instead of a code
    #[error("Authorization denied by IDP: {0}")]
    Denied(String),

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    Idp(#[from] IdpError),
}
