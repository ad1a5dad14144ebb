use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// The raw bearer string was empty or whitespace only
    #[error("Empty token: a raw bearer string is required")]
    EmptyToken,

    /// The field cannot be changed on this kind of token
    #[error("{field} is not editable on {kind} tokens")]
    NotApplicable { field: &'static str, kind: &'static str },

    #[error("Invalid expiry '{0}': expected HHMM")]
    InvalidExpiry(String),

    #[error("Invalid principal '{0}': whitespace is not allowed")]
    InvalidPrincipal(String),

    /// `now + seconds` does not fit in a timestamp
    #[error("Expiry of {0} seconds is out of range")]
    ExpiryOutOfRange(i64),
}
