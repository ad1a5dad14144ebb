mod errors;
mod parse;
mod types;

pub use errors::TokenError;
pub use types::{Expiry, Token, TokenKind, parse_expiry_hhmm};
