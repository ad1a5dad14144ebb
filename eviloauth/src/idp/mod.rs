mod errors;
mod main;
mod types;

pub use errors::IdpError;
pub use main::{exchange_code_for_token, refresh_access_token};
pub use types::{
    CodeFlowGrant, CodeFlowSecrets, IdpKind, IdpSession, IdpSessionHolder, IdpSettings,
    TokenResponse,
};
