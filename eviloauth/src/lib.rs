//! # eviloauth
//!
//! Core of an OAuth2.0 token capture console for authorized red-team engagements.
//!
//! Captured access tokens are classified as JWT or opaque and held in an
//! in-memory [`TokenStore`] under a stable key (`JWT-<upn>` or `OAT-<suffix>`).
//! An [`IdpSessionHolder`] builds the phishing authorization URL for the
//! implicit or code flow, and the [`Dispatcher`] turns console lines into
//! operations on that shared state, including running [`Module`]s against the
//! current target token.
//!
//! The HTTP capture surface lives in `eviloauth_axum`; this crate only exposes
//! the capture operations it calls.

mod capture;
pub mod config;
mod dispatcher;
mod idp;
mod module;
mod state;
mod storage;
mod token;
mod utils;

pub use capture::{
    CallbackPayload, CaptureError, CapturedCode, HookParams, capture_access_token,
    capture_authorization_code, final_destination,
};
pub use dispatcher::{Command, DispatchError, Dispatcher, IdpOverrides, Outcome, TokenField, VERBS};
pub use idp::{
    CodeFlowGrant, CodeFlowSecrets, IdpError, IdpKind, IdpSession, IdpSessionHolder, IdpSettings,
    TokenResponse, exchange_code_for_token, refresh_access_token,
};
pub use module::{Module, ModuleError, ModuleRegistry, ReadMail, builtin_modules};
pub use state::SharedState;
pub use storage::{StorageError, TargetSelector, TokenStore};
pub use token::{Expiry, Token, TokenError, TokenKind, parse_expiry_hhmm};
pub use utils::{UtilError, gen_random_string};
