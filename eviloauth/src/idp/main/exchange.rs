use crate::idp::errors::IdpError;
use crate::idp::types::{CodeFlowGrant, TokenResponse};
use crate::utils::get_client;

/// Redeem an authorization code at the session's token endpoint.
pub async fn exchange_code_for_token(
    grant: &CodeFlowGrant,
    code: &str,
) -> Result<TokenResponse, IdpError> {
    let client = get_client()?;
    let response = client
        .post(grant.token_url.as_str())
        .form(&[
            ("client_id", grant.client_id.as_str()),
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", grant.redirect_uri.as_str()),
            ("code_verifier", grant.code_verifier.as_str()),
            ("scope", grant.scope.as_str()),
        ])
        .send()
        .await
        .map_err(|e| IdpError::TokenExchange(e.to_string()))?;

    match response.status() {
        reqwest::StatusCode::OK => {
            tracing::debug!("Token Exchange Response: {:#?}", response);
        }
        status => {
            let body = response.text().await.unwrap_or_default();
            tracing::debug!("Token Exchange error body: {}", body);
            return Err(IdpError::TokenExchange(status.to_string()));
        }
    };

    let response_body = response
        .text()
        .await
        .map_err(|e| IdpError::TokenExchange(e.to_string()))?;
    serde_json::from_str(&response_body).map_err(|e| IdpError::TokenExchange(e.to_string()))
}

/// Trade a refresh token for a new access token.
pub async fn refresh_access_token(
    token_url: &str,
    client_id: &str,
    scope: &str,
    refresh_token: &str,
) -> Result<TokenResponse, IdpError> {
    let client = get_client()?;
    tracing::info!("Refreshing access token");
    let response = client
        .post(token_url)
        .form(&[
            ("client_id", client_id),
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("scope", scope),
        ])
        .send()
        .await
        .map_err(|e| IdpError::Refresh(e.to_string()))?;

    if !response.status().is_success() {
        return Err(IdpError::Refresh(response.status().to_string()));
    }

    response
        .json::<TokenResponse>()
        .await
        .map_err(|e| IdpError::Refresh(e.to_string()))
}
