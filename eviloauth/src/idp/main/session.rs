use sha2::{Digest, Sha256};
use url::Url;

use crate::idp::errors::IdpError;
use crate::idp::types::{
    CodeFlowGrant, CodeFlowSecrets, IdpKind, IdpSession, IdpSessionHolder, IdpSettings,
};
use crate::utils::{base64url_encode, gen_random_string};

impl CodeFlowSecrets {
    pub(crate) fn generate() -> Result<Self, IdpError> {
        let state = gen_random_string(16)?;
        let code_verifier = gen_random_string(32)?;
        let code_challenge = base64url_encode(Sha256::digest(code_verifier.as_bytes()));
        Ok(Self {
            state,
            code_verifier,
            code_challenge,
        })
    }
}

impl IdpSession {
    /// Build the authorization URL and per-session secrets for `kind`.
    pub fn new(kind: IdpKind, settings: &IdpSettings) -> Result<Self, IdpError> {
        let client_id = settings
            .client_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| IdpError::MissingClientId(kind.to_string()))?
            .to_string();

        let redirect_uri = format!(
            "https://{}{}",
            settings.redirect_server.trim_end_matches('/'),
            kind.redirect_path()
        );

        let mut params = vec![
            ("client_id", client_id.clone()),
            ("scope", settings.scope.clone()),
            ("response_type", kind.response_type().to_string()),
            ("redirect_uri", redirect_uri.clone()),
        ];

        let code_flow = match kind {
            IdpKind::EntraImplicitFlow => None,
            IdpKind::EntraCodeFlow => {
                let secrets = CodeFlowSecrets::generate()?;
                params.push(("state", secrets.state.clone()));
                params.push(("code_challenge", secrets.code_challenge.clone()));
                params.push(("code_challenge_method", "S256".to_string()));
                Some(secrets)
            }
        };

        let url = Url::parse_with_params(&settings.authorize_url, &params)
            .map_err(|e| IdpError::Url(e.to_string()))?
            .to_string();

        tracing::debug!("Authorization URL: {}", url);

        Ok(Self {
            kind,
            client_id,
            scope: settings.scope.clone(),
            final_destination: settings.final_destination.clone(),
            redirect_uri,
            token_url: settings.token_url.clone(),
            url,
            code_flow,
            consumed: false,
        })
    }

    pub fn is_consumed(&self) -> bool {
        self.consumed
    }
}

impl IdpSessionHolder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the current session with a fresh one and return its URL.
    ///
    /// On failure the previous session, if any, stays in place.
    pub async fn configure(&self, kind: IdpKind, settings: &IdpSettings) -> Result<String, IdpError> {
        let session = IdpSession::new(kind, settings)?;
        let url = session.url.clone();
        *self.inner.write().await = Some(session);
        tracing::info!(idp = %kind, "IDP session configured");
        Ok(url)
    }

    /// Authorization URL of the most recent session.
    pub async fn url(&self) -> Option<String> {
        self.inner.read().await.as_ref().map(|s| s.url.clone())
    }

    pub async fn session(&self) -> Option<IdpSession> {
        self.inner.read().await.clone()
    }

    pub async fn kind(&self) -> Option<IdpKind> {
        self.inner.read().await.as_ref().map(|s| s.kind)
    }

    pub async fn final_destination(&self) -> Option<String> {
        self.inner
            .read()
            .await
            .as_ref()
            .map(|s| s.final_destination.clone())
    }

    /// Hand out the code-flow verifier for `state`, once.
    ///
    /// A state mismatch does not consume the session.
    pub async fn take_code_flow(&self, state: &str) -> Result<CodeFlowGrant, IdpError> {
        let mut guard = self.inner.write().await;
        let session = guard.as_mut().ok_or(IdpError::NotConfigured)?;
        let secrets = session.code_flow.as_ref().ok_or(IdpError::NotCodeFlow)?;

        if secrets.state != state {
            tracing::warn!("State mismatch on code-flow hook");
            return Err(IdpError::StateMismatch);
        }
        if session.consumed {
            return Err(IdpError::SessionConsumed);
        }

        let grant = CodeFlowGrant {
            client_id: session.client_id.clone(),
            scope: session.scope.clone(),
            redirect_uri: session.redirect_uri.clone(),
            token_url: session.token_url.clone(),
            code_verifier: secrets.code_verifier.clone(),
            final_destination: session.final_destination.clone(),
        };
        session.consumed = true;
        Ok(grant)
    }
}
