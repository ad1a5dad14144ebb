//! Central configuration for the eviloauth crate

use std::sync::LazyLock;

/// Authorization endpoint used when building IDP authorization URLs.
///
/// Default: Entra ID common v2.0 endpoint
pub static EVILOAUTH_AUTHORIZE_URL: LazyLock<String> = LazyLock::new(|| {
    std::env::var("EVILOAUTH_AUTHORIZE_URL").unwrap_or_else(|_| {
        "https://login.microsoftonline.com/common/oauth2/v2.0/authorize".to_string()
    })
});

/// Token endpoint used for authorization-code and refresh-token grants.
///
/// Default: Entra ID common v2.0 endpoint
pub static EVILOAUTH_TOKEN_URL: LazyLock<String> = LazyLock::new(|| {
    std::env::var("EVILOAUTH_TOKEN_URL")
        .unwrap_or_else(|_| "https://login.microsoftonline.com/common/oauth2/v2.0/token".to_string())
});

/// Base URL of the Microsoft Graph API used by the azure modules.
pub static EVILOAUTH_GRAPH_URL: LazyLock<String> = LazyLock::new(|| {
    std::env::var("EVILOAUTH_GRAPH_URL")
        .unwrap_or_else(|_| "https://graph.microsoft.com/v1.0".to_string())
});

/// Timeout applied to every outbound HTTP request, in seconds.
pub(crate) static EVILOAUTH_HTTP_TIMEOUT_SECS: LazyLock<u64> = LazyLock::new(|| {
    std::env::var("EVILOAUTH_HTTP_TIMEOUT_SECS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(30)
});
