use serde::Deserialize;
use serde_json::Value;

/// JSON body posted to `/callback` by the redirect page.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CallbackPayload {
    /// Kept loose so a non-string value is reported as "no token" rather than a parse failure
    #[serde(default)]
    pub access_token: Option<Value>,
}

impl CallbackPayload {
    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_ref().and_then(Value::as_str)
    }
}

/// Query string the IDP appends when redirecting to `/hook`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HookParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

/// Result of a redeemed authorization code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedCode {
    pub key: String,
    pub final_destination: String,
}
