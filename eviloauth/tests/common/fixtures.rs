use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use eviloauth::{Dispatcher, IdpSettings, Module, ModuleRegistry, Outcome, SharedState};
use std::sync::Arc;

pub const REDIRECT_SERVER: &str = "phish.test:8443";
pub const CLIENT_ID: &str = "00000000-aaaa-bbbb-cccc-000000000000";

/// Unsigned three-segment token whose payload is `claims`.
pub fn jwt_with_claims(claims: serde_json::Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"RS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("{header}.{payload}.c2lnbmF0dXJl")
}

/// Defaults an operator would pass on the command line, pointed at `token_url`.
pub fn idp_defaults(token_url: &str) -> IdpSettings {
    let mut settings = IdpSettings::new(REDIRECT_SERVER);
    settings.client_id = Some(CLIENT_ID.to_string());
    settings.scope = "openid offline_access Mail.Read".to_string();
    settings.final_destination = "https://www.office.com".to_string();
    settings.authorize_url = "https://login.test/common/oauth2/v2.0/authorize".to_string();
    settings.token_url = token_url.to_string();
    settings
}

pub async fn dispatcher_with(
    state: SharedState,
    modules: Vec<Arc<dyn Module>>,
    defaults: IdpSettings,
) -> Dispatcher {
    Dispatcher::new(state, ModuleRegistry::load(modules).await, defaults)
}

/// Run a console line that is expected to succeed and return its text.
pub async fn console(dispatcher: &Dispatcher, line: &str) -> String {
    match dispatcher.dispatch(line).await {
        Ok(Outcome::Continue(text)) => text,
        Ok(Outcome::Exit) => panic!("{line:?} exited the console"),
        Err(e) => panic!("{line:?} failed: {e}"),
    }
}
