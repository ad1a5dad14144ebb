use crate::common::*;
use axum::{Form, Json, Router, routing::post};
use eviloauth::{DispatchError, Outcome, SharedState, capture_access_token};
use serde_json::json;
use std::collections::HashMap;

#[tokio::test]
async fn test_unsupported_idp_leaves_url_unconfigured() {
    let dispatcher = dispatcher_with(SharedState::new(), vec![], idp_defaults("http://unused")).await;

    let error = dispatcher
        .dispatch("idp configure unsupported_name")
        .await
        .unwrap_err();

    assert_eq!(
        error,
        DispatchError::UnsupportedIdp {
            name: "unsupported_name".to_string(),
            supported: "entra_implicit_flow, entra_code_flow".to_string(),
        }
    );
    let url_error = dispatcher.dispatch("url").await.unwrap_err();
    assert!(url_error.to_string().contains("not configured"));
}

#[tokio::test]
async fn test_failed_configure_keeps_previous_session() {
    let dispatcher = dispatcher_with(SharedState::new(), vec![], idp_defaults("http://unused")).await;
    console(&dispatcher, "idp configure entra_implicit_flow").await;
    let before = console(&dispatcher, "url").await;

    assert!(dispatcher.dispatch("idp configure okta").await.is_err());

    assert_eq!(console(&dispatcher, "url").await, before);
}

#[tokio::test]
async fn test_operator_session_walkthrough() {
    // Given a captured opaque token
    let state = SharedState::new();
    let dispatcher = dispatcher_with(state.clone(), vec![], idp_defaults("http://unused")).await;
    capture_access_token(&state, Some("EwBwA8l6BAAUopaque9876543210"))
        .await
        .unwrap();

    // When the operator targets it, then names the victim
    console(&dispatcher, "target set OAT-9876543210").await;
    console(&dispatcher, "tokens set OAT-9876543210 upn alice@corp.test").await;
    console(&dispatcher, "tokens set OAT-alice@corp.test scope Mail.Read Files.Read").await;
    console(&dispatcher, "tokens set OAT-alice@corp.test expiry 0045").await;

    // Then the key, the target and the details all reflect the edits
    assert_eq!(
        console(&dispatcher, "tokens list").await,
        "Available token keys:\nOAT-alice@corp.test"
    );
    assert_eq!(
        console(&dispatcher, "target list").await,
        "Current target: OAT-alice@corp.test"
    );
    let details = console(&dispatcher, "tokens list OAT-alice@corp.test").await;
    assert!(details.contains("User Principal Name (UPN): alice@corp.test"));
    assert!(details.contains("Scope: Mail.Read Files.Read"));
    assert!(details.contains("Expiry: 00:4"));
    assert!(details.contains("Raw Token: EwBwA8l6BAAUopaque9876543210"));
}

#[tokio::test]
async fn test_rename_onto_other_token_is_conflict() {
    let state = SharedState::new();
    let dispatcher = dispatcher_with(state.clone(), vec![], idp_defaults("http://unused")).await;
    capture_access_token(&state, Some("first-opaque-aaaaaaaaaa")).await.unwrap();
    capture_access_token(&state, Some("second-opaque-bbbbbbbbbb")).await.unwrap();
    console(&dispatcher, "tokens set OAT-aaaaaaaaaa upn bob").await;

    let error = dispatcher
        .dispatch("tokens set OAT-bbbbbbbbbb upn bob")
        .await
        .unwrap_err();

    assert_eq!(
        error,
        DispatchError::KeyConflict {
            from: "OAT-bbbbbbbbbb".to_string(),
            to: "OAT-bob".to_string(),
        }
    );
    assert_eq!(
        state.tokens.list().await,
        vec!["OAT-bob".to_string(), "OAT-bbbbbbbbbb".to_string()]
    );
}

#[tokio::test]
async fn test_refresh_stores_new_access_token() {
    // Given a token endpoint that issues a fresh opaque token
    let router = Router::new().route(
        "/token",
        post(|Form(form): Form<HashMap<String, String>>| async move {
            assert_eq!(form["grant_type"], "refresh_token");
            assert_eq!(form["refresh_token"], "0.AAAA-refresh");
            Json(json!({
                "token_type": "Bearer",
                "expires_in": 3600,
                "access_token": "EwB-refreshed-token-RRRRRRRRRR",
            }))
        }),
    );
    let token_url = format!("{}/token", spawn_mock_server(router).await);
    let state = SharedState::new();
    let dispatcher = dispatcher_with(state.clone(), vec![], idp_defaults(&token_url)).await;

    // And a stored token that carries a refresh token
    let token = eviloauth::Token::parse("EwB-original-token-OOOOOOOOOO")
        .unwrap()
        .with_refresh_token(Some("0.AAAA-refresh".to_string()));
    state.tokens.add(token).await;
    console(&dispatcher, "idp configure entra_code_flow").await;

    // When the operator refreshes it
    let text = console(&dispatcher, "tokens refresh OAT-OOOOOOOOOO").await;

    // Then the new token is stored next to the old one and keeps the refresh token
    assert!(text.ends_with("OAT-RRRRRRRRRR"));
    let refreshed = state.tokens.get("OAT-RRRRRRRRRR").await.unwrap();
    assert_eq!(refreshed.refresh_token(), Some("0.AAAA-refresh"));
    assert!(state.tokens.contains("OAT-OOOOOOOOOO").await);
}

#[tokio::test]
async fn test_refresh_rejected_is_external_service_error() {
    let router = Router::new().route(
        "/token",
        post(|| async { (axum::http::StatusCode::UNAUTHORIZED, "invalid_grant") }),
    );
    let token_url = format!("{}/token", spawn_mock_server(router).await);
    let state = SharedState::new();
    let dispatcher = dispatcher_with(state.clone(), vec![], idp_defaults(&token_url)).await;
    let token = eviloauth::Token::parse("EwB-original-token-OOOOOOOOOO")
        .unwrap()
        .with_refresh_token(Some("revoked".to_string()));
    state.tokens.add(token).await;
    console(&dispatcher, "idp configure entra_code_flow").await;

    let error = dispatcher
        .dispatch("tokens refresh OAT-OOOOOOOOOO")
        .await
        .unwrap_err();

    assert!(matches!(error, DispatchError::ExternalService(_)));
    assert_eq!(state.tokens.len().await, 1);
}

#[tokio::test]
async fn test_errors_do_not_end_the_session() {
    let dispatcher = dispatcher_with(SharedState::new(), vec![], idp_defaults("http://unused")).await;

    for line in ["frobnicate", "tokens explode", "tokens delete", "target set nope", "help nope"] {
        assert!(dispatcher.dispatch(line).await.is_err(), "{line:?}");
    }

    assert_eq!(dispatcher.dispatch("exit").await, Ok(Outcome::Exit));
}

/// Captures from the listener and console edits interleave without losing entries.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_capture_while_console_edits() {
    let state = SharedState::new();
    let dispatcher = dispatcher_with(state.clone(), vec![], idp_defaults("http://unused")).await;
    capture_access_token(&state, Some("console-owned-CCCCCCCCCC"))
        .await
        .unwrap();

    let capture_state = state.clone();
    let listener = tokio::spawn(async move {
        for i in 0..50 {
            let raw = format!("captured-token-{i:010}");
            capture_access_token(&capture_state, Some(&raw)).await.unwrap();
        }
    });
    let console_task = tokio::spawn(async move {
        for i in 0..25 {
            let (from, to) = if i % 2 == 0 {
                ("OAT-CCCCCCCCCC", "even")
            } else {
                ("OAT-even", "CCCCCCCCCC")
            };
            console(&dispatcher, &format!("tokens set {from} upn {to}")).await;
        }
    });
    listener.await.unwrap();
    console_task.await.unwrap();

    assert_eq!(state.tokens.len().await, 51);
    assert!(state.tokens.contains("OAT-even").await);
}
