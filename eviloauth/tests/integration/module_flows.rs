use crate::common::*;
use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::get,
};
use eviloauth::{DispatchError, Module, ReadMail, SharedState, capture_access_token};
use serde_json::json;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Graph stand-in that counts requests and only serves the expected bearer.
async fn graph_server(expected_bearer: &'static str) -> (String, Arc<AtomicUsize>) {
    let hits = Arc::new(AtomicUsize::new(0));
    let router = Router::new()
        .route(
            "/me/messages",
            get(
                move |State(hits): State<Arc<AtomicUsize>>, headers: HeaderMap| async move {
                    hits.fetch_add(1, Ordering::SeqCst);
                    let authorized = headers
                        .get("authorization")
                        .and_then(|v| v.to_str().ok())
                        .is_some_and(|v| v == format!("Bearer {expected_bearer}"));
                    if !authorized {
                        return (
                            StatusCode::UNAUTHORIZED,
                            Json(json!({"error": "InvalidAuthenticationToken"})),
                        );
                    }
                    (
                        StatusCode::OK,
                        Json(json!({
                            "value": [{
                                "subject": "Q3 numbers",
                                "bodyPreview": "See attached",
                                "from": {"emailAddress": {"name": "CFO", "address": "cfo@corp.test"}},
                                "toRecipients": [{"emailAddress": {"address": "alice@corp.test"}}],
                            }]
                        })),
                    )
                },
            ),
        )
        .with_state(hits.clone());
    (spawn_mock_server(router).await, hits)
}

fn read_mail(graph_url: &str) -> Vec<Arc<dyn Module>> {
    vec![Arc::new(ReadMail::with_graph_url(graph_url))]
}

#[tokio::test]
async fn test_module_without_target_makes_no_call() {
    let (graph_url, hits) = graph_server("unused").await;
    let state = SharedState::new();
    let dispatcher = dispatcher_with(state.clone(), read_mail(&graph_url), idp_defaults("http://unused")).await;
    capture_access_token(&state, Some("plainstring1234567890")).await.unwrap();

    let error = dispatcher
        .dispatch("module azure read_mail")
        .await
        .unwrap_err();

    assert!(matches!(error, DispatchError::Precondition(_)));
    assert_eq!(hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_read_mail_uses_target_bearer() {
    // Given a captured token set as the target
    let (graph_url, hits) = graph_server("plainstring1234567890").await;
    let state = SharedState::new();
    let dispatcher = dispatcher_with(state.clone(), read_mail(&graph_url), idp_defaults("http://unused")).await;
    capture_access_token(&state, Some("plainstring1234567890")).await.unwrap();
    console(&dispatcher, "target set OAT-1234567890").await;

    // When the module runs
    let report = console(&dispatcher, "module azure read_mail 5").await;

    // Then Graph saw the raw bearer and the mail is reported
    assert_eq!(hits.load(Ordering::SeqCst), 1);
    assert!(report.starts_with("Fetched 1 message(s)"));
    assert!(report.contains("Q3 numbers"));
    assert!(report.contains("cfo@corp.test"));
}

#[tokio::test]
async fn test_read_mail_rejected_token_is_module_error() {
    let (graph_url, _hits) = graph_server("someone-else").await;
    let state = SharedState::new();
    let dispatcher = dispatcher_with(state.clone(), read_mail(&graph_url), idp_defaults("http://unused")).await;
    capture_access_token(&state, Some("plainstring1234567890")).await.unwrap();
    console(&dispatcher, "target set OAT-1234567890").await;

    let error = dispatcher
        .dispatch("module azure read_mail")
        .await
        .unwrap_err();

    assert_eq!(
        error,
        DispatchError::ModuleExecution {
            module: "azure.read_mail".to_string(),
            message: "Unexpected response status: 401 Unauthorized".to_string(),
        }
    );
}

#[tokio::test]
async fn test_target_removed_outside_console_is_stale() {
    let (graph_url, hits) = graph_server("plainstring1234567890").await;
    let state = SharedState::new();
    let dispatcher = dispatcher_with(state.clone(), read_mail(&graph_url), idp_defaults("http://unused")).await;
    capture_access_token(&state, Some("plainstring1234567890")).await.unwrap();
    console(&dispatcher, "target set OAT-1234567890").await;

    state.tokens.delete("OAT-1234567890").await;

    assert_eq!(
        dispatcher.dispatch("module azure read_mail").await,
        Err(DispatchError::StaleTarget("OAT-1234567890".to_string()))
    );
    assert_eq!(hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_unknown_module_with_target() {
    let state = SharedState::new();
    let dispatcher = dispatcher_with(state.clone(), eviloauth::builtin_modules(), idp_defaults("http://unused")).await;
    capture_access_token(&state, Some("plainstring1234567890")).await.unwrap();
    console(&dispatcher, "target set OAT-1234567890").await;

    assert_eq!(
        dispatcher.dispatch("module gcp list_buckets").await,
        Err(DispatchError::NotFound {
            resource: "Module".to_string(),
            id: "gcp.list_buckets".to_string(),
        })
    );
}
