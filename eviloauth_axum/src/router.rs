//! Router for the capture listener

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::LatencyUnit;
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;

use eviloauth::SharedState;

use super::handlers;

/// Create the capture router with HTTP request tracing
///
/// Endpoints:
/// - `GET /` landing page linking to the current authorization URL
/// - `GET /redirect` implicit-flow redirect target (with `/redirect.js`)
/// - `POST /callback` receives the access token forwarded by the redirect page
/// - `GET /hook` code-flow redirect target, redeems the authorization code
pub fn capture_router(state: SharedState) -> Router {
    capture_router_no_trace(state).layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_request(DefaultOnRequest::new().level(Level::INFO))
            .on_response(
                DefaultOnResponse::new()
                    .level(Level::INFO)
                    .latency_unit(LatencyUnit::Millis),
            ),
    )
}

/// Same routes as [`capture_router`] without the tracing layer.
pub fn capture_router_no_trace(state: SharedState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/redirect", get(handlers::redirect))
        .route("/redirect.js", get(handlers::redirect_js))
        .route("/callback", post(handlers::callback))
        .route("/hook", get(handlers::hook))
        .with_state(state)
}
