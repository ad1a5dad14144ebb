use askama::Template;
use axum::{
    Json,
    extract::{Query, State, rejection::JsonRejection},
    http::{StatusCode, header::CONTENT_TYPE},
    response::{Html, Redirect, Response},
};

use eviloauth::{
    CallbackPayload, HookParams, SharedState, capture_access_token, capture_authorization_code,
    final_destination,
};

use crate::error::{ApiReply, IntoResponseError};

#[derive(Template)]
#[template(path = "index.j2")]
struct IndexTemplate {
    authorize_url: Option<String>,
}

#[derive(Template)]
#[template(path = "redirect.j2")]
struct RedirectTemplate {
    final_destination: String,
}

fn render(template: &impl Template) -> Result<Html<String>, (StatusCode, Json<ApiReply>)> {
    template.render().map(Html).map_err(|e| {
        tracing::error!("Template rendering failed: {}", e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiReply::error(e.to_string())),
        )
    })
}

pub(super) async fn index(
    State(state): State<SharedState>,
) -> Result<Html<String>, (StatusCode, Json<ApiReply>)> {
    render(&IndexTemplate {
        authorize_url: state.idp.url().await,
    })
}

/// Implicit-flow landing page. The token sits in the URL fragment, which only the
/// browser sees, so the page script forwards it to `/callback`.
pub(super) async fn redirect(
    State(state): State<SharedState>,
) -> Result<Html<String>, (StatusCode, Json<ApiReply>)> {
    render(&RedirectTemplate {
        final_destination: final_destination(&state).await,
    })
}

pub(super) async fn redirect_js() -> Result<Response, (StatusCode, Json<ApiReply>)> {
    let js_content = include_str!("../static/redirect.js");
    Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, "application/javascript")
        .body(js_content.to_string().into())
        .into_response_error()
}

pub(super) async fn callback(
    State(state): State<SharedState>,
    payload: Result<Json<CallbackPayload>, JsonRejection>,
) -> Result<Json<ApiReply>, (StatusCode, Json<ApiReply>)> {
    let payload = payload.map(|Json(p)| p).unwrap_or_else(|rejection| {
        tracing::debug!("Unreadable callback body: {}", rejection);
        CallbackPayload::default()
    });

    let key = capture_access_token(&state, payload.access_token())
        .await
        .into_response_error()?;
    Ok(Json(ApiReply::success("Token received", key)))
}

pub(super) async fn hook(
    State(state): State<SharedState>,
    Query(params): Query<HookParams>,
) -> Result<Redirect, (StatusCode, Json<ApiReply>)> {
    let captured = capture_authorization_code(&state, &params)
        .await
        .into_response_error()?;
    Ok(Redirect::to(&captured.final_destination))
}
