use axum::Json;
use http::{Result as HttpResponse, StatusCode};
use serde::Serialize;

use eviloauth::CaptureError;

/// JSON body returned by `/callback` and by failed `/hook` requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, serde::Deserialize)]
pub struct ApiReply {
    pub status: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
}

impl ApiReply {
    pub fn success(message: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            status: "success".to_string(),
            message: message.into(),
            data: Some(data.into()),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: message.into(),
            data: None,
        }
    }
}

/// Helper trait for converting errors to a standard response error format
pub trait IntoResponseError<T> {
    fn into_response_error(self) -> Result<T, (StatusCode, Json<ApiReply>)>;
}

/// Capture failures caused by the request are 400; failures of the IDP are 502.
impl<T> IntoResponseError<T> for Result<T, CaptureError> {
    fn into_response_error(self) -> Result<T, (StatusCode, Json<ApiReply>)> {
        self.map_err(|e| {
            let status = match &e {
                e if e.is_upstream() => StatusCode::BAD_GATEWAY,
                CaptureError::Token(_) => StatusCode::BAD_GATEWAY,
                CaptureError::NoToken
                | CaptureError::MissingCode
                | CaptureError::Denied(_)
                | CaptureError::Idp(_) => StatusCode::BAD_REQUEST,
            };
            tracing::warn!(status = %status, error = %e, "Capture request failed");
            (status, Json(ApiReply::error(e.to_string())))
        })
    }
}

/// Implementation for http::Error (used by Response::builder())
impl<T> IntoResponseError<T> for HttpResponse<T> {
    fn into_response_error(self) -> Result<T, (StatusCode, Json<ApiReply>)> {
        self.map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiReply::error(e.to_string())),
            )
        })
    }
}
