// HTTP error handling
//
// Every lookup failure is reported as 400 with a `reason` code; callers
// must branch on `reason`, not on the status.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use nicometa_providers::NicovideoError;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;

/// Result type for HTTP handlers
pub type ApiResult<T> = Result<T, ApiError>;

/// Message used for rejected video ids
pub const INVALID_ID_MESSAGE: &str = "Invalid ID";

#[derive(Debug)]
pub struct ApiError(NicovideoError);

impl ApiError {
    pub fn invalid_id(raw: impl Into<String>) -> Self {
        Self(NicovideoError::InvalidIdentifier(raw.into()))
    }

    #[must_use]
    pub const fn inner(&self) -> &NicovideoError {
        &self.0
    }
}

impl From<NicovideoError> for ApiError {
    fn from(err: NicovideoError) -> Self {
        Self(err)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for ApiError {}

/// Error response JSON structure
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl From<NicovideoError> for ErrorEnvelope {
    fn from(err: NicovideoError) -> Self {
        let reason = err.reason().to_string();
        match err {
            NicovideoError::InvalidIdentifier(_) => Self {
                reason,
                url: None,
                data: None,
                message: Some(INVALID_ID_MESSAGE.to_string()),
            },
            NicovideoError::FetchFailed { url, status, body } => Self {
                reason,
                url: Some(url),
                data: Some(json!({ "status": status, "body": body })),
                message: None,
            },
            NicovideoError::InvalidResponse { url, issues } => Self {
                reason,
                url: Some(url),
                data: Some(json!({ "issues": issues })),
                message: None,
            },
            other @ (NicovideoError::ResponseTooLarge { .. } | NicovideoError::Client(_)) => Self {
                reason,
                url: None,
                data: None,
                message: Some(other.to_string()),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self.0 {
            NicovideoError::InvalidIdentifier(raw) => {
                tracing::debug!(video_id = %raw, "Rejected invalid video id");
            }
            err => tracing::warn!(reason = err.reason(), error = %err, "Video lookup failed"),
        }

        (StatusCode::BAD_REQUEST, Json(ErrorEnvelope::from(self.0))).into_response()
    }
}
