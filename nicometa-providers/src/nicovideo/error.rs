//! niconico lookup error types
//!
//! One variant per pipeline failure category. Every variant is terminal
//! for the request that produced it.

use thiserror::Error;

use super::schema::ValidationIssue;

/// Maximum response body size for upstream calls (16 MB).
pub const MAX_RESPONSE_SIZE: usize = 16 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum NicovideoError {
    /// The caller-supplied id does not look like `sm123` / `nm123`
    #[error("Invalid video id: {0:?}")]
    InvalidIdentifier(String),

    /// Upstream answered with a non-success status, or every attempt failed
    /// at the transport level (`status` is `None` in that case).
    #[error("Upstream fetch failed for {url} (status {})", display_status(.status))]
    FetchFailed {
        url: String,
        status: Option<u16>,
        body: serde_json::Value,
    },

    /// Upstream answered successfully but the body broke the expected schema
    #[error("Invalid upstream response from {url}: {} issue(s)", .issues.len())]
    InvalidResponse {
        url: String,
        issues: Vec<ValidationIssue>,
    },

    #[error("Response too large ({size} bytes, max {MAX_RESPONSE_SIZE})")]
    ResponseTooLarge { size: u64 },

    #[error("HTTP client error: {0}")]
    Client(String),
}

impl NicovideoError {
    /// Machine-readable reason code reported to callers
    #[must_use]
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::InvalidIdentifier(_) => "INVALID_ID",
            Self::FetchFailed { .. } => "FETCH_FAILED",
            Self::InvalidResponse { .. } => "INVALID_RESPONSE",
            Self::ResponseTooLarge { .. } | Self::Client(_) => "BAD_REQUEST",
        }
    }
}

fn display_status(status: &Option<u16>) -> String {
    status.map_or_else(|| "none".to_string(), |s| s.to_string())
}
