//! Video lookup pipeline
//!
//! id check → URL build → fetch → schema validation → normalization.
//! Any stage failing ends the request with its `NicovideoError`.

use std::sync::Arc;

use tracing::{info, warn};

use super::client::{UpstreamBody, WatchFetcher};
use super::error::NicovideoError;
use super::id::VideoId;
use super::schema::{validate_watch_response, ValidationIssue, ROOT_PATH};
use super::types::NormalizedVideo;
use super::watch_url::WatchUrlBuilder;

/// Stateless apart from its immutable collaborators; share it behind an `Arc`.
#[derive(Clone)]
pub struct VideoLookupService {
    urls: WatchUrlBuilder,
    fetcher: Arc<dyn WatchFetcher>,
}

impl VideoLookupService {
    pub fn new(urls: WatchUrlBuilder, fetcher: Arc<dyn WatchFetcher>) -> Self {
        Self { urls, fetcher }
    }

    #[tracing::instrument(name = "video_lookup", skip(self))]
    pub async fn lookup(&self, raw_id: &str) -> Result<NormalizedVideo, NicovideoError> {
        let id = VideoId::parse(raw_id)?;
        let url = self.urls.build(&id);

        let response = self.fetcher.fetch(&url).await?;

        if !response.status.is_success() {
            warn!(
                url = %response.url,
                status = response.status.as_u16(),
                "Upstream returned non-success status"
            );
            return Err(NicovideoError::FetchFailed {
                url: response.url,
                status: Some(response.status.as_u16()),
                body: response.body.into_value(),
            });
        }

        let body = match response.body {
            UpstreamBody::Json(value) => value,
            UpstreamBody::Text(_) | UpstreamBody::Empty => {
                warn!(url = %response.url, "Upstream returned a non-JSON body");
                return Err(NicovideoError::InvalidResponse {
                    url: response.url,
                    issues: vec![ValidationIssue::new(ROOT_PATH, "expected a JSON document")],
                });
            }
        };

        let watch = validate_watch_response(body).map_err(|issues| {
            warn!(
                url = %response.url,
                issue_count = issues.len(),
                issues = ?issues,
                "Upstream response failed validation"
            );
            NicovideoError::InvalidResponse {
                url: response.url.clone(),
                issues,
            }
        })?;

        info!(video_id = %id, upstream_status = watch.meta.status, "Video metadata resolved");
        Ok(NormalizedVideo::from(watch))
    }
}
