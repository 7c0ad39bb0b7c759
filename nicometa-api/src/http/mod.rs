// Module: http
// HTTP/JSON surface: the video lookup route plus a liveness probe

pub mod error;
pub mod video;

use std::sync::Arc;

use axum::{routing::get, Router};
use nicometa_core::config::UpstreamConfig;
use nicometa_providers::{ClientOptions, NicovideoClient, VideoLookupService, WatchUrlBuilder};
use tower_http::trace::TraceLayer;
use url::Url;

pub use error::{ApiError, ApiResult};

/// Shared application state, immutable after startup
#[derive(Clone)]
pub struct AppState {
    pub lookup: Arc<VideoLookupService>,
}

impl AppState {
    #[must_use]
    pub fn new(lookup: Arc<VideoLookupService>) -> Self {
        Self { lookup }
    }

    /// Build the production pipeline from upstream settings
    pub fn from_config(config: &UpstreamConfig) -> anyhow::Result<Self> {
        let base = Url::parse(&config.base_url)
            .map_err(|e| anyhow::anyhow!("Invalid upstream base URL {}: {e}", config.base_url))?;

        let client = NicovideoClient::with_options(ClientOptions {
            user_agent: config.user_agent.clone(),
            max_retries: config.max_retries,
            retry_delay: config.retry_delay(),
            request_timeout: config.request_timeout(),
            connect_timeout: config.connect_timeout(),
        })?;

        let lookup = VideoLookupService::new(WatchUrlBuilder::new(base), Arc::new(client));
        Ok(Self::new(Arc::new(lookup)))
    }
}

/// Create the HTTP router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(video::video_routes())
        .route("/health", get(|| async { "OK" }))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
