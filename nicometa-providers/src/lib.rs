// nicometa provider clients
//
// Pure HTTP client for the niconico watch API plus the lookup pipeline
// built on top of it. Independent of the HTTP server so it can be used
// standalone.
//
// Pipeline:
// - nicovideo::id: video id validation
// - nicovideo::watch_url: upstream URL construction (action track id)
// - nicovideo::client: resilient fetch behind the WatchFetcher seam
// - nicovideo::schema: structural validation with issue lists
// - nicovideo::types: upstream shapes and the normalized output
// - nicovideo::service: wires the stages together

pub mod nicovideo;

// Re-export client types for convenience
pub use nicovideo::client::{
    ClientOptions, NicovideoClient, UpstreamBody, UpstreamResponse, WatchFetcher,
};
pub use nicovideo::error::NicovideoError;
pub use nicovideo::id::VideoId;
pub use nicovideo::schema::ValidationIssue;
pub use nicovideo::service::VideoLookupService;
pub use nicovideo::types::NormalizedVideo;
pub use nicovideo::watch_url::{Clock, RandomTrackId, SystemClock, TrackIdSource, WatchUrlBuilder};
