//! Upstream watch API URL construction

use std::sync::Arc;

use url::Url;

use super::id::VideoId;

/// Production host of the watch API
pub const DEFAULT_BASE_URL: &str = "https://www.nicovideo.jp";

const FRONTEND_ID: &str = "6";
const FRONTEND_VERSION: &str = "0";
const SKIPS: &str = "harmful";

const TRACK_ID_LEN: usize = 10;
const TRACK_ID_ALPHABET: [char; 36] = [
    '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', 'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h',
    'i', 'j', 'k', 'l', 'm', 'n', 'o', 'p', 'q', 'r', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z',
];

/// Source of the current wall-clock time in Unix milliseconds
pub trait Clock: Send + Sync {
    fn now_millis(&self) -> i64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// Source of the random half of an action track id
pub trait TrackIdSource: Send + Sync {
    fn next_token(&self) -> String;
}

/// Lowercase alphanumeric tokens, same shape a browser session produces
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomTrackId;

impl TrackIdSource for RandomTrackId {
    fn next_token(&self) -> String {
        nanoid::nanoid!(TRACK_ID_LEN, &TRACK_ID_ALPHABET)
    }
}

/// Builds `/api/watch/v3_guest/{id}` URLs.
///
/// Each call draws a fresh action track id; nothing is cached between
/// calls.
#[derive(Clone)]
pub struct WatchUrlBuilder {
    base: Url,
    clock: Arc<dyn Clock>,
    track_ids: Arc<dyn TrackIdSource>,
}

impl WatchUrlBuilder {
    /// Builder using the system clock and a random token source
    #[must_use]
    pub fn new(base: Url) -> Self {
        Self::with_sources(base, Arc::new(SystemClock), Arc::new(RandomTrackId))
    }

    #[must_use]
    pub fn with_sources(
        base: Url,
        clock: Arc<dyn Clock>,
        track_ids: Arc<dyn TrackIdSource>,
    ) -> Self {
        Self {
            base,
            clock,
            track_ids,
        }
    }

    #[must_use]
    pub fn base(&self) -> &Url {
        &self.base
    }

    /// `{token}_{unix millis}`
    #[must_use]
    pub fn action_track_id(&self) -> String {
        format!("{}_{}", self.track_ids.next_token(), self.clock.now_millis())
    }

    /// Build the watch URL for `id`. Any path or query on the base is replaced.
    #[must_use]
    pub fn build(&self, id: &VideoId) -> Url {
        let mut url = self.base.clone();
        url.set_path(&format!("/api/watch/v3_guest/{id}"));
        url.set_query(None);
        url.query_pairs_mut()
            .append_pair("_frontendId", FRONTEND_ID)
            .append_pair("_frontendVersion", FRONTEND_VERSION)
            .append_pair("skips", SKIPS)
            .append_pair("actionTrackId", &self.action_track_id());

        tracing::debug!(video_id = %id, url = %url, "Built upstream watch URL");
        url
    }
}

impl Default for WatchUrlBuilder {
    fn default() -> Self {
        // DEFAULT_BASE_URL is a compile-time constant
        Self::new(Url::parse(DEFAULT_BASE_URL).expect("invalid default base URL"))
    }
}
