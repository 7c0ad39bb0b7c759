//! niconico HTTP Client

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use backon::{ConstantBuilder, Retryable};
use reqwest::{header, Client, StatusCode};
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use super::error::{NicovideoError, MAX_RESPONSE_SIZE};

const DEFAULT_USER_AGENT: &str =
    concat!("Mozilla/5.0 (compatible; nicometa/", env!("CARGO_PKG_VERSION"), ")");

/// Upstream response as received, whatever its status
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    /// Final URL after redirects
    pub url: String,
    pub body: UpstreamBody,
}

#[derive(Debug, Clone, PartialEq)]
pub enum UpstreamBody {
    Json(Value),
    /// Body that is not valid JSON, decoded lossily
    Text(String),
    Empty,
}

impl UpstreamBody {
    #[must_use]
    pub fn from_bytes(bytes: &[u8]) -> Self {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Self::Empty;
        }
        serde_json::from_slice(bytes).map_or_else(
            |_| Self::Text(String::from_utf8_lossy(bytes).into_owned()),
            Self::Json,
        )
    }

    /// JSON rendition for diagnostics: text becomes a JSON string, empty becomes `null`
    #[must_use]
    pub fn into_value(self) -> Value {
        match self {
            Self::Json(value) => value,
            Self::Text(text) => Value::String(text),
            Self::Empty => Value::Null,
        }
    }
}

/// Fetch seam between the lookup pipeline and the network.
///
/// Implementations must return non-success statuses as `Ok`; only a
/// response that never arrived is an error.
#[async_trait]
pub trait WatchFetcher: Send + Sync {
    async fn fetch(&self, url: &Url) -> Result<UpstreamResponse, NicovideoError>;
}

/// Client tuning knobs
#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub user_agent: String,
    /// Additional attempts after a transport failure
    pub max_retries: usize,
    pub retry_delay: Duration,
    /// Per-attempt timeout, covering connect through body read
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            max_retries: 3,
            retry_delay: Duration::from_millis(100),
            request_timeout: Duration::from_secs(10),
            connect_timeout: Duration::from_secs(5),
        }
    }
}

/// Failure of a single attempt
#[derive(Debug)]
enum AttemptError {
    Transport(reqwest::Error),
    TooLarge(u64),
}

impl AttemptError {
    /// Connect, DNS, timeout and body-read failures. Redirect and builder
    /// errors would fail the same way again.
    fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_connect() || e.is_timeout() || e.is_body() || e.is_request(),
            Self::TooLarge(_) => false,
        }
    }
}

impl From<reqwest::Error> for AttemptError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err)
    }
}

/// niconico HTTP Client
#[derive(Debug, Clone)]
pub struct NicovideoClient {
    client: Client,
    max_retries: usize,
    retry_delay: Duration,
}

impl NicovideoClient {
    pub fn new() -> Result<Self, NicovideoError> {
        Self::with_options(ClientOptions::default())
    }

    pub fn with_options(options: ClientOptions) -> Result<Self, NicovideoError> {
        let client = Client::builder()
            .user_agent(options.user_agent)
            .connect_timeout(options.connect_timeout)
            .timeout(options.request_timeout)
            .pool_max_idle_per_host(10)
            .build()
            .map_err(|e| NicovideoError::Client(e.to_string()))?;

        Ok(Self {
            client,
            max_retries: options.max_retries,
            retry_delay: options.retry_delay,
        })
    }

    /// One GET, body read with the size limit enforced
    async fn send_once(&self, url: &Url) -> Result<UpstreamResponse, AttemptError> {
        let response = self
            .client
            .get(url.clone())
            .header(header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        let final_url = response.url().to_string();

        if let Some(len) = response.content_length() {
            if len > MAX_RESPONSE_SIZE as u64 {
                return Err(AttemptError::TooLarge(len));
            }
        }
        let bytes = response.bytes().await?;
        if bytes.len() > MAX_RESPONSE_SIZE {
            return Err(AttemptError::TooLarge(bytes.len() as u64));
        }

        Ok(UpstreamResponse {
            status,
            url: final_url,
            body: UpstreamBody::from_bytes(&bytes),
        })
    }
}

#[async_trait]
impl WatchFetcher for NicovideoClient {
    async fn fetch(&self, url: &Url) -> Result<UpstreamResponse, NicovideoError> {
        let counter = AtomicUsize::new(0);
        let attempts = &counter;
        let backoff = ConstantBuilder::default()
            .with_delay(self.retry_delay)
            .with_max_times(self.max_retries);

        let result = (move || {
            attempts.fetch_add(1, Ordering::Relaxed);
            self.send_once(url)
        })
        .retry(backoff)
        .when(AttemptError::is_transient)
        .notify(|err: &AttemptError, delay: Duration| {
            warn!(url = %url, error = ?err, ?delay, "Upstream request failed, retrying");
        })
        .await;

        let attempts = counter.load(Ordering::Relaxed);
        match result {
            Ok(response) => {
                debug!(
                    url = %response.url,
                    status = response.status.as_u16(),
                    attempts,
                    "Upstream fetch completed"
                );
                Ok(response)
            }
            Err(AttemptError::Transport(e)) => {
                warn!(url = %url, attempts, error = %e, "Upstream unreachable, giving up");
                Err(NicovideoError::FetchFailed {
                    url: url.to_string(),
                    status: None,
                    body: Value::String(e.to_string()),
                })
            }
            Err(AttemptError::TooLarge(size)) => Err(NicovideoError::ResponseTooLarge { size }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header as header_matcher, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fast_client() -> NicovideoClient {
        NicovideoClient::with_options(ClientOptions {
            retry_delay: Duration::ZERO,
            request_timeout: Duration::from_secs(2),
            connect_timeout: Duration::from_secs(1),
            ..ClientOptions::default()
        })
        .unwrap()
    }

    fn watch_url(server: &MockServer, id: &str) -> Url {
        Url::parse(&format!("{}/api/watch/v3_guest/{id}", server.uri())).unwrap()
    }

    #[test]
    fn test_body_classification() {
        assert_eq!(UpstreamBody::from_bytes(b""), UpstreamBody::Empty);
        assert_eq!(UpstreamBody::from_bytes(b" \n"), UpstreamBody::Empty);
        assert_eq!(
            UpstreamBody::from_bytes(br#"{"a":1}"#),
            UpstreamBody::Json(json!({"a": 1}))
        );
        assert_eq!(
            UpstreamBody::from_bytes(b"<html>"),
            UpstreamBody::Text("<html>".to_string())
        );
    }

    #[test]
    fn test_body_into_value() {
        assert_eq!(UpstreamBody::Empty.into_value(), Value::Null);
        assert_eq!(UpstreamBody::Text("oops".to_string()).into_value(), json!("oops"));
        assert_eq!(UpstreamBody::Json(json!([1])).into_value(), json!([1]));
    }

    #[tokio::test]
    async fn test_fetch_success_sends_user_agent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/watch/v3_guest/sm9"))
            .and(header_matcher("user-agent", DEFAULT_USER_AGENT))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"meta": {"status": 200}})))
            .expect(1)
            .mount(&server)
            .await;

        let url = watch_url(&server, "sm9");
        let response = fast_client().fetch(&url).await.unwrap();

        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.url, url.as_str());
        assert_eq!(response.body, UpstreamBody::Json(json!({"meta": {"status": 200}})));
    }

    #[tokio::test]
    async fn test_error_status_is_returned_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/watch/v3_guest/sm123456"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({"error": "server"})))
            .expect(1)
            .mount(&server)
            .await;

        let response = fast_client()
            .fetch(&watch_url(&server, "sm123456"))
            .await
            .unwrap();

        assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.body.into_value(), json!({"error": "server"}));
    }

    #[tokio::test]
    async fn test_non_json_body_is_kept_as_text() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403).set_body_string("Forbidden"))
            .mount(&server)
            .await;

        let response = fast_client().fetch(&watch_url(&server, "sm1")).await.unwrap();
        assert_eq!(response.status, StatusCode::FORBIDDEN);
        assert_eq!(response.body, UpstreamBody::Text("Forbidden".to_string()));
    }

    #[tokio::test]
    async fn test_transport_failure_exhausts_retries() {
        // Bind then drop to get a port nothing listens on
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let url = Url::parse(&format!("http://127.0.0.1:{port}/api/watch/v3_guest/sm9")).unwrap();

        let err = fast_client().fetch(&url).await.unwrap_err();
        match err {
            NicovideoError::FetchFailed { url: failed, status, body } => {
                assert_eq!(failed, url.as_str());
                assert_eq!(status, None);
                assert!(body.is_string());
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_timeout_is_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
            .expect(3)
            .mount(&server)
            .await;

        let client = NicovideoClient::with_options(ClientOptions {
            max_retries: 2,
            retry_delay: Duration::ZERO,
            request_timeout: Duration::from_millis(100),
            ..ClientOptions::default()
        })
        .unwrap();

        let err = client.fetch(&watch_url(&server, "sm9")).await.unwrap_err();
        assert!(matches!(err, NicovideoError::FetchFailed { status: None, .. }));
    }

    #[tokio::test]
    async fn test_default_options_make_four_attempts() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
            .expect(4)
            .mount(&server)
            .await;

        let options = ClientOptions {
            retry_delay: Duration::ZERO,
            request_timeout: Duration::from_millis(100),
            ..ClientOptions::default()
        };
        assert_eq!(options.max_retries, 3);

        let client = NicovideoClient::with_options(options).unwrap();
        let err = client.fetch(&watch_url(&server, "sm9")).await.unwrap_err();
        assert!(matches!(err, NicovideoError::FetchFailed { status: None, .. }));
    }

    #[tokio::test]
    async fn test_redirect_loop_is_not_retried() {
        let server = MockServer::start().await;
        // One attempt follows at most the default 10 redirects
        Mock::given(method("GET"))
            .and(path("/loop"))
            .respond_with(ResponseTemplate::new(302).insert_header("Location", "/loop"))
            .expect(1..=11)
            .mount(&server)
            .await;

        let url = Url::parse(&format!("{}/loop", server.uri())).unwrap();
        let err = fast_client().fetch(&url).await.unwrap_err();
        assert!(matches!(err, NicovideoError::FetchFailed { status: None, .. }));
    }

    #[tokio::test]
    async fn test_oversized_body_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![b' '; MAX_RESPONSE_SIZE + 1]))
            .expect(1)
            .mount(&server)
            .await;

        let err = fast_client().fetch(&watch_url(&server, "sm9")).await.unwrap_err();
        assert!(matches!(err, NicovideoError::ResponseTooLarge { .. }));
    }
}
