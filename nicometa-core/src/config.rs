use config::{Config as ConfigBuilder, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Default upstream host serving the watch API
pub const DEFAULT_UPSTREAM_BASE_URL: &str = "https://www.nicovideo.jp";

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub upstream: UpstreamConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

/// Upstream watch API client settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    pub base_url: String,
    pub user_agent: String,
    /// Additional attempts after a transport failure
    pub max_retries: usize,
    pub retry_delay_ms: u64,
    pub request_timeout_seconds: u64,
    pub connect_timeout_seconds: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_UPSTREAM_BASE_URL.to_string(),
            user_agent: concat!("Mozilla/5.0 (compatible; nicometa/", env!("CARGO_PKG_VERSION"), ")")
                .to_string(),
            max_retries: 3,
            retry_delay_ms: 100,
            request_timeout_seconds: 10,
            connect_timeout_seconds: 5,
        }
    }
}

impl UpstreamConfig {
    #[must_use]
    pub const fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_seconds)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String, // "json" or "pretty"
    pub file_path: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            file_path: None,
        }
    }
}

impl Config {
    /// Load configuration from an optional file, then environment overrides
    ///
    /// Environment variables use the `NICOMETA_` prefix and `__` between
    /// nested keys, e.g. `NICOMETA_UPSTREAM__MAX_RETRIES=5`.
    pub fn load(config_file: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = ConfigBuilder::builder();

        if let Some(path) = config_file {
            if Path::new(path).exists() {
                builder = builder.add_source(File::with_name(path));
            }
        }

        builder = builder.add_source(
            Environment::with_prefix("NICOMETA")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Load from environment variables only (for Docker/K8s)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::load(None)
    }

    /// Load from file path
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        Self::load(Some(path))
    }

    /// Get HTTP listen address
    #[must_use]
    pub fn http_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Check for misconfigurations, returning every problem found
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.server.host.trim().is_empty() {
            errors.push("server.host must not be empty".to_string());
        }
        if self.server.port == 0 {
            errors.push("server.port must be greater than 0".to_string());
        }

        match url::Url::parse(&self.upstream.base_url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            Ok(url) => errors.push(format!(
                "upstream.base_url has unsupported scheme: {}",
                url.scheme()
            )),
            Err(e) => errors.push(format!("upstream.base_url is not a valid URL: {e}")),
        }
        if self.upstream.user_agent.trim().is_empty() {
            errors.push("upstream.user_agent must not be empty".to_string());
        }
        if self.upstream.request_timeout_seconds == 0 {
            errors.push("upstream.request_timeout_seconds must be greater than 0".to_string());
        }
        if self.upstream.connect_timeout_seconds == 0 {
            errors.push("upstream.connect_timeout_seconds must be greater than 0".to_string());
        }

        if crate::logging::parse_log_level(&self.logging.level).is_none() {
            errors.push(format!("logging.level is not a known level: {}", self.logging.level));
        }
        if !matches!(self.logging.format.as_str(), "json" | "pretty") {
            errors.push(format!(
                "logging.format must be \"json\" or \"pretty\" (got \"{}\")",
                self.logging.format
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
