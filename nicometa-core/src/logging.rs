use std::{fs::OpenOptions, sync::Arc};

use tracing::{Level, Subscriber};
use tracing_subscriber::{
    filter::LevelFilter,
    fmt::{self, format::FmtSpan, writer::BoxMakeWriter},
    layer::SubscriberExt,
    registry::LookupSpan,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

use crate::config::LoggingConfig;

/// Install the global subscriber described by `config`
///
/// `RUST_LOG`, when set, replaces the configured level. Events go to
/// `file_path` (appended) or stdout.
pub fn init_logging(config: &LoggingConfig) -> anyhow::Result<()> {
    let level = parse_log_level(&config.level)
        .ok_or_else(|| anyhow::anyhow!("Invalid log level: {}", config.level))?;
    let directives = std::env::var(EnvFilter::DEFAULT_ENV).ok();

    let writer = match &config.file_path {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            BoxMakeWriter::new(Arc::new(file))
        }
        None => BoxMakeWriter::new(std::io::stdout),
    };

    tracing_subscriber::registry()
        .with(build_filter(level, directives.as_deref()))
        .with(format_layer(config.format == "json", writer))
        .try_init()?;

    Ok(())
}

/// Map a configured level name to a `Level`; `None` for unknown names
pub(crate) fn parse_log_level(level: &str) -> Option<Level> {
    match level.to_ascii_lowercase().as_str() {
        "trace" => Some(Level::TRACE),
        "debug" => Some(Level::DEBUG),
        "info" => Some(Level::INFO),
        "warn" | "warning" => Some(Level::WARN),
        "error" => Some(Level::ERROR),
        _ => None,
    }
}

/// `directives` is the raw `RUST_LOG` value. The configured level only
/// applies when it is absent or empty.
fn build_filter(level: Level, directives: Option<&str>) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(level).into())
        .parse_lossy(directives.unwrap_or_default())
}

fn format_layer<S>(json: bool, writer: BoxMakeWriter) -> Box<dyn Layer<S> + Send + Sync>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    let layer = fmt::layer()
        .with_writer(writer)
        .with_span_events(FmtSpan::CLOSE)
        .with_target(true)
        .with_line_number(true);

    if json {
        layer
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_file(true)
            .boxed()
    } else {
        layer.pretty().with_file(false).boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_log_level() {
        assert_eq!(parse_log_level("trace"), Some(Level::TRACE));
        assert_eq!(parse_log_level("INFO"), Some(Level::INFO));
        assert_eq!(parse_log_level("warning"), Some(Level::WARN));
        assert_eq!(parse_log_level("error"), Some(Level::ERROR));
        assert_eq!(parse_log_level("loud"), None);
    }

    #[test]
    fn test_warning_alias_keeps_warn_events() {
        let level = parse_log_level("warning").unwrap();
        let filter = build_filter(level, None);

        assert_eq!(filter.max_level_hint(), Some(LevelFilter::WARN));
    }

    #[test]
    fn test_empty_rust_log_falls_back_to_config() {
        let filter = build_filter(Level::ERROR, Some(""));
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::ERROR));
    }

    #[test]
    fn test_rust_log_overrides_config() {
        let filter = build_filter(Level::WARN, Some("nicometa_providers=debug"));
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::DEBUG));
    }

    #[test]
    fn test_init_rejects_unknown_level() {
        let config = LoggingConfig {
            level: "loud".to_string(),
            ..LoggingConfig::default()
        };
        assert!(init_logging(&config).is_err());
    }
}
