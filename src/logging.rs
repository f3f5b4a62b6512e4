//! Structured logging initialisation.
//!
//! Registration and request handling emit `tracing` events with structured
//! fields (`endpoint`, `method`, `path`, `request_id`, ...). Each request runs
//! inside an `endpoint` span; with [`LogConfig::request_timing`] enabled the
//! span's close event carries the time spent binding, invoking and writing.
//!
//! ```no_run
//! let _guard = brrtapi::logging::init_logging("info")?;
//! # Ok::<(), anyhow::Error>(())
//! ```

use std::env;
use std::io;

use anyhow::{Context, Result};
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Output encoding of log records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// One JSON object per line, with the span stack attached.
    Json,
    Pretty,
}

impl LogFormat {
    /// Anything but `pretty` selects JSON.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        if s.trim().eq_ignore_ascii_case("pretty") {
            LogFormat::Pretty
        } else {
            LogFormat::Json
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    pub level: Level,
    pub format: LogFormat,
    /// Extra `EnvFilter` directives such as `brrtapi::dispatcher=debug`.
    pub directives: Vec<String>,
    /// Hand records to a background writer thread.
    pub non_blocking: bool,
    pub include_location: bool,
    /// Emit a close event for every `endpoint` span.
    pub request_timing: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            format: LogFormat::Json,
            directives: Vec::new(),
            non_blocking: true,
            include_location: false,
            request_timing: false,
        }
    }
}

impl LogConfig {
    /// Read `BRRTAPI_LOG_*`; unset or unparseable values keep their defaults.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let var = |name: &str| env::var(name).ok().filter(|v| !v.trim().is_empty());
        Self {
            level: var("BRRTAPI_LOG_LEVEL").map_or(defaults.level, |v| parse_level(&v)),
            format: var("BRRTAPI_LOG_FORMAT").map_or(defaults.format, |v| LogFormat::parse(&v)),
            directives: var("BRRTAPI_LOG_TARGET_FILTER")
                .map(|v| split_directives(&v))
                .unwrap_or_default(),
            non_blocking: var("BRRTAPI_LOG_ASYNC")
                .and_then(|v| parse_flag(&v))
                .unwrap_or(defaults.non_blocking),
            include_location: var("BRRTAPI_LOG_INCLUDE_LOCATION")
                .and_then(|v| parse_flag(&v))
                .unwrap_or(defaults.include_location),
            request_timing: var("BRRTAPI_LOG_REQUEST_TIMING")
                .and_then(|v| parse_flag(&v))
                .unwrap_or(defaults.request_timing),
        }
    }

    /// Readable output for tests and local runs: debug level, pretty,
    /// synchronous, with source locations and request timing.
    #[must_use]
    pub fn development() -> Self {
        Self {
            level: Level::DEBUG,
            format: LogFormat::Pretty,
            directives: Vec::new(),
            non_blocking: false,
            include_location: true,
            request_timing: true,
        }
    }

    #[must_use]
    pub fn with_directive(mut self, directive: impl Into<String>) -> Self {
        self.directives.push(directive.into());
        self
    }

    /// `RUST_LOG` when set, else the configured level, plus every directive.
    fn env_filter(&self) -> Result<EnvFilter> {
        let mut filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.level.as_str()));
        for raw in &self.directives {
            let directive: Directive = raw
                .parse()
                .with_context(|| format!("invalid log filter directive `{raw}`"))?;
            filter = filter.add_directive(directive);
        }
        Ok(filter)
    }

    fn fmt_layer<S>(&self, writer: BoxMakeWriter) -> Box<dyn Layer<S> + Send + Sync>
    where
        S: tracing::Subscriber + for<'a> LookupSpan<'a>,
    {
        let span_events = if self.request_timing {
            FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        };
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(writer)
            .with_target(true)
            .with_file(self.include_location)
            .with_line_number(self.include_location)
            .with_span_events(span_events);
        match self.format {
            LogFormat::Json => layer
                .json()
                .with_current_span(true)
                .with_span_list(true)
                .with_thread_ids(true)
                .boxed(),
            LogFormat::Pretty => layer.pretty().boxed(),
        }
    }
}

/// Keeps the background writer alive; buffered records are flushed on drop.
#[must_use = "dropping the guard stops the background log writer"]
#[derive(Debug)]
pub struct LogGuard {
    _worker: Option<WorkerGuard>,
}

/// Initialise logging from `BRRTAPI_LOG_*`, with `level` taking precedence
/// over `BRRTAPI_LOG_LEVEL`.
pub fn init_logging(level: &str) -> Result<LogGuard> {
    let config = LogConfig {
        level: parse_level(level),
        ..LogConfig::from_env()
    };
    init_logging_with_config(&config)
}

/// Install the global subscriber described by `config`.
///
/// Fails on an invalid filter directive or when a global subscriber is
/// already installed.
pub fn init_logging_with_config(config: &LogConfig) -> Result<LogGuard> {
    let filter = config.env_filter()?;

    let (writer, worker) = if config.non_blocking {
        let (writer, worker) = tracing_appender::non_blocking(io::stdout());
        (BoxMakeWriter::new(writer), Some(worker))
    } else {
        (BoxMakeWriter::new(io::stdout), None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(config.fmt_layer(writer))
        .try_init()
        .context("a global tracing subscriber is already installed")?;

    Ok(LogGuard { _worker: worker })
}

/// Level name, case-insensitive; unknown names fall back to `info`.
fn parse_level(s: &str) -> Level {
    s.trim().parse().unwrap_or(Level::INFO)
}

fn parse_flag(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn split_directives(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_favour_production() {
        let config = LogConfig::default();
        assert_eq!(config.level, Level::INFO);
        assert_eq!(config.format, LogFormat::Json);
        assert!(config.non_blocking);
        assert!(!config.request_timing);
    }

    #[test]
    fn test_development_preset() {
        let config = LogConfig::development();
        assert_eq!(config.level, Level::DEBUG);
        assert_eq!(config.format, LogFormat::Pretty);
        assert!(!config.non_blocking);
        assert!(config.include_location);
        assert!(config.request_timing);
    }

    #[test]
    fn test_parsers() {
        assert_eq!(LogFormat::parse(" PRETTY "), LogFormat::Pretty);
        assert_eq!(LogFormat::parse("xml"), LogFormat::Json);
        assert_eq!(parse_level("WARN"), Level::WARN);
        assert_eq!(parse_level("loud"), Level::INFO);
        assert_eq!(parse_flag("Yes"), Some(true));
        assert_eq!(parse_flag("0"), Some(false));
        assert_eq!(parse_flag("maybe"), None);
        assert_eq!(
            split_directives("brrtapi=debug, ,brrtapi::dispatcher=trace"),
            vec!["brrtapi=debug", "brrtapi::dispatcher=trace"]
        );
    }

    #[test]
    fn test_invalid_directive_is_reported() {
        let config = LogConfig::development().with_directive("brrtapi::dispatcher=trace");
        assert!(config.env_filter().is_ok());

        let config = config.with_directive("brrtapi=loudest");
        let err = config.env_filter().unwrap_err();
        assert!(err.to_string().contains("brrtapi=loudest"));
        assert!(init_logging_with_config(&config).is_err());
    }

    #[test]
    fn test_second_init_fails() {
        let config = LogConfig::development();
        let _first = init_logging_with_config(&config);
        assert!(init_logging_with_config(&config).is_err());
    }
}
