//! Logging configuration and subscriber installation.

use std::env;

use tracing_subscriber::fmt::format::{FormatEvent, FormatFields};
use tracing_subscriber::fmt::time::{ChronoLocal, ChronoUtc};
use tracing_subscriber::fmt::{self, format::Format};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

const LOCAL_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f %z";
const UTC_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync + 'static>;

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Multi-line human-readable output
    #[default]
    Pretty,
    /// Single-line output
    Compact,
    /// One JSON object per event
    Json,
}

impl LogFormat {
    /// Parse a format name; unknown names fall back to `Pretty`.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "json" => LogFormat::Json,
            "compact" => LogFormat::Compact,
            _ => LogFormat::Pretty,
        }
    }
}

/// Timestamp format for log entries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimestampFormat {
    /// Local time with offset
    #[default]
    Local,
    /// UTC, RFC 3339
    Utc,
    /// No timestamps
    None,
}

impl TimestampFormat {
    /// Parse a timestamp format name; unknown names fall back to `Local`.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "utc" => TimestampFormat::Utc,
            "none" | "off" => TimestampFormat::None,
            _ => TimestampFormat::Local,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub format: LogFormat,
    pub timestamps: TimestampFormat,
    /// Filter used when `RUST_LOG` is not set
    pub default_level: String,
    /// Include file and line
    pub include_location: bool,
    pub include_thread_ids: bool,
    /// Include the module path of the event
    pub include_target: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Pretty,
            timestamps: TimestampFormat::Local,
            default_level: "info".to_string(),
            include_location: false,
            include_thread_ids: false,
            include_target: true,
        }
    }
}

fn env_flag(name: &str, default: bool) -> bool {
    env::var(name)
        .map(|v| matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(default)
}

impl LogConfig {
    /// Build a config from `LOG_FORMAT`, `LOG_TIMESTAMPS`, `LOG_LEVEL`,
    /// `LOG_LOCATION` and `LOG_THREAD_IDS`.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            format: env::var("LOG_FORMAT")
                .map(|s| LogFormat::parse(&s))
                .unwrap_or_default(),
            timestamps: env::var("LOG_TIMESTAMPS")
                .map(|s| TimestampFormat::parse(&s))
                .unwrap_or_default(),
            default_level: env::var("LOG_LEVEL").unwrap_or(defaults.default_level),
            include_location: env_flag("LOG_LOCATION", defaults.include_location),
            include_thread_ids: env_flag("LOG_THREAD_IDS", defaults.include_thread_ids),
            include_target: defaults.include_target,
        }
    }

    /// JSON lines with UTC timestamps, for log shippers.
    pub fn json() -> Self {
        Self {
            format: LogFormat::Json,
            timestamps: TimestampFormat::Utc,
            include_location: true,
            include_thread_ids: true,
            ..Default::default()
        }
    }

    /// Single-line output without source locations.
    pub fn compact() -> Self {
        Self {
            format: LogFormat::Compact,
            ..Default::default()
        }
    }

    /// Set the fallback filter.
    pub fn with_default_level(mut self, level: impl Into<String>) -> Self {
        self.default_level = level.into();
        self
    }

    fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.default_level))
    }

    fn fmt_layer(&self) -> BoxedLayer {
        let layer = fmt::layer()
            .with_target(self.include_target)
            .with_thread_ids(self.include_thread_ids)
            .with_file(self.include_location)
            .with_line_number(self.include_location)
            .with_ansi(self.format != LogFormat::Json && atty::is(atty::Stream::Stdout));

        match self.format {
            LogFormat::Json => with_timestamps(layer.json(), self.timestamps),
            LogFormat::Compact => with_timestamps(layer.compact(), self.timestamps),
            LogFormat::Pretty => with_timestamps(layer.pretty(), self.timestamps),
        }
    }
}

fn with_timestamps<N, L, T>(
    layer: fmt::Layer<Registry, N, Format<L, T>>,
    timestamps: TimestampFormat,
) -> BoxedLayer
where
    N: for<'w> FormatFields<'w> + Send + Sync + 'static,
    L: Send + Sync + 'static,
    Format<L, ChronoLocal>: FormatEvent<Registry, N>,
    Format<L, ChronoUtc>: FormatEvent<Registry, N>,
    Format<L, ()>: FormatEvent<Registry, N>,
{
    match timestamps {
        TimestampFormat::Local => layer
            .with_timer(ChronoLocal::new(LOCAL_TIME_FORMAT.to_string()))
            .boxed(),
        TimestampFormat::Utc => layer
            .with_timer(ChronoUtc::new(UTC_TIME_FORMAT.to_string()))
            .boxed(),
        TimestampFormat::None => layer.without_time().boxed(),
    }
}

/// Install the global subscriber.
///
/// # Errors
///
/// Fails if a global subscriber is already installed.
pub fn init_logging(config: LogConfig) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::registry()
        .with(config.fmt_layer())
        .with(config.env_filter())
        .try_init()?;
    Ok(())
}
