//! Logging bootstrap for the EW-DX SDK
//!
//! Hosts embedding the adapter usually own stdout/stderr, so nothing is
//! installed unless asked for. Every mode other than [`LoggingMode::Silent`]
//! writes to stderr.

use std::str::FromStr;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Registry};

/// Environment variable selecting the [`LoggingMode`]
pub const LOG_MODE_ENV: &str = "EWDX_LOG_MODE";

/// Environment variable holding a filter directive, e.g. `ewdx_stream=trace`
pub const LOG_LEVEL_ENV: &str = "EWDX_LOG_LEVEL";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoggingMode {
    /// Install nothing; the host brings its own subscriber or none
    #[default]
    Silent,
    /// Compact lines at `info`
    Development,
    /// Pretty multi-line output at `debug` with source locations
    Debug,
    /// One JSON object per event at `info`, for log shippers
    Json,
}

impl LoggingMode {
    fn default_level(&self) -> &'static str {
        match self {
            LoggingMode::Debug => "debug",
            _ => "info",
        }
    }
}

impl FromStr for LoggingMode {
    type Err = LoggingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "silent" | "off" => Ok(LoggingMode::Silent),
            "development" | "dev" => Ok(LoggingMode::Development),
            "debug" => Ok(LoggingMode::Debug),
            "json" => Ok(LoggingMode::Json),
            other => Err(LoggingError::InvalidEnv(format!("{}={}", LOG_MODE_ENV, other))),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("Failed to initialize tracing subscriber: {0}")]
    TracingInit(String),

    #[error("Invalid environment variable: {0}")]
    InvalidEnv(String),
}

/// Install the global subscriber for `mode`
///
/// Call once, before the first adapter starts. A second call fails with
/// [`LoggingError::TracingInit`].
///
/// ```rust,ignore
/// use ewdx_state::logging::{init_logging, LoggingMode};
///
/// init_logging(LoggingMode::Development)?;
/// ```
pub fn init_logging(mode: LoggingMode) -> Result<(), LoggingError> {
    if mode == LoggingMode::Silent {
        return Ok(());
    }
    let filter = env_filter(mode.default_level())?;
    let registry = Registry::default().with(filter);

    let installed = match mode {
        LoggingMode::Silent => Ok(()),
        LoggingMode::Development => registry
            .with(fmt::layer().with_writer(std::io::stderr).with_target(false).compact())
            .try_init(),
        LoggingMode::Debug => registry
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .pretty()
                    .with_thread_ids(true)
                    .with_file(true)
                    .with_line_number(true),
            )
            .try_init(),
        LoggingMode::Json => registry
            .with(fmt::layer().with_writer(std::io::stderr).json().with_current_span(false))
            .try_init(),
    };
    installed.map_err(|e| LoggingError::TracingInit(e.to_string()))
}

/// Install the subscriber named by `EWDX_LOG_MODE`
///
/// Accepts `silent`, `development`, `debug` or `json`; unset means silent.
pub fn init_logging_from_env() -> Result<(), LoggingError> {
    let mode = match std::env::var(LOG_MODE_ENV) {
        Ok(value) => value.parse()?,
        Err(_) => LoggingMode::Silent,
    };
    init_logging(mode)
}

/// Filter from `EWDX_LOG_LEVEL`, else `RUST_LOG`, else `default_level`
fn env_filter(default_level: &str) -> Result<EnvFilter, LoggingError> {
    let directive = std::env::var(LOG_LEVEL_ENV)
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| default_level.to_string());

    EnvFilter::try_new(&directive)
        .map_err(|e| LoggingError::InvalidEnv(format!("{}: {}", directive, e)))
}
