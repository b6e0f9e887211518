//! Structured logging initialization.
//!
//! Library code only emits `tracing` events; nothing is printed until a
//! subscriber is installed, either by the host application or through
//! [`enable_logging`].

use std::env;
use std::fs::{File, OpenOptions};
use std::io;

use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter directive used when no level is given.
pub const TRACE_ENV: &str = "UMO_TRACE";
/// `pretty` (default) or `json`.
pub const FORMAT_ENV: &str = "UMO_LOG_FORMAT";
/// Optional path of an additional log file.
pub const FILE_ENV: &str = "UMO_LOG_FILE";

/// Errors raised while installing the log subscriber.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoggingError {
    InvalidFilter(String),
    InvalidFormat(String),
    LogFile { path: String, reason: String },
    Init(String),
}

impl LoggingError {
    /// Returns a semantic error code for programmatic handling.
    pub fn code(&self) -> &'static str {
        match self {
            LoggingError::InvalidFilter(_) => "LOG_INVALID_FILTER",
            LoggingError::InvalidFormat(_) => "LOG_INVALID_FORMAT",
            LoggingError::LogFile { .. } => "LOG_FILE_UNAVAILABLE",
            LoggingError::Init(_) => "LOG_INIT_FAILED",
        }
    }
}

impl std::fmt::Display for LoggingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoggingError::InvalidFilter(reason) => {
                write!(f, "[{}] Invalid log filter: {}", self.code(), reason)
            }
            LoggingError::InvalidFormat(format) => write!(
                f,
                "[{}] Invalid {} '{}' (expected 'json' or 'pretty')",
                self.code(),
                FORMAT_ENV,
                format
            ),
            LoggingError::LogFile { path, reason } => write!(
                f,
                "[{}] Failed to open log file '{}': {}",
                self.code(),
                path,
                reason
            ),
            LoggingError::Init(reason) => {
                write!(f, "[{}] Failed to initialize logging: {}", self.code(), reason)
            }
        }
    }
}

impl std::error::Error for LoggingError {}

/// Output format of the installed subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl LogFormat {
    pub fn parse(value: &str) -> Result<Self, LoggingError> {
        if value.eq_ignore_ascii_case("pretty") {
            Ok(LogFormat::Pretty)
        } else if value.eq_ignore_ascii_case("json") {
            Ok(LogFormat::Json)
        } else {
            Err(LoggingError::InvalidFormat(value.to_string()))
        }
    }
}

/// Build the event filter for a level or directive string such as
/// `debug` or `umo_core=trace`. `off` disables all events.
pub fn build_filter(level: &str) -> Result<EnvFilter, LoggingError> {
    if level.eq_ignore_ascii_case("off") {
        Ok(EnvFilter::default().add_directive(LevelFilter::OFF.into()))
    } else {
        EnvFilter::try_new(level).map_err(|err| LoggingError::InvalidFilter(err.to_string()))
    }
}

fn open_log_file(path: &str) -> Result<File, LoggingError> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|err| LoggingError::LogFile {
            path: path.to_string(),
            reason: err.to_string(),
        })
}

fn map_init_err<E: std::fmt::Display>(err: E) -> LoggingError {
    LoggingError::Init(err.to_string())
}

/// Enable structured logging.
///
/// When `level` is None, this reads `UMO_TRACE` if set. If `UMO_TRACE` is
/// unset, the default level is `off`. Returns true when logging is initialized,
/// false if a subscriber is already configured.
pub fn enable_logging(level: Option<&str>) -> Result<bool, LoggingError> {
    if tracing::dispatcher::has_been_set() {
        return Ok(false);
    }

    let level_value = level
        .map(str::to_string)
        .or_else(|| env::var(TRACE_ENV).ok())
        .unwrap_or_else(|| "off".to_string());
    let filter = build_filter(&level_value)?;

    let format = env::var(FORMAT_ENV)
        .map(|value| LogFormat::parse(&value))
        .unwrap_or(Ok(LogFormat::Pretty))?;
    let log_file = env::var(FILE_ENV).ok();

    match format {
        LogFormat::Json => {
            let stderr_layer = tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .json();
            let base = tracing_subscriber::registry()
                .with(filter)
                .with(stderr_layer);
            if let Some(path) = log_file {
                let file_layer = tracing_subscriber::fmt::layer()
                    .with_writer(open_log_file(&path)?)
                    .with_ansi(false)
                    .json();
                base.with(file_layer).try_init().map_err(map_init_err)?;
            } else {
                base.try_init().map_err(map_init_err)?;
            }
        }
        LogFormat::Pretty => {
            let stderr_layer = tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .pretty();
            let base = tracing_subscriber::registry()
                .with(filter)
                .with(stderr_layer);
            if let Some(path) = log_file {
                let file_layer = tracing_subscriber::fmt::layer()
                    .with_writer(open_log_file(&path)?)
                    .with_ansi(false)
                    .pretty();
                base.with(file_layer).try_init().map_err(map_init_err)?;
            } else {
                base.try_init().map_err(map_init_err)?;
            }
        }
    }

    tracing::debug!(
        component = "logging",
        operation = "enable_logging",
        status = "success",
        filter = %level_value,
        "Logging initialized"
    );
    Ok(true)
}
