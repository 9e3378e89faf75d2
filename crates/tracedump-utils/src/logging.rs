//! # Logging Utilities
//!
//! Logging infrastructure for hosts embedding the tracer, built on `tracing`.
//!
//! Trace lines are reported at `INFO` under the `tracedump::report` target;
//! resolution misses and skipped annotations are logged at `DEBUG`/`TRACE`
//! under `tracedump_core`. This module installs a subscriber for both:
//! - Pretty output for interactive use, JSON for collection pipelines
//! - Environment variable configuration
//! - Console plus file, or file only (for injected hosts without a console)
//!
//! ## Environment Variables
//!
//! - `RUST_LOG`: Filter directives (e.g., `RUST_LOG=tracedump::report=info,tracedump_core=debug`)
//! - `TRACEDUMP_LOG_FORMAT`: Output format (`json` or `pretty`, default: `pretty`)
//! - `TRACEDUMP_LOG_FILE`: Optional path to an additional log file
//!
//! ## Examples
//!
//! ```rust,no_run
//! use tracedump_utils::{init_logging_with_level, LogFormat, LogLevel};
//!
//! init_logging_with_level(LogLevel::Debug, LogFormat::Pretty).expect("Failed to initialize logging");
//! tracing::info!(target: "tracedump::report", "[x] Disassembling 0x00401000: demo");
//! ```

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::{env, fs, io};

use tracing::Level;
use tracing_appender::non_blocking::NonBlocking;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::fmt::{self, MakeWriter};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync + 'static>;

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat
{
    /// Pretty-printed, human-readable format (default)
    Pretty,
    /// One JSON object per event
    Json,
}

impl FromStr for LogFormat
{
    type Err = LoggingError;

    fn from_str(s: &str) -> Result<Self, Self::Err>
    {
        match s.to_lowercase().as_str() {
            "pretty" | "text" | "dev" => Ok(LogFormat::Pretty),
            "json" | "prod" => Ok(LogFormat::Json),
            _ => Err(LoggingError::InvalidFormat(s.to_string())),
        }
    }
}

/// Log level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel
{
    /// Error level
    Error,
    /// Warning level
    Warn,
    /// Info level (default; trace lines are reported here)
    Info,
    /// Debug level (resolution misses, stop reasons)
    Debug,
    /// Trace level (most verbose)
    Trace,
}

impl From<LogLevel> for Level
{
    fn from(level: LogLevel) -> Self
    {
        match level {
            LogLevel::Error => Level::ERROR,
            LogLevel::Warn => Level::WARN,
            LogLevel::Info => Level::INFO,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Trace => Level::TRACE,
        }
    }
}

impl FromStr for LogLevel
{
    type Err = LoggingError;

    fn from_str(s: &str) -> Result<Self, Self::Err>
    {
        match s.to_lowercase().as_str() {
            "error" | "err" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" | "dbg" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            _ => Err(LoggingError::InvalidLevel(s.to_string())),
        }
    }
}

/// Initialize logging from the environment
///
/// Reads `RUST_LOG`, `TRACEDUMP_LOG_FORMAT` and `TRACEDUMP_LOG_FILE`. Without
/// `RUST_LOG`, everything at `INFO` and above is shown, which includes every
/// trace line.
///
/// ## Errors
///
/// - `InvalidFormat`: `TRACEDUMP_LOG_FORMAT` is set to an unknown value
/// - `InitializationFailed`: a global subscriber is already installed
/// - `FileError`: the log file's directory cannot be created
pub fn init_logging() -> Result<(), LoggingError>
{
    let format = match env::var("TRACEDUMP_LOG_FORMAT") {
        Ok(value) => value.parse()?,
        Err(_) => LogFormat::Pretty,
    };
    let log_file = env::var("TRACEDUMP_LOG_FILE").ok().map(PathBuf::from);

    install(format, None, true, log_file.as_deref())
}

/// Initialize console logging with an explicit level and format
///
/// `RUST_LOG` is ignored; `TRACEDUMP_LOG_FILE` is still honoured.
///
/// ## Errors
///
/// Returns an error if logging is already initialized or file logging fails.
pub fn init_logging_with_level(level: LogLevel, format: LogFormat) -> Result<(), LoggingError>
{
    let log_file = env::var("TRACEDUMP_LOG_FILE").ok().map(PathBuf::from);
    install(format, Some(level.into()), true, log_file.as_deref())
}

/// Initialize file-only logging
///
/// For hosts injected into a process without a usable console. When `level`
/// is `None`, `RUST_LOG` or `INFO` applies.
///
/// ## Errors
///
/// Returns an error if logging is already initialized or the file cannot be created.
pub fn init_logging_to_file(path: &Path, level: Option<LogLevel>, format: LogFormat) -> Result<(), LoggingError>
{
    install(format, level.map(Into::into), false, Some(path))
}

fn install(format: LogFormat, level: Option<Level>, console: bool, log_file: Option<&Path>) -> Result<(), LoggingError>
{
    let mut layers: Vec<BoxedLayer> = Vec::new();

    if console {
        layers.push(fmt_layer(format, io::stdout, true, build_filter(level)));
    }
    if let Some(path) = log_file {
        // No ANSI in files
        layers.push(fmt_layer(format, file_writer(path)?, false, build_filter(level)));
    }

    Registry::default()
        .with(layers)
        .try_init()
        .map_err(|err| LoggingError::InitializationFailed(err.to_string()))
}

/// Explicit level first, then `RUST_LOG`, then `INFO`.
fn build_filter(level: Option<Level>) -> EnvFilter
{
    match level {
        Some(level) => EnvFilter::new(level.to_string()),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(Level::INFO.to_string())),
    }
}

fn fmt_layer<W>(format: LogFormat, writer: W, ansi: bool, filter: EnvFilter) -> BoxedLayer
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let layer = fmt::layer()
        .with_writer(writer)
        .with_target(true)
        .with_thread_ids(true)
        .with_thread_names(true)
        .with_file(true)
        .with_line_number(true)
        .with_timer(ChronoUtc::rfc_3339());

    match format {
        LogFormat::Pretty => layer.with_ansi(ansi).with_filter(filter).boxed(),
        LogFormat::Json => layer
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_filter(filter)
            .boxed(),
    }
}

fn file_writer(path: &Path) -> Result<NonBlocking, LoggingError>
{
    let directory = path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(directory)?;

    let file_name = path
        .file_name()
        .ok_or_else(|| LoggingError::InitializationFailed(format!("{} has no file name", path.display())))?;
    let appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(file_name.to_string_lossy().into_owned())
        .build(directory)
        .map_err(|err| LoggingError::InitializationFailed(err.to_string()))?;

    let (writer, guard) = tracing_appender::non_blocking(appender);
    // The worker must outlive every traced call; the host process owns our lifetime.
    std::mem::forget(guard);
    Ok(writer)
}

/// Logging initialization error
#[derive(Debug, thiserror::Error)]
pub enum LoggingError
{
    /// Invalid log format
    #[error("Invalid log format: {0}. Use 'pretty' or 'json'")]
    InvalidFormat(String),

    /// Invalid log level
    #[error("Invalid log level: {0}. Use 'error', 'warn', 'info', 'debug', or 'trace'")]
    InvalidLevel(String),

    /// Failed to initialize logging
    #[error("Failed to initialize logging: {0}")]
    InitializationFailed(String),

    /// File logging error
    #[error("File logging error: {0}")]
    FileError(#[from] io::Error),
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_log_format_from_str()
    {
        assert_eq!(LogFormat::from_str("pretty").unwrap(), LogFormat::Pretty);
        assert_eq!(LogFormat::from_str("JSON").unwrap(), LogFormat::Json);
        assert_eq!(LogFormat::from_str("text").unwrap(), LogFormat::Pretty);
        assert!(matches!(
            LogFormat::from_str("xml"),
            Err(LoggingError::InvalidFormat(value)) if value == "xml"
        ));
    }

    #[test]
    fn test_log_level_from_str()
    {
        assert_eq!(LogLevel::from_str("error").unwrap(), LogLevel::Error);
        assert_eq!(LogLevel::from_str("warning").unwrap(), LogLevel::Warn);
        assert_eq!(LogLevel::from_str("info").unwrap(), LogLevel::Info);
        assert_eq!(LogLevel::from_str("dbg").unwrap(), LogLevel::Debug);
        assert_eq!(LogLevel::from_str("trace").unwrap(), LogLevel::Trace);
        assert!(matches!(LogLevel::from_str("loud"), Err(LoggingError::InvalidLevel(_))));
    }

    #[test]
    fn test_log_level_to_tracing_level()
    {
        assert_eq!(Level::from(LogLevel::Error), Level::ERROR);
        assert_eq!(Level::from(LogLevel::Info), Level::INFO);
        assert_eq!(Level::from(LogLevel::Trace), Level::TRACE);
    }

    #[test]
    fn test_second_initialization_fails()
    {
        // Another test binary may already own the global subscriber.
        let _ = init_logging_with_level(LogLevel::Debug, LogFormat::Pretty);
        assert!(matches!(
            init_logging_with_level(LogLevel::Debug, LogFormat::Json),
            Err(LoggingError::InitializationFailed(_))
        ));
    }
}
