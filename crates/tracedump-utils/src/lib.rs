//! # tracedump utilities
//!
//! Logging setup for hosts that embed the tracer.
//!
//! The tracer reports its lines through `tracing`; this crate installs a
//! subscriber that sends them (and the tracer's own diagnostics) to the
//! console and optionally to a log file.

pub mod logging;

// Re-export commonly used logging functions for convenience
pub use logging::{init_logging, init_logging_to_file, init_logging_with_level, LogFormat, LogLevel, LoggingError};
pub use tracing::{debug, error, info, trace, warn};
