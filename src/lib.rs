//! # Ringlog
//!
//! A leveled, timestamped logger that many threads can write to at once.
//!
//! ## Features
//!
//! - Lines stamped with a resolved timezone label and the application name
//! - In-memory buffering that flushes to a bounded ring of numbered files
//! - Rotation on a background worker, off the logging caller's path
//! - A separate fatal path that persists the terminal event and exits
//!
//! ## Example
//!
//! ```rust,no_run
//! use ringlog::{Logger, LoggerConfig};
//!
//! let config = LoggerConfig::new("orders")
//!     .with_destination("logs")
//!     .with_buffer_capacity(1000)
//!     .with_backup_count(4)
//!     .with_timezone("IST");
//! let logger = Logger::new(&config)?;
//!
//! logger.info("This is an info message");
//! logger.warnf(format_args!("retrying in {}s", 5));
//! logger.shutdown();
//! # Ok::<(), ringlog::Error>(())
//! ```

pub mod buffer;
pub mod builder;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod fatal;
pub mod format;
pub mod level;
pub mod logger;
pub mod rotation;
pub mod timezone;
pub mod writer;

pub use builder::LoggerBuilder;
pub use config::{DiagnosticsConfig, LoggerConfig, RotationDispatch};
pub use diagnostics::init_diagnostics;
pub use error::{Error, Result};
pub use fatal::FatalLog;
pub use format::LogLine;
pub use level::Level;
pub use logger::Logger;
pub use timezone::TimeZone;

/// Start building a logger for `app_name`.
pub fn builder(app_name: impl Into<String>) -> LoggerBuilder {
    LoggerBuilder::new(app_name)
}
