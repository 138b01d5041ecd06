//! Builder pattern for creating a [`Logger`].
//!
//! # Example
//!
//! ```rust,no_run
//! let logger = ringlog::builder("orders")
//!     .with_destination("/var/log/orders")
//!     .with_buffer_capacity(500)
//!     .with_backup_count(10)
//!     .with_timezone("UTC")
//!     .init()
//!     .expect("Failed to create logger");
//!
//! logger.info("service started");
//! logger.infof(format_args!("listening on port {}", 8080));
//! logger.shutdown();
//! ```

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use crate::fatal::{FatalLog, Terminator};
use crate::logger::Overrides;
use crate::{Logger, LoggerConfig, Result, RotationDispatch};

/// A builder for configuring and creating a logger.
///
/// Besides the serializable [`LoggerConfig`] it accepts a custom sink, a
/// private fatal log and a terminator, which is how tests observe fatal events
/// without exiting.
pub struct LoggerBuilder {
    config: LoggerConfig,
    overrides: Overrides,
}

impl LoggerBuilder {
    /// Create a LoggerBuilder with default configuration.
    pub fn new(app_name: impl Into<String>) -> Self {
        Self::from_config(LoggerConfig::new(app_name))
    }

    /// Create a LoggerBuilder from an existing configuration.
    pub fn from_config(config: LoggerConfig) -> Self {
        Self {
            config,
            overrides: Overrides::default(),
        }
    }

    /// Buffer to a rotation ring in this directory.
    pub fn with_destination(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config = self.config.with_destination(dir);
        self
    }

    pub fn with_buffer_capacity(mut self, capacity: usize) -> Self {
        self.config = self.config.with_buffer_capacity(capacity);
        self
    }

    pub fn with_backup_count(mut self, count: usize) -> Self {
        self.config = self.config.with_backup_count(count);
        self
    }

    pub fn with_timezone(mut self, code: impl Into<String>) -> Self {
        self.config = self.config.with_timezone(code);
        self
    }

    pub fn with_console(mut self, console: bool) -> Self {
        self.config = self.config.with_console(console);
        self
    }

    pub fn with_dispatch(mut self, dispatch: RotationDispatch) -> Self {
        self.config = self.config.with_dispatch(dispatch);
        self
    }

    /// Set the process-wide fatal file used if no fatal log is injected.
    pub fn with_fatal_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config = self.config.with_fatal_path(path);
        self
    }

    /// Write live lines here instead of stdout.
    pub fn with_sink(mut self, sink: impl Write + Send + 'static) -> Self {
        self.overrides.sink = Some(Box::new(sink));
        self
    }

    /// Use this fatal log instead of the process-wide one.
    pub fn with_fatal_log(mut self, fatal: Arc<FatalLog>) -> Self {
        self.overrides.fatal = Some(fatal);
        self
    }

    /// Replace process exit after a fatal event.
    pub fn with_terminator(mut self, terminate: impl Fn(i32) + Send + Sync + 'static) -> Self {
        let terminate: Terminator = Arc::new(terminate);
        self.overrides.terminate = Some(terminate);
        self
    }

    /// Get the current configuration without creating a logger.
    pub fn build(self) -> LoggerConfig {
        self.config
    }

    /// Create the logger.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The configuration is invalid
    /// - The destination directory cannot be recreated
    pub fn init(self) -> Result<Logger> {
        Logger::with_overrides(&self.config, self.overrides)
    }
}
