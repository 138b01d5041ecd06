use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::fatal::DEFAULT_FATAL_FILE;
use crate::rotation::MIN_BACKUP_COUNT;
use crate::{Error, Result};

/// Where a rotation runs once the buffer fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RotationDispatch {
    /// On a dedicated worker thread, off the logging caller's path.
    #[default]
    Background,
    /// On the thread whose call filled the buffer.
    Inline,
}

/// Configuration for one logger instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggerConfig {
    /// Application name stamped on every line
    pub app_name: String,
    /// Directory for the rotation ring; none writes to stdout without buffering
    #[serde(default)]
    pub destination: Option<PathBuf>,
    /// Lines accumulated before each rotation
    #[serde(default = "default_buffer_capacity")]
    pub buffer_capacity: usize,
    /// Number of ring slots (at least 2)
    #[serde(default = "default_backup_count")]
    pub backup_count: usize,
    /// Timezone code such as "IST" or "UTC"; empty means local time
    #[serde(default)]
    pub timezone: String,
    /// Mirror lines to stdout while buffering to the destination
    #[serde(default = "default_console")]
    pub console: bool,
    /// Where rotations run
    #[serde(default)]
    pub dispatch: RotationDispatch,
    /// Process-wide fatal events file
    #[serde(default = "default_fatal_path")]
    pub fatal_path: PathBuf,
}

impl LoggerConfig {
    /// Create a LoggerConfig with defaults
    pub fn new(app_name: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
            destination: None,
            buffer_capacity: default_buffer_capacity(),
            backup_count: default_backup_count(),
            timezone: String::new(),
            console: default_console(),
            dispatch: RotationDispatch::default(),
            fatal_path: default_fatal_path(),
        }
    }

    /// Set the rotation directory
    pub fn with_destination<P: Into<PathBuf>>(mut self, destination: P) -> Self {
        self.destination = Some(destination.into());
        self
    }

    /// Set the buffer capacity
    pub fn with_buffer_capacity(mut self, capacity: usize) -> Self {
        self.buffer_capacity = capacity;
        self
    }

    /// Set the number of ring slots
    pub fn with_backup_count(mut self, count: usize) -> Self {
        self.backup_count = count;
        self
    }

    /// Set the timezone code
    pub fn with_timezone(mut self, code: impl Into<String>) -> Self {
        self.timezone = code.into();
        self
    }

    /// Enable or disable the stdout mirror
    pub fn with_console(mut self, console: bool) -> Self {
        self.console = console;
        self
    }

    /// Set where rotations run
    pub fn with_dispatch(mut self, dispatch: RotationDispatch) -> Self {
        self.dispatch = dispatch;
        self
    }

    /// Set the fatal events file
    pub fn with_fatal_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.fatal_path = path.into();
        self
    }

    /// The destination, treating an empty path as none.
    pub fn buffered_destination(&self) -> Option<&Path> {
        self.destination
            .as_deref()
            .filter(|path| !path.as_os_str().is_empty())
    }

    /// Check the parameters and return a copy with the backup count coerced.
    pub fn validated(&self) -> Result<Self> {
        if self.app_name.contains('\n') || self.app_name.contains('\r') {
            return Err(Error::Config(
                "application name must not contain line breaks".to_string(),
            ));
        }
        if self.app_name.contains(": ") {
            return Err(Error::Config(format!(
                "application name must not contain \": \": {:?}",
                self.app_name
            )));
        }
        if self.buffer_capacity == 0 {
            return Err(Error::Config(
                "buffer capacity must be positive".to_string(),
            ));
        }
        if let Some(dir) = self.buffered_destination() {
            if dir.parent().is_none() || dir == Path::new(".") || dir == Path::new("..") {
                return Err(Error::Config(format!(
                    "refusing to recreate {} as a log directory",
                    dir.display()
                )));
            }
        }

        let mut config = self.clone();
        if config.backup_count < MIN_BACKUP_COUNT {
            tracing::debug!(
                requested = config.backup_count,
                used = MIN_BACKUP_COUNT,
                "backup count raised to minimum"
            );
            config.backup_count = MIN_BACKUP_COUNT;
        }
        Ok(config)
    }
}

fn default_buffer_capacity() -> usize {
    1000
}

fn default_backup_count() -> usize {
    MIN_BACKUP_COUNT
}

fn default_console() -> bool {
    true
}

fn default_fatal_path() -> PathBuf {
    PathBuf::from(DEFAULT_FATAL_FILE)
}

/// Configuration for the library's own diagnostics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosticsConfig {
    /// Level filter (e.g., "info", "debug")
    #[serde(default = "default_diagnostics_level")]
    pub level: String,
    /// Output format ("text" or "json")
    #[serde(default = "default_diagnostics_format")]
    pub format: String,
}

impl DiagnosticsConfig {
    pub fn new() -> Self {
        Self {
            level: default_diagnostics_level(),
            format: default_diagnostics_format(),
        }
    }

    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = format.into();
        self
    }
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn default_diagnostics_level() -> String {
    "info".to_string()
}

fn default_diagnostics_format() -> String {
    "text".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logger_config_new() {
        let config = LoggerConfig::new("svc");
        assert_eq!(config.app_name, "svc");
        assert!(config.destination.is_none());
        assert_eq!(config.buffer_capacity, 1000);
        assert_eq!(config.backup_count, 2);
        assert_eq!(config.timezone, "");
        assert!(config.console);
        assert_eq!(config.dispatch, RotationDispatch::Background);
        assert_eq!(config.fatal_path, PathBuf::from("fatal-log.log"));
    }

    #[test]
    fn test_logger_config_setters() {
        let config = LoggerConfig::new("svc")
            .with_destination("logs")
            .with_buffer_capacity(10)
            .with_backup_count(4)
            .with_timezone("IST")
            .with_console(false)
            .with_dispatch(RotationDispatch::Inline)
            .with_fatal_path("/tmp/fatal.log");
        assert_eq!(config.buffered_destination(), Some(Path::new("logs")));
        assert_eq!(config.buffer_capacity, 10);
        assert_eq!(config.backup_count, 4);
        assert_eq!(config.timezone, "IST");
        assert!(!config.console);
        assert_eq!(config.dispatch, RotationDispatch::Inline);
        assert_eq!(config.fatal_path, PathBuf::from("/tmp/fatal.log"));
    }

    #[test]
    fn test_empty_destination_means_stdout() {
        let config = LoggerConfig::new("svc").with_destination("");
        assert!(config.buffered_destination().is_none());
    }

    #[test]
    fn test_validated_coerces_backup_count() {
        let config = LoggerConfig::new("svc").with_backup_count(1);
        assert_eq!(config.validated().unwrap().backup_count, 2);
        let config = LoggerConfig::new("svc").with_backup_count(0);
        assert_eq!(config.validated().unwrap().backup_count, 2);
    }

    #[test]
    fn test_validated_rejects_bad_parameters() {
        assert!(matches!(
            LoggerConfig::new("svc").with_buffer_capacity(0).validated(),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            LoggerConfig::new("two\nlines").validated(),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            LoggerConfig::new("a: b").validated(),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            LoggerConfig::new("svc").with_destination("/").validated(),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            LoggerConfig::new("svc").with_destination(".").validated(),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_logger_config_from_yaml() {
        let yaml = r#"
app_name: billing
destination: /var/log/billing
buffer_capacity: 500
backup_count: 8
timezone: PST
dispatch: inline
"#;
        let config: LoggerConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.app_name, "billing");
        assert_eq!(config.destination, Some(PathBuf::from("/var/log/billing")));
        assert_eq!(config.buffer_capacity, 500);
        assert_eq!(config.backup_count, 8);
        assert_eq!(config.timezone, "PST");
        assert!(config.console);
        assert_eq!(config.dispatch, RotationDispatch::Inline);
    }

    #[test]
    fn test_logger_config_from_toml_defaults() {
        let config: LoggerConfig = toml::from_str(r#"app_name = "worker""#).unwrap();
        assert_eq!(config.app_name, "worker");
        assert!(config.destination.is_none());
        assert_eq!(config.buffer_capacity, 1000);
        assert_eq!(config.backup_count, 2);
        assert_eq!(config.dispatch, RotationDispatch::Background);
    }

    #[test]
    fn test_unknown_dispatch_is_rejected() {
        let result: std::result::Result<LoggerConfig, _> =
            serde_yaml::from_str("app_name: x\ndispatch: sometimes\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_diagnostics_config_defaults() {
        let config = DiagnosticsConfig::default();
        assert_eq!(config.level, "info");
        assert_eq!(config.format, "text");
        let config = config.with_level("debug").with_format("json");
        assert_eq!(config.level, "debug");
        assert_eq!(config.format, "json");
    }
}
