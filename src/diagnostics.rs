//! Routing for the library's own diagnostics.
//!
//! Rotation and fatal-path failures are reported as `tracing` events rather
//! than returned to the logging caller. [`init_diagnostics`] installs a stderr
//! subscriber for them; applications that already have a subscriber can skip
//! it.

use crate::{DiagnosticsConfig, Error, Result};
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

/// Install a stderr subscriber with the given configuration.
pub fn init_diagnostics(config: &DiagnosticsConfig) -> Result<()> {
    let spec = effective_diagnostics_spec(config);
    let env_filter = EnvFilter::try_new(&spec).map_err(|e| Error::Init(e.to_string()))?;

    let fmt_layer_builder = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_names(true);

    let fmt_layer = if config.format == "json" {
        fmt_layer_builder.json().boxed()
    } else {
        fmt_layer_builder.boxed()
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| Error::Init(e.to_string()))?;

    Ok(())
}

/// A non-empty `RUST_LOG` wins over the configured level.
fn effective_diagnostics_spec(config: &DiagnosticsConfig) -> String {
    if let Ok(rust_log) = std::env::var("RUST_LOG")
        && !rust_log.is_empty()
    {
        return rust_log;
    }

    if config.level.is_empty() {
        "info,ringlog=info".to_string()
    } else {
        format!("{},ringlog={}", config.level, config.level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Tests in this module read or write RUST_LOG.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn with_rust_log<T>(value: Option<&str>, f: impl FnOnce() -> T) -> T {
        let _lock = ENV_LOCK.lock().unwrap_or_else(|p| p.into_inner());
        let prev = std::env::var_os("RUST_LOG");
        unsafe {
            match value {
                Some(v) => std::env::set_var("RUST_LOG", v),
                None => std::env::remove_var("RUST_LOG"),
            }
        }
        let out = f();
        unsafe {
            match prev {
                Some(v) => std::env::set_var("RUST_LOG", v),
                None => std::env::remove_var("RUST_LOG"),
            }
        }
        out
    }

    #[test]
    fn rust_log_overrides_config_level() {
        let cfg = DiagnosticsConfig::new().with_level("info");
        let spec = with_rust_log(Some("trace"), || effective_diagnostics_spec(&cfg));
        assert_eq!(spec, "trace");
    }

    #[test]
    fn cfg_level_used_when_rust_log_empty() {
        let cfg = DiagnosticsConfig::new().with_level("warn");
        let spec = with_rust_log(Some(""), || effective_diagnostics_spec(&cfg));
        assert_eq!(spec, "warn,ringlog=warn");
    }

    #[test]
    fn empty_level_defaults_to_info() {
        let cfg = DiagnosticsConfig::new().with_level("");
        let spec = with_rust_log(None, || effective_diagnostics_spec(&cfg));
        assert_eq!(spec, "info,ringlog=info");
    }

    #[test]
    fn init_diagnostics_twice_fails() {
        let cfg = DiagnosticsConfig::new().with_format("json");
        let first = with_rust_log(None, || init_diagnostics(&cfg));
        assert!(first.is_ok());
        let second = with_rust_log(None, || init_diagnostics(&cfg));
        assert!(matches!(second, Err(Error::Init(_))));
    }
}
