//! Example of loading logger configuration from a TOML file.
//!
//! Run with:
//! ```bash
//! cargo run --example config_toml
//! ```

use serde::Deserialize;
use std::fs;

#[derive(Deserialize)]
struct Config {
    #[serde(default)]
    diagnostics: ringlog::DiagnosticsConfig,
    logger: ringlog::LoggerConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = "demos/logger.toml";
    let config_content = fs::read_to_string(config_path)
        .unwrap_or_else(|_| panic!("Failed to read config file: {}", config_path));

    let root: Config = toml::from_str(&config_content)?;

    // Rotation failures and lifecycle events show up on stderr.
    ringlog::init_diagnostics(&root.diagnostics)?;

    let logger = ringlog::Logger::new(&root.logger)?;
    for i in 0..10 {
        logger.infof(format_args!("restocked item {}", i));
    }
    logger.warn("warehouse B is running low");

    // Ten lines with a capacity of four: two full slots, the rest on shutdown.
    logger.shutdown();
    Ok(())
}
