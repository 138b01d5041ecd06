//! Logs a handful of lines at every level to a rotation ring in `./log`.
//!
//! Run with:
//! ```bash
//! cargo run --example basic
//! ```

use ringlog::{Logger, LoggerConfig};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = LoggerConfig::new("test")
        .with_destination("log")
        .with_buffer_capacity(80_000)
        .with_backup_count(40);
    let logger = Logger::new(&config)?;

    logger.debugf(format_args!("This is a formatted debug message with args: {}", "arg1"));
    logger.infof(format_args!("This is a formatted info message with args: {}", "arg1"));
    logger.warnf(format_args!("This is a formatted warn message with args: {}", "arg1"));
    logger.errorf(format_args!("This is a formatted error message with args: {}", "arg1"));

    logger.debug("This is a debug message");
    logger.info("This is a info message");
    logger.warn("This is a warn message");
    logger.error("This is a error message");

    logger.shutdown();
    Ok(())
}
