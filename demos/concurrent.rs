//! Many threads sharing one logger, then a fatal event.
//!
//! Run with:
//! ```bash
//! cargo run --example concurrent
//! ```
//! The process exits with status 1 after writing `fatal-log.log`.

use std::sync::Arc;
use std::thread;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let logger = Arc::new(
        ringlog::builder("workers")
            .with_destination("target/concurrent-logs")
            .with_buffer_capacity(50)
            .with_backup_count(5)
            .with_console(false)
            .init()?,
    );

    let handles: Vec<_> = (0..100)
        .map(|t| {
            let logger = Arc::clone(&logger);
            thread::spawn(move || {
                for i in 0..10 {
                    logger.infof(format_args!("worker {} finished job {}", t, i));
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("worker panicked");
    }

    let async_logger = Arc::clone(&logger);
    tokio::spawn(async move { async_logger.warn("async task checking in") }).await?;

    logger.fatal("simulated unrecoverable failure");
    Ok(())
}
