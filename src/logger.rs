use std::fmt;
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::buffer::BufferStore;
use crate::fatal::{FATAL_EXIT_CODE, FatalLog, Terminator, exit_process};
use crate::format::format_line;
use crate::rotation::{RotationEngine, recreate_dir};
use crate::timezone::TimeZone;
use crate::writer::Dispatcher;
use crate::{Level, LoggerConfig, Result};

type Sink = Box<dyn Write + Send>;

/// The buffer and the ring it drains into; present only with a destination.
struct Buffered {
    store: BufferStore,
    dispatcher: Dispatcher,
}

/// A leveled logger safe to share between threads.
///
/// Every call formats its line immediately, writes it to the live sink and,
/// when a destination directory is configured, appends it to the buffer. The
/// sink and the buffer sit behind separate locks so a rotation never stalls
/// writes to the sink.
pub struct Logger {
    app_name: String,
    zone: TimeZone,
    sink: Mutex<Option<Sink>>,
    buffered: Option<Buffered>,
    fatal: Arc<FatalLog>,
    terminate: Terminator,
    closed: AtomicBool,
}

/// Pieces a builder may supply instead of the defaults.
#[derive(Default)]
pub(crate) struct Overrides {
    pub(crate) sink: Option<Sink>,
    pub(crate) fatal: Option<Arc<FatalLog>>,
    pub(crate) terminate: Option<Terminator>,
}

impl Logger {
    /// Create a logger from a configuration.
    ///
    /// With a destination, the directory is removed and created again empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the destination
    /// directory cannot be recreated.
    pub fn new(config: &LoggerConfig) -> Result<Self> {
        Self::with_overrides(config, Overrides::default())
    }

    pub(crate) fn with_overrides(config: &LoggerConfig, overrides: Overrides) -> Result<Self> {
        let config = config.validated()?;
        let zone = TimeZone::resolve(&config.timezone);

        let buffered = match config.buffered_destination() {
            Some(dir) => {
                recreate_dir(dir)?;
                let engine = Arc::new(RotationEngine::new(dir, config.backup_count));
                Some(Buffered {
                    store: BufferStore::new(config.buffer_capacity),
                    dispatcher: Dispatcher::new(engine, config.dispatch),
                })
            }
            None => None,
        };

        let sink: Sink = match overrides.sink {
            Some(sink) => sink,
            None if buffered.is_none() || config.console => Box::new(io::stdout()),
            None => Box::new(io::sink()),
        };
        let fatal = overrides
            .fatal
            .unwrap_or_else(|| FatalLog::init_global(&config.fatal_path));

        tracing::debug!(
            app = %config.app_name,
            zone = %zone.label(),
            buffered = buffered.is_some(),
            "logger created"
        );

        Ok(Self {
            app_name: config.app_name,
            zone,
            sink: Mutex::new(Some(sink)),
            buffered,
            fatal,
            terminate: overrides.terminate.unwrap_or_else(exit_process),
            closed: AtomicBool::new(false),
        })
    }

    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    pub fn time_zone(&self) -> &TimeZone {
        &self.zone
    }

    /// Whether lines are buffered for rotation.
    pub fn is_buffered(&self) -> bool {
        self.buffered.is_some()
    }

    /// Lines waiting in the buffer.
    pub fn pending(&self) -> usize {
        self.buffered.as_ref().map_or(0, |b| b.store.len())
    }

    /// Ring slot the next rotation will write to.
    pub fn rotation_cursor(&self) -> Option<usize> {
        self.buffered.as_ref().map(|b| b.dispatcher.engine().cursor())
    }

    pub fn debug(&self, message: &str) {
        self.log(Level::Debug, message);
    }

    pub fn debugf(&self, args: fmt::Arguments<'_>) {
        self.log_fmt(Level::Debug, args);
    }

    pub fn info(&self, message: &str) {
        self.log(Level::Info, message);
    }

    pub fn infof(&self, args: fmt::Arguments<'_>) {
        self.log_fmt(Level::Info, args);
    }

    pub fn warn(&self, message: &str) {
        self.log(Level::Warn, message);
    }

    pub fn warnf(&self, args: fmt::Arguments<'_>) {
        self.log_fmt(Level::Warn, args);
    }

    pub fn error(&self, message: &str) {
        self.log(Level::Error, message);
    }

    pub fn errorf(&self, args: fmt::Arguments<'_>) {
        self.log_fmt(Level::Error, args);
    }

    /// Record a terminal event and terminate.
    ///
    /// Rotations already queued to the background worker are written to the
    /// ring first. The line and anything still buffered then go to the fatal
    /// file, never to the rotation ring. With the default terminator this does
    /// not return; if it does, later rotations run inline.
    pub fn fatal(&self, message: &str) {
        let line = format_line(&self.zone, Level::Fatal, &self.app_name, message);
        self.write_sink(&line);

        let pending = match &self.buffered {
            Some(buffered) => {
                buffered.dispatcher.finish();
                buffered.store.drain()
            }
            None => Vec::new(),
        };
        if let Err(e) = self.fatal.record(&pending, &line) {
            tracing::error!(
                path = %self.fatal.path().display(),
                error = %e,
                "failed to record fatal event"
            );
        }
        self.flush_sink();

        (self.terminate)(FATAL_EXIT_CODE);
    }

    pub fn fatalf(&self, args: fmt::Arguments<'_>) {
        self.fatal(&args.to_string());
    }

    /// Emit a line at any level.
    pub fn log(&self, level: Level, message: &str) {
        if level.is_fatal() {
            self.fatal(message);
            return;
        }
        if self.closed.load(Ordering::Acquire) {
            return;
        }

        let line = format_line(&self.zone, level, &self.app_name, message);
        self.write_sink(&line);

        if let Some(buffered) = &self.buffered {
            if let Some(batch) = buffered.store.append(line) {
                buffered.dispatcher.dispatch(batch);
            }
            if self.closed.load(Ordering::Acquire) {
                // Raced with shutdown; the final flush may already have run.
                buffered.dispatcher.rotate_now(&buffered.store.drain());
            }
        }
    }

    fn log_fmt(&self, level: Level, args: fmt::Arguments<'_>) {
        match args.as_str() {
            Some(message) => self.log(level, message),
            None => self.log(level, &args.to_string()),
        }
    }

    /// Flush whatever is still buffered and release the sink.
    ///
    /// Queued background rotations complete first, then pending lines go to
    /// the ring slot under the cursor. Only the first call has an effect; it
    /// also runs on drop.
    pub fn shutdown(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }

        if let Some(buffered) = &self.buffered {
            buffered.dispatcher.finish();
            let remaining = buffered.store.drain();
            tracing::debug!(lines = remaining.len(), "final flush");
            buffered.dispatcher.rotate_now(&remaining);
        }

        if let Some(mut sink) = self.lock_sink().take() {
            if let Err(e) = sink.flush() {
                tracing::warn!(error = %e, "failed to flush sink on shutdown");
            }
        }
    }

    fn write_sink(&self, line: &str) {
        if let Some(sink) = self.lock_sink().as_mut() {
            if let Err(e) = writeln!(sink, "{}", line) {
                tracing::debug!(error = %e, "sink write failed");
            }
        }
    }

    fn flush_sink(&self) {
        if let Some(sink) = self.lock_sink().as_mut() {
            let _ = sink.flush();
        }
    }

    fn lock_sink(&self) -> MutexGuard<'_, Option<Sink>> {
        self.sink.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("app_name", &self.app_name)
            .field("zone", &self.zone)
            .field("buffered", &self.is_buffered())
            .field("pending", &self.pending())
            .field("fatal_path", &self.fatal.path())
            .finish()
    }
}
