use std::io::{self, Write};
use std::sync::{Arc, Condvar, Mutex, MutexGuard};

use tracing_appender::non_blocking::{NonBlocking, NonBlockingBuilder, WorkerGuard};

use crate::RotationDispatch;
use crate::rotation::{RotationEngine, encode};

/// Counts batches handed to the worker against batches it has finished.
#[derive(Debug, Default)]
pub struct Backlog {
    counts: Mutex<BacklogCounts>,
    settled: Condvar,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct BacklogCounts {
    queued: u64,
    done: u64,
}

impl Backlog {
    fn lock(&self) -> MutexGuard<'_, BacklogCounts> {
        self.counts.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn queued(&self) {
        self.lock().queued += 1;
    }

    fn done(&self) {
        self.lock().done += 1;
        self.settled.notify_all();
    }

    /// Batches queued but not yet written (or failed).
    pub fn outstanding(&self) -> u64 {
        let counts = self.lock();
        counts.queued.saturating_sub(counts.done)
    }

    /// Block until every queued batch has been handled.
    pub fn wait(&self) {
        let counts = self.lock();
        let _settled = self
            .settled
            .wait_while(counts, |c| c.done < c.queued)
            .unwrap_or_else(|poisoned| poisoned.into_inner());
    }
}

/// Adapts a [`RotationEngine`] to `io::Write` for the background worker.
///
/// Every `write` call carries exactly one sealed, newline-terminated batch and
/// lands in one ring slot. Failures are reported here and swallowed so the
/// worker keeps running.
pub struct RingWriter {
    engine: Arc<RotationEngine>,
    backlog: Arc<Backlog>,
}

impl RingWriter {
    pub fn new(engine: Arc<RotationEngine>, backlog: Arc<Backlog>) -> Self {
        Self { engine, backlog }
    }
}

impl Write for RingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if !buf.is_empty()
            && let Err(e) = self.engine.write_encoded(buf)
        {
            tracing::error!(
                dir = %self.engine.dir().display(),
                error = %e,
                "rotation failed, batch dropped"
            );
        }
        self.backlog.done();
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Hands sealed batches to the rotation engine.
pub(crate) enum Dispatcher {
    /// Rotate on the thread whose append filled the buffer.
    Inline(Arc<RotationEngine>),
    /// Rotate on a single worker thread, one batch at a time.
    Background {
        engine: Arc<RotationEngine>,
        backlog: Arc<Backlog>,
        /// `None` once the worker has been stopped.
        worker: Mutex<Option<(NonBlocking, WorkerGuard)>>,
    },
}

impl Dispatcher {
    pub(crate) fn new(engine: Arc<RotationEngine>, mode: RotationDispatch) -> Self {
        match mode {
            RotationDispatch::Inline => Self::Inline(engine),
            RotationDispatch::Background => {
                let backlog = Arc::new(Backlog::default());
                let worker = NonBlockingBuilder::default()
                    .lossy(false)
                    .thread_name("ringlog-rotation")
                    .finish(RingWriter::new(Arc::clone(&engine), Arc::clone(&backlog)));
                Self::Background {
                    engine,
                    backlog,
                    worker: Mutex::new(Some(worker)),
                }
            }
        }
    }

    pub(crate) fn engine(&self) -> &RotationEngine {
        match self {
            Self::Inline(engine) => engine,
            Self::Background { engine, .. } => engine,
        }
    }

    pub(crate) fn dispatch(&self, batch: Vec<String>) {
        match self {
            Self::Inline(engine) => rotate_reporting(engine, &batch),
            Self::Background {
                engine,
                backlog,
                worker,
            } => {
                if batch.is_empty() {
                    return;
                }
                let mut worker = worker
                    .lock()
                    .unwrap_or_else(|poisoned| poisoned.into_inner());
                // Counted before the send so the worker can never finish a
                // batch `finish` does not know about.
                let sent = match worker.as_mut() {
                    Some((sender, _)) => {
                        backlog.queued();
                        let sent = sender.write_all(&encode(&batch)).is_ok();
                        if !sent {
                            backlog.done();
                        }
                        sent
                    }
                    None => false,
                };
                if !sent {
                    // Worker stopped; keep the lines rather than lose them.
                    tracing::debug!("rotation worker gone, rotating inline");
                    rotate_reporting(engine, &batch);
                }
            }
        }
    }

    /// Rotate on the calling thread, whatever the mode.
    pub(crate) fn rotate_now(&self, batch: &[String]) {
        rotate_reporting(self.engine(), batch);
    }

    /// Wait for every queued rotation to be written, then stop the worker.
    ///
    /// Batches dispatched afterwards rotate inline.
    pub(crate) fn finish(&self) {
        if let Self::Background {
            backlog, worker, ..
        } = self
        {
            let mut worker = worker
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            if worker.is_some() {
                backlog.wait();
            }
            // The guard's own wait is time-bounded; the backlog is already empty here.
            drop(worker.take());
        }
    }

    /// Batches handed to the worker that it has not written yet.
    pub(crate) fn outstanding(&self) -> u64 {
        match self {
            Self::Inline(_) => 0,
            Self::Background { backlog, .. } => backlog.outstanding(),
        }
    }
}

fn rotate_reporting(engine: &RotationEngine, batch: &[String]) {
    if let Err(e) = engine.rotate(batch) {
        tracing::error!(
            dir = %engine.dir().display(),
            lines = batch.len(),
            error = %e,
            "rotation failed, batch dropped"
        );
    }
}
