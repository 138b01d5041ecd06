//! The fatal path.
//!
//! Fatal events never enter the buffer. They are written synchronously to a
//! single process-wide file that lives outside the rotation ring, together with
//! whatever was still buffered, and then the process is terminated.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use once_cell::sync::OnceCell;

/// Default location of the fatal-events file, relative to the working directory.
pub const DEFAULT_FATAL_FILE: &str = "fatal-log.log";

/// Exit status used after a fatal event.
pub const FATAL_EXIT_CODE: i32 = 1;

static GLOBAL_FATAL_LOG: OnceCell<Arc<FatalLog>> = OnceCell::new();

/// Called with the exit status once a fatal event is recorded.
pub type Terminator = Arc<dyn Fn(i32) + Send + Sync>;

/// The terminator used unless one is injected: exits the process.
pub fn exit_process() -> Terminator {
    Arc::new(|code| std::process::exit(code))
}

/// Owner of the fatal-events file.
///
/// The file is not touched until the first record. That first record truncates
/// whatever a previous run left behind; later records in the same process
/// append.
#[derive(Debug)]
pub struct FatalLog {
    path: PathBuf,
    truncated: Mutex<bool>,
}

impl FatalLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            truncated: Mutex::new(false),
        }
    }

    /// Initialize the process-wide fatal log at `path`.
    ///
    /// Only the first call decides the path; later calls return the existing
    /// instance.
    pub fn init_global(path: impl Into<PathBuf>) -> Arc<FatalLog> {
        let path = path.into();
        let log = GLOBAL_FATAL_LOG.get_or_init(|| Arc::new(FatalLog::new(&path)));
        if log.path != path {
            tracing::warn!(
                requested = %path.display(),
                active = %log.path.display(),
                "fatal log already initialized elsewhere"
            );
        }
        Arc::clone(log)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the pending lines and then the fatal line, each newline-terminated.
    pub fn record(&self, pending: &[String], line: &str) -> io::Result<()> {
        let mut truncated = self
            .truncated
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let mut options = OpenOptions::new();
        options.create(true);
        if *truncated {
            options.append(true);
        } else {
            options.write(true).truncate(true);
        }
        let mut file = options.open(&self.path)?;
        *truncated = true;

        for buffered in pending {
            writeln!(file, "{}", buffered)?;
        }
        writeln!(file, "{}", line)?;
        file.flush()
    }
}
