//! Logging bootstrap - console output plus a daily-rolling log file
//!
//! The subscriber is process-wide. The first [`init`] call installs it and
//! owns the file writer; later calls (e.g. from a second fixture racing the
//! first) are a harmless no-op that returns a handle without a file guard.

use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::error::HarnessResult;

/// Configuration for the run-wide logging sink
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Directory for the rolling log files (created if absent)
    pub dir: PathBuf,

    /// File name prefix; the appender adds a date suffix per day
    pub file_prefix: String,

    /// Default filter directive when RUST_LOG is not set
    pub filter: String,

    /// Also emit to the test runner's output channel
    pub console: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("test-results/logs"),
            file_prefix: "restprobe.log".to_string(),
            filter: "info".to_string(),
            console: true,
        }
    }
}

/// Handle to the logging sink, owning the background file writer.
///
/// Dropping the last clone (or calling [`LogHandle::flush`]) stops the
/// writer and forces buffered records to disk. The handle is shared by
/// every fixture in the run, so `flush` is idempotent.
#[derive(Clone)]
pub struct LogHandle {
    guard: Arc<Mutex<Option<WorkerGuard>>>,
}

impl LogHandle {
    fn new(guard: Option<WorkerGuard>) -> Self {
        Self {
            guard: Arc::new(Mutex::new(guard)),
        }
    }

    /// Flush buffered file writes and close the writer. Safe to call more
    /// than once; only the first call does any work. Console output is
    /// unaffected.
    pub fn flush(&self) {
        let guard = self.guard.lock().take();
        drop(guard);
    }

    /// Whether this handle still owns the background file writer.
    pub fn is_open(&self) -> bool {
        self.guard.lock().is_some()
    }
}

/// Initialize the process-wide logging sink.
///
/// Creates the log directory, then installs a subscriber with an
/// env-filtered console layer and a non-ANSI daily-rolling file layer.
/// RUST_LOG takes precedence over the configured filter.
pub fn init(config: &LogConfig) -> HarnessResult<LogHandle> {
    std::fs::create_dir_all(&config.dir)?;

    let file_appender = tracing_appender::rolling::daily(&config.dir, &config.file_prefix);
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.filter));

    let file_layer = fmt::layer()
        .with_target(true)
        .with_ansi(false)
        .with_writer(file_writer);

    let console_layer = config
        .console
        .then(|| fmt::layer().with_target(false).with_test_writer());

    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .is_ok();

    if installed {
        Ok(LogHandle::new(Some(guard)))
    } else {
        // A subscriber is already set for this process; drop our writer so
        // its worker thread exits, and hand back a guard-less handle.
        drop(guard);
        Ok(LogHandle::new(None))
    }
}
