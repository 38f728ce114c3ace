//! Run-scoped services, built once and handed to every fixture
//!
//! [`TestServices`] bundles the shared report recorder and the logging
//! handle. Construction is explicit: a suite builds one instance from a
//! [`RunConfig`] and passes it to each fixture, so nothing in the harness
//! reaches for hidden global state.

use std::path::PathBuf;

use crate::error::HarnessResult;
use crate::logging::{self, LogConfig, LogHandle};
use crate::report::RunReporter;

/// Where one suite run writes its artifacts
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Suite name; doubles as the report title and file stem
    pub suite: String,

    pub log: LogConfig,

    /// Directory receiving `<suite>.html`
    pub report_dir: PathBuf,
}

impl RunConfig {
    pub fn new(suite: impl Into<String>) -> Self {
        Self {
            suite: suite.into(),
            log: LogConfig::default(),
            report_dir: PathBuf::from("test-results/reports"),
        }
    }

    pub fn report_path(&self) -> PathBuf {
        self.report_dir.join(format!("{}.html", self.suite))
    }
}

/// The injected service bundle. Clones share the same report document and
/// log writer.
#[derive(Clone)]
pub struct TestServices {
    reporter: RunReporter,
    log: LogHandle,
}

impl TestServices {
    /// Initialize logging and the report recorder for one run.
    ///
    /// A report recorder that cannot create its directory is a fatal
    /// error; the run must not proceed with a sink it cannot write.
    pub fn init(config: &RunConfig) -> HarnessResult<Self> {
        let log = logging::init(&config.log)?;
        tracing::info!(suite = %config.suite, report = %config.report_path().display(), "test services initialized");
        let reporter = RunReporter::create(&config.suite, config.report_path())?;
        Ok(Self { reporter, log })
    }

    pub fn reporter(&self) -> &RunReporter {
        &self.reporter
    }

    pub fn log(&self) -> &LogHandle {
        &self.log
    }
}
