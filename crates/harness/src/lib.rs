//! Test harness for the restprobe API suites.
//!
//! The harness owns everything around a suite's HTTP calls: process-wide
//! logging with a daily-rolling file sink ([`logging`]), an HTML run
//! report of named nodes with info/pass/fail events ([`report`]), the
//! request context with its explicit-result assertion surface
//! ([`context`]), and the fixture lifecycle that ties them together
//! ([`fixture`]).
//!
//! Services are injected, not global: a suite builds one
//! [`TestServices`] from a [`RunConfig`] and passes it to each
//! [`ApiFixture`]. A fixture is configured with a base URL, an optional
//! bearer token and an optional priming call; its `run_case` wrapper is
//! the only place pass/fail bookkeeping happens, and its `teardown`
//! releases the context and flushes both sinks on every path.

pub mod context;
pub mod error;
pub mod fixture;
pub mod logging;
pub mod report;
pub mod services;
pub mod settings;

pub use context::{ApiContext, ApiResponse, ContextConfig, DEFAULT_TIMEOUT};
pub use error::{HarnessError, HarnessResult};
pub use fixture::{ApiFixture, CaseContext, FixtureConfig, FixtureState, PrimingCall};
pub use logging::{LogConfig, LogHandle};
pub use report::{EventLevel, ReportNode, ReportSummary, RunReporter};
pub use services::{RunConfig, TestServices};
pub use settings::Settings;
