//! End-to-end API test suites for two public REST services.
//!
//! The suites exercise a mock REST API (user lookup, create/update/delete
//! echoes, register/login) and a bearer-authenticated user-management
//! sandbox API (full CRUD with server-assigned ids). Suite bodies live in
//! [`scenarios`] and are parameterized by base URL and token, so the same
//! body runs both hermetically against the in-process stand-ins in
//! [`mock_api`] and, when ignored tests are opted in, against the live
//! services.
//!
//! Each test binary wires one [`TestServices`] instance through
//! [`test_services`]; its report lands in `test-results/reports/` named
//! after the suite.

use once_cell::sync::OnceCell;
use restprobe_harness::{RunConfig, TestServices};

pub mod mock_api;
pub mod payloads;
pub mod scenarios;

/// Default base URL of the mock REST API
pub const MOCK_API_URL: &str = "https://reqres.in/api";

/// Default base URL of the user-management sandbox API
pub const SANDBOX_API_URL: &str = "https://gorest.co.in/public/v2";

pub const ENV_MOCK_API_URL: &str = "RESTPROBE_MOCK_API_URL";
pub const ENV_SANDBOX_API_URL: &str = "RESTPROBE_SANDBOX_API_URL";

static SERVICES: OnceCell<TestServices> = OnceCell::new();

/// Shared services for one test binary, built on first use.
///
/// The suite name becomes the report title and file stem; every fixture
/// in the binary appends to the same report document. A report sink that
/// cannot be set up aborts the run before any case executes.
pub fn test_services(suite: &str) -> &'static TestServices {
    SERVICES.get_or_init(|| match TestServices::init(&RunConfig::new(suite)) {
        Ok(services) => services,
        Err(err) => panic!("cannot initialize test services for {suite}: {err}"),
    })
}

fn env_url(var: &str, default: &str) -> String {
    std::env::var(var)
        .ok()
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Mock API base URL, honoring the `RESTPROBE_MOCK_API_URL` override.
pub fn mock_api_url() -> String {
    env_url(ENV_MOCK_API_URL, MOCK_API_URL)
}

/// Sandbox API base URL, honoring the `RESTPROBE_SANDBOX_API_URL` override.
pub fn sandbox_api_url() -> String {
    env_url(ENV_SANDBOX_API_URL, SANDBOX_API_URL)
}
