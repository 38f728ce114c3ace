//! Sandbox-API user CRUD suite.
//!
//! Runs hermetically against the in-process stand-in by default; the
//! ignored twin drives the same chain against the live service.

use restprobe_harness::Settings;
use restprobe_suites::mock_api::StubApi;
use restprobe_suites::{sandbox_api_url, scenarios, test_services};

#[tokio::test]
async fn user_crud_chain() {
    let services = test_services("user_crud");
    let stub = StubApi::spawn_sandbox()
        .await
        .expect("spawn sandbox stand-in");
    scenarios::user_crud_chain(services, &stub.base_url(), "stub-token")
        .await
        .expect("crud chain against the stand-in");
}

/// Runs the same chain against the live sandbox API, with the token from
/// `ACCESS_TOKEN` or `config/settings.toml`.
///
/// Marked ignored because it needs a real access token and performs
/// writes against the public service.
#[tokio::test]
#[ignore]
async fn user_crud_chain_live() {
    let services = test_services("user_crud");
    let settings = Settings::load().expect("load settings");
    let Some(token) = settings.access_token else {
        eprintln!("no access token configured; skipping live crud chain");
        return;
    };
    scenarios::user_crud_chain(services, &sandbox_api_url(), &token)
        .await
        .expect("crud chain against the live API");
}
