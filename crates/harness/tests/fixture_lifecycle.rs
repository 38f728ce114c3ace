//! Fixture state machine checks that need no server: fixtures without a
//! priming call only do local work in setup, and a priming call against a
//! closed port fails immediately.

use restprobe_harness::{
    ApiFixture, FixtureConfig, FixtureState, HarnessError, LogConfig, PrimingCall, RunConfig,
    TestServices,
};
use serde_json::json;
use tempfile::TempDir;

fn scratch_run(dir: &TempDir, suite: &str) -> (TestServices, std::path::PathBuf) {
    let mut config = RunConfig::new(suite);
    config.log = LogConfig {
        dir: dir.path().join("logs"),
        file_prefix: "lifecycle-test.log".to_string(),
        filter: "info".to_string(),
        console: false,
    };
    config.report_dir = dir.path().join("reports");
    let report_path = config.report_path();
    let services = TestServices::init(&config).expect("init scratch services");
    (services, report_path)
}

#[tokio::test]
async fn lifecycle_reaches_disposed_and_teardown_repeats() {
    let dir = TempDir::new().expect("temp dir");
    let (services, report_path) = scratch_run(&dir, "lifecycle_happy");

    let mut fixture = ApiFixture::new(
        FixtureConfig::new("happy path", "http://127.0.0.1:1/api"),
        &services,
    );
    assert_eq!(fixture.state(), FixtureState::Uninitialized);
    assert!(!fixture.has_context());

    fixture.setup().await.expect("setup without priming is local");
    assert_eq!(fixture.state(), FixtureState::Ready);
    assert!(fixture.has_context());

    let doubled = fixture
        .run_case("doubles a number", |case| async move {
            case.step("computing locally");
            Ok(21 * 2)
        })
        .await
        .expect("case body succeeds");
    assert_eq!(doubled, 42);
    assert_eq!(fixture.state(), FixtureState::Ready);

    fixture.teardown().expect("first teardown");
    assert_eq!(fixture.state(), FixtureState::Disposed);
    assert!(!fixture.has_context());
    fixture.teardown().expect("repeated teardown is a no-op");

    let err = fixture
        .run_case("after dispose", |_case| async move { Ok(()) })
        .await
        .expect_err("cases cannot run after dispose");
    assert!(err.to_string().contains("disposed"));

    assert!(report_path.exists(), "teardown flushed the report");
}

#[tokio::test]
async fn case_before_setup_is_a_lifecycle_error() {
    let dir = TempDir::new().expect("temp dir");
    let (services, _) = scratch_run(&dir, "lifecycle_unready");

    let mut fixture = ApiFixture::new(
        FixtureConfig::new("never set up", "http://127.0.0.1:1/api"),
        &services,
    );
    let err = fixture
        .run_case("too early", |_case| async move { Ok(()) })
        .await
        .expect_err("fixture is not ready");
    assert_eq!(
        err.to_string(),
        "Invalid fixture transition: uninitialized -> running"
    );
}

#[tokio::test]
async fn second_setup_is_rejected() {
    let dir = TempDir::new().expect("temp dir");
    let (services, _) = scratch_run(&dir, "lifecycle_double_setup");

    let mut fixture = ApiFixture::new(
        FixtureConfig::new("set up twice", "http://127.0.0.1:1/api"),
        &services,
    );
    fixture.setup().await.expect("first setup");
    let err = fixture.setup().await.expect_err("second setup must fail");
    assert!(matches!(err, HarnessError::Lifecycle { .. }));
}

#[tokio::test]
async fn failed_case_is_reraised_and_recorded() {
    let dir = TempDir::new().expect("temp dir");
    let (services, report_path) = scratch_run(&dir, "lifecycle_failing_case");

    let mut fixture = ApiFixture::new(
        FixtureConfig::new("failing case", "http://127.0.0.1:1/api"),
        &services,
    );
    fixture.setup().await.expect("setup");

    let err = fixture
        .run_case("asserts the impossible", |case| async move {
            case.step("checking a response that never came");
            Err::<(), _>(HarnessError::UnexpectedStatus {
                expected: 200,
                actual: 500,
                context: "status probe".to_string(),
            })
        })
        .await
        .expect_err("case error must be re-raised");
    assert!(err.is_assertion());
    assert_eq!(fixture.state(), FixtureState::Ready, "fixture survives a failed case");

    fixture.teardown().expect("teardown");

    let summary = services.reporter().summary();
    assert_eq!(summary.nodes, 1);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.passed, 0);

    let html = std::fs::read_to_string(&report_path).expect("read report");
    assert!(html.contains("asserts the impossible"));
    assert!(html.contains("status probe"));
}

#[tokio::test]
async fn teardown_releases_context_left_by_failed_setup() {
    let dir = TempDir::new().expect("temp dir");
    let (services, _) = scratch_run(&dir, "lifecycle_failed_priming");

    // Port 1 refuses the connection, so the priming call fails without
    // touching the network.
    let config = FixtureConfig::new("failing priming", "http://127.0.0.1:1/api")
        .with_priming(PrimingCall::create("/users", json!({"name": "Test User"})));
    let mut fixture = ApiFixture::new(config, &services);

    let err = fixture
        .setup()
        .await
        .expect_err("priming cannot reach a closed port");
    assert!(!err.is_assertion(), "transport failure, not an assertion");
    assert_eq!(fixture.state(), FixtureState::Uninitialized);
    assert!(fixture.has_context(), "context stays acquired for teardown");
    assert_eq!(fixture.resource_id(), None);

    fixture.teardown().expect("teardown after failed setup");
    assert!(!fixture.has_context());
    assert_eq!(fixture.state(), FixtureState::Disposed);

    let summary = services.reporter().summary();
    assert_eq!(summary.failed, 1, "setup failure recorded on the node");
}
