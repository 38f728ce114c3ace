//! Suite bodies shared by the hermetic and live test variants
//!
//! Each scenario builds one fixture, drives its cases, and tears down on
//! every path: the drive result is combined with the teardown result so a
//! failed case never skips cleanup and a clean run still surfaces a
//! cleanup failure.

use restprobe_harness::{
    ApiFixture, FixtureConfig, HarnessError, HarnessResult, PrimingCall, TestServices,
};

use crate::payloads;

/// Full CRUD chain against the sandbox API: the priming call creates a
/// user, the cases read, update, delete and finally miss it.
pub async fn user_crud_chain(
    services: &TestServices,
    base_url: &str,
    token: &str,
) -> HarnessResult<()> {
    let config = FixtureConfig::new("sandbox user crud", base_url)
        .with_bearer_token(token)
        .with_priming(PrimingCall::create(
            "/users",
            payloads::sandbox_user("Test User"),
        ));
    let mut fixture = ApiFixture::new(config, services);
    let outcome = drive_user_crud(&mut fixture).await;
    let cleanup = fixture.teardown();
    outcome.and(cleanup)
}

async fn drive_user_crud(fixture: &mut ApiFixture) -> HarnessResult<()> {
    fixture.setup().await?;

    fixture
        .run_case("reads the created user", |case| async move {
            let id = case.require_resource_id()?;
            case.step(format!("GET /users/{id}"));
            let resp = case.api.get(&format!("/users/{id}")).await?;
            resp.expect_status(200, "read created user")?
                .expect_body_contains("Test User", "read created user")?;
            let round_tripped = resp.require_u64("id", "read created user")?;
            if round_tripped != id {
                return Err(HarnessError::BodyMismatch {
                    needle: id.to_string(),
                    context: "created user id round-trip".to_string(),
                });
            }
            Ok(())
        })
        .await?;

    fixture
        .run_case("updates the created user", |case| async move {
            let id = case.require_resource_id()?;
            case.step(format!("PUT /users/{id}"));
            let body = payloads::sandbox_user_update("Renamed User", "inactive");
            let resp = case.api.put(&format!("/users/{id}"), &body).await?;
            resp.expect_status(200, "update created user")?
                .expect_body_contains("Renamed User", "update created user")?
                .expect_body_contains("inactive", "update created user")?;
            Ok(())
        })
        .await?;

    fixture
        .run_case("deletes the created user", |case| async move {
            let id = case.require_resource_id()?;
            case.step(format!("DELETE /users/{id}"));
            let resp = case.api.delete(&format!("/users/{id}")).await?;
            resp.expect_status(204, "delete created user")?;
            Ok(())
        })
        .await?;

    fixture
        .run_case("read after delete yields 404", |case| async move {
            let id = case.require_resource_id()?;
            case.step(format!("GET /users/{id} after delete"));
            let resp = case.api.get(&format!("/users/{id}")).await?;
            resp.expect_status(404, "read deleted user")?;
            Ok(())
        })
        .await?;

    Ok(())
}

/// Mock-API user scenarios: seeded lookup, 404 for an absent id, and the
/// echo-style create/update/delete.
pub async fn mock_user_scenarios(services: &TestServices, base_url: &str) -> HarnessResult<()> {
    let mut fixture = ApiFixture::new(FixtureConfig::new("mock api users", base_url), services);
    let outcome = drive_mock_users(&mut fixture).await;
    let cleanup = fixture.teardown();
    outcome.and(cleanup)
}

async fn drive_mock_users(fixture: &mut ApiFixture) -> HarnessResult<()> {
    fixture.setup().await?;

    fixture
        .run_case("fetches a known user", |case| async move {
            case.step("GET /users/2");
            let resp = case.api.get("/users/2").await?;
            resp.expect_status(200, "fetch known user")?
                .expect_body_contains("janet.weaver@reqres.in", "fetch known user")?;
            Ok(())
        })
        .await?;

    fixture
        .run_case("missing user yields 404", |case| async move {
            case.step("GET /users/23");
            let resp = case.api.get("/users/23").await?;
            resp.expect_status(404, "fetch missing user")?;
            Ok(())
        })
        .await?;

    fixture
        .run_case("creates a user echoing the payload", |case| async move {
            case.step("POST /users");
            let body = payloads::mock_user("Test User", "2024: QA Analyst");
            let resp = case.api.post("/users", &body).await?;
            resp.expect_status(201, "create user")?
                .expect_body_contains("Test User", "create user")?
                .expect_body_contains("2024: QA Analyst", "create user")?;
            resp.require_str("createdAt", "create user")?;
            Ok(())
        })
        .await?;

    fixture
        .run_case("updates a user echoing the payload", |case| async move {
            case.step("PUT /users/2");
            let body = payloads::mock_user("Updated User", "2025: QA Lead");
            let resp = case.api.put("/users/2", &body).await?;
            resp.expect_status(200, "update user")?
                .expect_body_contains("Updated User", "update user")?;
            resp.require_str("updatedAt", "update user")?;
            Ok(())
        })
        .await?;

    fixture
        .run_case("removes a user", |case| async move {
            case.step("DELETE /users/2");
            let resp = case.api.delete("/users/2").await?;
            resp.expect_status(204, "delete user")?;
            Ok(())
        })
        .await?;

    Ok(())
}

/// Register/login scenarios against the mock API's fixed account.
pub async fn auth_scenarios(services: &TestServices, base_url: &str) -> HarnessResult<()> {
    let mut fixture = ApiFixture::new(FixtureConfig::new("mock api auth", base_url), services);
    let outcome = drive_auth(&mut fixture).await;
    let cleanup = fixture.teardown();
    outcome.and(cleanup)
}

async fn drive_auth(fixture: &mut ApiFixture) -> HarnessResult<()> {
    fixture.setup().await?;

    fixture
        .run_case("registers the defined account", |case| async move {
            case.step("POST /register");
            let body = payloads::register(
                payloads::REGISTERED_EMAIL,
                Some(payloads::REGISTER_PASSWORD),
            );
            let resp = case.api.post("/register", &body).await?;
            resp.expect_status(200, "register")?;
            resp.require_u64("id", "register")?;
            let token = resp.require_str("token", "register")?;
            case.step(format!("registration token has {} characters", token.len()));
            Ok(())
        })
        .await?;

    fixture
        .run_case("register without password is rejected", |case| async move {
            case.step("POST /register without password");
            let body = payloads::register(payloads::REGISTERED_EMAIL, None);
            let resp = case.api.post("/register", &body).await?;
            resp.expect_status(400, "register without password")?
                .expect_body_contains("Missing password", "register without password")?;
            Ok(())
        })
        .await?;

    fixture
        .run_case("logs in with valid credentials", |case| async move {
            case.step("POST /login");
            let body = payloads::login(
                payloads::REGISTERED_EMAIL,
                Some(payloads::LOGIN_PASSWORD),
            );
            let resp = case.api.post("/login", &body).await?;
            resp.expect_status(200, "login")?;
            resp.require_str("token", "login")?;
            Ok(())
        })
        .await?;

    fixture
        .run_case("login without password is rejected", |case| async move {
            case.step("POST /login without password");
            let body = payloads::login(payloads::REGISTERED_EMAIL, None);
            let resp = case.api.post("/login", &body).await?;
            resp.expect_status(400, "login without password")?
                .expect_body_contains("Missing password", "login without password")?;
            Ok(())
        })
        .await?;

    Ok(())
}
