//! In-process stand-ins for the two public REST services
//!
//! Hermetic suite runs spawn these on an ephemeral loopback port and point
//! the fixtures at [`StubApi::base_url`]. The mock-API stand-in mimics the
//! public mock service: a handful of seeded users, echo-style create and
//! update, and the fixed register/login account. The sandbox stand-in is
//! stateful CRUD behind a bearer check, with server-assigned ids.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use parking_lot::Mutex;
use serde_json::{json, Value};

use crate::payloads::REGISTERED_EMAIL;

/// Token the stand-in hands out for successful register/login calls.
pub const STUB_TOKEN: &str = "QpwL5tke4Pnpja7X4";

/// A spawned stand-in server. Dropping the handle stops it.
pub struct StubApi {
    addr: SocketAddr,
    prefix: &'static str,
    task: tokio::task::JoinHandle<()>,
}

impl StubApi {
    /// Stand-in for the mock REST API, served under `/api`.
    pub async fn spawn_mock() -> std::io::Result<Self> {
        Self::spawn(mock_router(), "/api").await
    }

    /// Stand-in for the sandbox API, served under `/public/v2`.
    pub async fn spawn_sandbox() -> std::io::Result<Self> {
        Self::spawn(sandbox_router(), "/public/v2").await
    }

    async fn spawn(router: Router, prefix: &'static str) -> std::io::Result<Self> {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let app = Router::new().nest(prefix, router);
        let task = tokio::spawn(async move {
            if let Err(err) = axum::serve(listener, app).await {
                tracing::warn!(error = %err, "stand-in server exited");
            }
        });
        tracing::debug!(%addr, prefix, "stand-in server listening");
        Ok(Self { addr, prefix, task })
    }

    /// Base URL including the service prefix, ready for a fixture config.
    pub fn base_url(&self) -> String {
        format!("http://{}{}", self.addr, self.prefix)
    }
}

impl Drop for StubApi {
    fn drop(&mut self) {
        self.task.abort();
    }
}

// --- mock REST API ---

#[derive(Clone)]
struct MockState {
    users: Arc<HashMap<u64, Value>>,
    next_id: Arc<AtomicU64>,
}

fn seeded_users() -> HashMap<u64, Value> {
    let rows = [
        (1, "george.bluth@reqres.in", "George", "Bluth"),
        (2, "janet.weaver@reqres.in", "Janet", "Weaver"),
        (3, "emma.wong@reqres.in", "Emma", "Wong"),
    ];
    rows.into_iter()
        .map(|(id, email, first, last)| {
            let user = json!({
                "id": id,
                "email": email,
                "first_name": first,
                "last_name": last,
            });
            (id, user)
        })
        .collect()
}

fn mock_router() -> Router {
    let state = MockState {
        users: Arc::new(seeded_users()),
        next_id: Arc::new(AtomicU64::new(101)),
    };
    Router::new()
        .route("/users", post(mock_create_user))
        .route(
            "/users/:id",
            get(mock_get_user)
                .put(mock_update_user)
                .delete(mock_delete_user),
        )
        .route("/register", post(mock_register))
        .route("/login", post(mock_login))
        .with_state(state)
}

async fn mock_get_user(
    State(state): State<MockState>,
    Path(id): Path<u64>,
) -> (StatusCode, Json<Value>) {
    match state.users.get(&id) {
        Some(user) => (StatusCode::OK, Json(json!({ "data": user }))),
        None => (StatusCode::NOT_FOUND, Json(json!({}))),
    }
}

// The real service does not persist creates; this echoes like it does.
async fn mock_create_user(
    State(state): State<MockState>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let id = state.next_id.fetch_add(1, Ordering::Relaxed);
    let mut user = body;
    user["id"] = json!(id);
    user["createdAt"] = json!(Utc::now().to_rfc3339());
    (StatusCode::CREATED, Json(user))
}

async fn mock_update_user(
    Path(_id): Path<u64>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let mut user = body;
    user["updatedAt"] = json!(Utc::now().to_rfc3339());
    (StatusCode::OK, Json(user))
}

async fn mock_delete_user(Path(_id): Path<u64>) -> StatusCode {
    StatusCode::NO_CONTENT
}

fn credentials(body: &Value) -> (Option<&str>, Option<&str>) {
    let field = |name: &str| {
        body.get(name)
            .and_then(Value::as_str)
            .filter(|v| !v.is_empty())
    };
    (field("email"), field("password"))
}

async fn mock_register(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    match credentials(&body) {
        (None, _) => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Missing email or username" })),
        ),
        (_, None) => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Missing password" })),
        ),
        (Some(email), Some(_)) if email == REGISTERED_EMAIL => (
            StatusCode::OK,
            Json(json!({ "id": 4, "token": STUB_TOKEN })),
        ),
        _ => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Note: Only defined users succeed registration" })),
        ),
    }
}

async fn mock_login(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    match credentials(&body) {
        (None, _) => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Missing email or username" })),
        ),
        (_, None) => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Missing password" })),
        ),
        (Some(email), Some(_)) if email == REGISTERED_EMAIL => {
            (StatusCode::OK, Json(json!({ "token": STUB_TOKEN })))
        }
        _ => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "user not found" })),
        ),
    }
}

// --- sandbox API ---

#[derive(Clone)]
struct SandboxState {
    users: Arc<Mutex<HashMap<u64, Value>>>,
    next_id: Arc<AtomicU64>,
}

fn sandbox_router() -> Router {
    let state = SandboxState {
        users: Arc::new(Mutex::new(HashMap::new())),
        next_id: Arc::new(AtomicU64::new(1000)),
    };
    Router::new()
        .route("/users", post(sandbox_create_user))
        .route(
            "/users/:id",
            get(sandbox_get_user)
                .put(sandbox_update_user)
                .delete(sandbox_delete_user),
        )
        .with_state(state)
}

fn bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .filter(|token| !token.is_empty())
}

fn unauthenticated() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "message": "Authentication failed" })),
    )
        .into_response()
}

fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "message": "Resource not found" })),
    )
        .into_response()
}

async fn sandbox_create_user(
    State(state): State<SandboxState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if bearer(&headers).is_none() {
        return unauthenticated();
    }

    let blank: Vec<Value> = ["name", "email", "gender", "status"]
        .iter()
        .filter(|field| {
            body.get(**field)
                .and_then(Value::as_str)
                .map_or(true, str::is_empty)
        })
        .map(|field| json!({ "field": field, "message": "can't be blank" }))
        .collect();
    if !blank.is_empty() {
        return (StatusCode::UNPROCESSABLE_ENTITY, Json(Value::Array(blank))).into_response();
    }

    let id = state.next_id.fetch_add(1, Ordering::Relaxed);
    let mut user = body;
    user["id"] = json!(id);
    state.users.lock().insert(id, user.clone());
    (StatusCode::CREATED, Json(user)).into_response()
}

async fn sandbox_get_user(State(state): State<SandboxState>, Path(id): Path<u64>) -> Response {
    match state.users.lock().get(&id) {
        Some(user) => (StatusCode::OK, Json(user.clone())).into_response(),
        None => not_found(),
    }
}

async fn sandbox_update_user(
    State(state): State<SandboxState>,
    Path(id): Path<u64>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if bearer(&headers).is_none() {
        return unauthenticated();
    }
    let mut users = state.users.lock();
    let Some(user) = users.get_mut(&id) else {
        return not_found();
    };
    if let Some(fields) = body.as_object() {
        for (key, value) in fields {
            user[key.as_str()] = value.clone();
        }
    }
    (StatusCode::OK, Json(user.clone())).into_response()
}

async fn sandbox_delete_user(
    State(state): State<SandboxState>,
    Path(id): Path<u64>,
    headers: HeaderMap,
) -> Response {
    if bearer(&headers).is_none() {
        return unauthenticated();
    }
    match state.users.lock().remove(&id) {
        Some(_) => StatusCode::NO_CONTENT.into_response(),
        None => not_found(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use restprobe_harness::{ApiContext, ContextConfig};

    #[tokio::test]
    async fn mock_stand_in_serves_seeded_users() {
        let stub = StubApi::spawn_mock().await.expect("spawn mock stand-in");
        let ctx = ApiContext::new(&ContextConfig::new(stub.base_url())).expect("context");

        let resp = ctx.get("/users/2").await.expect("request");
        resp.expect_status(200, "seeded user").expect("status");
        resp.expect_body_contains("janet.weaver@reqres.in", "seeded user body")
            .expect("body");

        let resp = ctx.get("/users/23").await.expect("request");
        resp.expect_status(404, "absent user").expect("status");
    }

    #[tokio::test]
    async fn sandbox_stand_in_gates_writes_behind_bearer() {
        let stub = StubApi::spawn_sandbox().await.expect("spawn sandbox stand-in");

        let anonymous = ApiContext::new(&ContextConfig::new(stub.base_url())).expect("context");
        let resp = anonymous
            .post("/users", &crate::payloads::sandbox_user("Gate Check"))
            .await
            .expect("request");
        resp.expect_status(401, "write without token").expect("status");

        let mut config = ContextConfig::new(stub.base_url());
        config.bearer_token = Some("stub-token".to_string());
        let authed = ApiContext::new(&config).expect("context");
        let resp = authed
            .post("/users", &crate::payloads::sandbox_user("Gate Check"))
            .await
            .expect("request");
        resp.expect_status(201, "write with token").expect("status");
        let id = resp.require_u64("id", "created id").expect("id");
        assert!(id >= 1000);
    }

    #[tokio::test]
    async fn sandbox_stand_in_rejects_blank_fields() {
        let stub = StubApi::spawn_sandbox().await.expect("spawn sandbox stand-in");
        let mut config = ContextConfig::new(stub.base_url());
        config.bearer_token = Some("stub-token".to_string());
        let ctx = ApiContext::new(&config).expect("context");

        let resp = ctx
            .post("/users", &json!({ "name": "No Email" }))
            .await
            .expect("request");
        resp.expect_status(422, "invalid payload").expect("status");
        resp.expect_body_contains("can't be blank", "validation body")
            .expect("body");
    }
}
