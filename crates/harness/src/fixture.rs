//! Fixture lifecycle - context acquisition, per-case wrapping, teardown
//!
//! An [`ApiFixture`] moves through `Uninitialized -> Ready -> (Running ->
//! Ready)* -> Disposed`. Setup acquires the request context and optionally
//! issues a priming call whose response id is cached for later cases.
//! [`ApiFixture::run_case`] is the single place that records pass/fail
//! outcomes; case bodies only narrate and assert. Teardown releases the
//! context and flushes report and log on every path, including after a
//! failed setup.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use serde_json::Value;

use crate::context::{ApiContext, ContextConfig, DEFAULT_TIMEOUT};
use crate::error::{HarnessError, HarnessResult};
use crate::report::ReportNode;
use crate::services::TestServices;

/// Lifecycle position of a fixture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixtureState {
    Uninitialized,
    Ready,
    Running,
    Disposed,
}

impl fmt::Display for FixtureState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FixtureState::Uninitialized => "uninitialized",
            FixtureState::Ready => "ready",
            FixtureState::Running => "running",
            FixtureState::Disposed => "disposed",
        };
        f.write_str(name)
    }
}

/// A POST issued once during setup to create the resource the suite's
/// cases chain on. The integer `id_field` of the response body is cached
/// as the fixture's resource id.
#[derive(Debug, Clone)]
pub struct PrimingCall {
    pub path: String,
    pub body: Value,
    pub expect_status: u16,
    pub id_field: String,
}

impl PrimingCall {
    /// A create-style priming call: expects 201 and reads `id`.
    pub fn create(path: impl Into<String>, body: Value) -> Self {
        Self {
            path: path.into(),
            body,
            expect_status: 201,
            id_field: "id".to_string(),
        }
    }
}

/// Everything that varies between suites: target URL, credentials, the
/// report node name, and the optional priming call.
#[derive(Debug, Clone)]
pub struct FixtureConfig {
    pub name: String,
    pub base_url: String,
    pub bearer_token: Option<String>,
    pub timeout: Duration,
    pub priming: Option<PrimingCall>,
}

impl FixtureConfig {
    pub fn new(name: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            base_url: base_url.into(),
            bearer_token: None,
            timeout: DEFAULT_TIMEOUT,
            priming: None,
        }
    }

    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    pub fn with_priming(mut self, priming: PrimingCall) -> Self {
        self.priming = Some(priming);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// What a case body gets to work with. Cloneable so the body can own it;
/// all clones talk to the same report node and connection pool.
#[derive(Clone)]
pub struct CaseContext {
    pub api: ApiContext,
    pub node: ReportNode,
    pub resource_id: Option<u64>,
}

impl CaseContext {
    /// Narrate a step into both the log and the report node.
    pub fn step(&self, message: impl Into<String>) {
        let message = message.into();
        tracing::info!("{message}");
        self.node.info(message);
    }

    /// The id cached by the priming call.
    pub fn require_resource_id(&self) -> HarnessResult<u64> {
        self.resource_id.ok_or_else(|| {
            HarnessError::Setup("no cached resource id; fixture was not primed".to_string())
        })
    }
}

/// One suite's fixture: a report node, a request context and the cached
/// priming id, advanced through the lifecycle by `setup`, `run_case` and
/// `teardown`.
pub struct ApiFixture {
    name: String,
    context_config: ContextConfig,
    priming: Option<PrimingCall>,
    services: TestServices,
    node: ReportNode,
    state: FixtureState,
    ctx: Option<ApiContext>,
    resource_id: Option<u64>,
}

impl ApiFixture {
    /// Construct the fixture and its report node. No IO happens here;
    /// the context is acquired in [`ApiFixture::setup`].
    pub fn new(config: FixtureConfig, services: &TestServices) -> Self {
        let node = services.reporter().add_node(&config.name);
        Self {
            context_config: ContextConfig {
                base_url: config.base_url,
                bearer_token: config.bearer_token,
                timeout: config.timeout,
            },
            name: config.name,
            priming: config.priming,
            services: services.clone(),
            node,
            state: FixtureState::Uninitialized,
            ctx: None,
            resource_id: None,
        }
    }

    pub fn state(&self) -> FixtureState {
        self.state
    }

    pub fn has_context(&self) -> bool {
        self.ctx.is_some()
    }

    /// The id cached by the priming call, once setup succeeded.
    pub fn resource_id(&self) -> Option<u64> {
        self.resource_id
    }

    /// Acquire the request context and run the priming call if configured.
    ///
    /// A priming failure is fixture-fatal: the error is logged, recorded
    /// as a Fail event and returned, but the already-acquired context is
    /// kept so teardown can release it.
    pub async fn setup(&mut self) -> HarnessResult<()> {
        if self.state != FixtureState::Uninitialized {
            return Err(HarnessError::Lifecycle {
                from: self.state.to_string(),
                to: FixtureState::Ready.to_string(),
            });
        }

        tracing::info!(
            fixture = %self.name,
            url = %self.context_config.base_url,
            "setting up fixture"
        );
        self.node.info(format!(
            "acquiring request context for {}",
            self.context_config.base_url
        ));

        let ctx = match ApiContext::new(&self.context_config) {
            Ok(ctx) => ctx,
            Err(err) => {
                tracing::error!(fixture = %self.name, error = %err, "cannot acquire request context");
                self.node.fail(format!("setup failed: {err}"));
                return Err(err);
            }
        };
        self.ctx = Some(ctx.clone());

        if let Some(priming) = &self.priming {
            let primed: HarnessResult<u64> = async {
                let response = ctx.post(&priming.path, &priming.body).await?;
                response.expect_status(priming.expect_status, "priming call")?;
                response.require_u64(&priming.id_field, "priming call")
            }
            .await;

            match primed {
                Ok(id) => {
                    tracing::info!(fixture = %self.name, resource_id = id, "priming call cached resource id");
                    self.node.info(format!("priming call cached resource id {id}"));
                    self.resource_id = Some(id);
                }
                Err(err) => {
                    tracing::error!(fixture = %self.name, error = %err, "fixture setup failed");
                    self.node.fail(format!("setup failed: {err}"));
                    return Err(err);
                }
            }
        }

        self.state = FixtureState::Ready;
        Ok(())
    }

    /// Run one case body, recording its outcome.
    ///
    /// On success a Pass event is recorded; on failure the error is logged
    /// with the case name, recorded as a Fail event, and returned to the
    /// caller unchanged.
    pub async fn run_case<F, Fut, T>(&mut self, name: &str, body: F) -> HarnessResult<T>
    where
        F: FnOnce(CaseContext) -> Fut,
        Fut: Future<Output = HarnessResult<T>>,
    {
        if self.state != FixtureState::Ready {
            return Err(HarnessError::Lifecycle {
                from: self.state.to_string(),
                to: FixtureState::Running.to_string(),
            });
        }
        let Some(api) = self.ctx.clone() else {
            return Err(HarnessError::Setup(format!(
                "fixture {} has no request context",
                self.name
            )));
        };

        self.state = FixtureState::Running;
        tracing::info!(fixture = %self.name, case = name, "running case");

        let case = CaseContext {
            api,
            node: self.node.clone(),
            resource_id: self.resource_id,
        };
        let outcome = body(case).await;
        self.state = FixtureState::Ready;

        match outcome {
            Ok(value) => {
                tracing::info!(fixture = %self.name, case = name, "case passed");
                self.node.pass(name);
                Ok(value)
            }
            Err(err) => {
                tracing::error!(fixture = %self.name, case = name, error = %err, "case failed");
                self.node.fail(format!("{name}: {err}"));
                Err(err)
            }
        }
    }

    /// Release the context, flush the report, flush the log.
    ///
    /// Every step runs even when an earlier one fails; the first failure
    /// is returned once all steps completed. Calling teardown again is a
    /// no-op. Usable after a failed setup, where it releases the context
    /// the setup left behind.
    pub fn teardown(&mut self) -> HarnessResult<()> {
        if self.state == FixtureState::Disposed {
            return Ok(());
        }

        tracing::info!(fixture = %self.name, "tearing down fixture");
        if self.ctx.take().is_some() {
            tracing::debug!(fixture = %self.name, "request context released");
        }

        let mut first_err = None;
        if let Err(err) = self.services.reporter().flush() {
            tracing::warn!(fixture = %self.name, error = %err, "report flush failed");
            first_err = Some(err);
        }
        self.services.log().flush();

        self.state = FixtureState::Disposed;
        match first_err {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl Drop for ApiFixture {
    fn drop(&mut self) {
        if self.state != FixtureState::Disposed && self.ctx.take().is_some() {
            tracing::warn!(
                fixture = %self.name,
                "fixture dropped without teardown; releasing request context"
            );
        }
    }
}
