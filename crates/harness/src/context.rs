//! HTTP request context - a configured client bound to one API base URL
//!
//! All requests go through [`ApiContext`], which owns the connection pool,
//! applies the bearer token when one is configured, and returns an
//! [`ApiResponse`] instead of raising on non-success statuses. Callers
//! decide what a "wrong" status means via [`ApiResponse::expect_status`].

use std::time::Duration;

use bytes::Bytes;
use reqwest::{Method, StatusCode};
use serde_json::Value;

use crate::error::{HarnessError, HarnessResult};

/// Default per-request timeout applied when a config does not override it.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection settings for one [`ApiContext`]
#[derive(Debug, Clone)]
pub struct ContextConfig {
    /// Base URL all request paths are resolved against
    pub base_url: String,

    /// Bearer token attached to every request when present
    pub bearer_token: Option<String>,

    /// Per-request timeout
    pub timeout: Duration,
}

impl ContextConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            bearer_token: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// A client bound to one base URL.
///
/// Cloning is cheap and clones share the underlying connection pool, so a
/// context can be handed by value into per-case closures.
#[derive(Debug, Clone)]
pub struct ApiContext {
    client: reqwest::Client,
    base_url: String,
    bearer_token: Option<String>,
}

impl ApiContext {
    pub fn new(config: &ContextConfig) -> HarnessResult<Self> {
        reqwest::Url::parse(&config.base_url)
            .map_err(|e| HarnessError::InvalidUrl(format!("{}: {e}", config.base_url)))?;
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            bearer_token: config.bearer_token.clone(),
        })
    }

    /// Absolute URL for a request path, normalizing slashes at the join.
    pub fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub async fn get(&self, path: &str) -> HarnessResult<ApiResponse> {
        self.request(Method::GET, path, None).await
    }

    pub async fn post(&self, path: &str, body: &Value) -> HarnessResult<ApiResponse> {
        self.request(Method::POST, path, Some(body)).await
    }

    pub async fn put(&self, path: &str, body: &Value) -> HarnessResult<ApiResponse> {
        self.request(Method::PUT, path, Some(body)).await
    }

    pub async fn delete(&self, path: &str) -> HarnessResult<ApiResponse> {
        self.request(Method::DELETE, path, None).await
    }

    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> HarnessResult<ApiResponse> {
        let url = self.url_for(path);
        tracing::debug!(method = %method, url = %url, "sending request");

        let mut builder = self.client.request(method, &url);
        if let Some(token) = &self.bearer_token {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let body = response.bytes().await?;
        tracing::debug!(status = status.as_u16(), bytes = body.len(), "received response");

        Ok(ApiResponse { status, body })
    }
}

/// A fully-read response: status plus buffered body.
///
/// Every accessor that can fail returns an error carrying the caller's
/// context string, so a failed check reads like a sentence in the log.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    status: StatusCode,
    body: Bytes,
}

impl ApiResponse {
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Body decoded as UTF-8, with invalid bytes replaced.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Body parsed as JSON.
    pub fn json(&self) -> HarnessResult<Value> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    /// Check the status code, failing with both codes and the context.
    pub fn expect_status(&self, expected: u16, context: &str) -> HarnessResult<&Self> {
        if self.status.as_u16() == expected {
            Ok(self)
        } else {
            Err(HarnessError::UnexpectedStatus {
                expected,
                actual: self.status.as_u16(),
                context: context.to_string(),
            })
        }
    }

    /// Check that the raw body contains `needle`.
    pub fn expect_body_contains(&self, needle: &str, context: &str) -> HarnessResult<&Self> {
        if self.text().contains(needle) {
            Ok(self)
        } else {
            Err(HarnessError::BodyMismatch {
                needle: needle.to_string(),
                context: context.to_string(),
            })
        }
    }

    /// Extract a top-level unsigned integer field from the JSON body.
    pub fn require_u64(&self, field: &str, context: &str) -> HarnessResult<u64> {
        self.json()?
            .get(field)
            .and_then(Value::as_u64)
            .ok_or_else(|| HarnessError::MissingField {
                field: field.to_string(),
                context: context.to_string(),
            })
    }

    /// Extract a top-level string field from the JSON body. An empty
    /// string counts as missing.
    pub fn require_str(&self, field: &str, context: &str) -> HarnessResult<String> {
        self.json()?
            .get(field)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .ok_or_else(|| HarnessError::MissingField {
                field: field.to_string(),
                context: context.to_string(),
            })
    }
}
