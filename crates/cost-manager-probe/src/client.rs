// crates/cost-manager-probe/src/client.rs
// ============================================================================
// Module: Service Client
// Description: HTTP client bound to one service base URL.
// Purpose: Send JSON requests under the retry policy and capture replies.
// Dependencies: reqwest, serde_json, tracing, url
// ============================================================================

//! ## Overview
//! [`ServiceClient`] joins request paths onto a service base URL, sends them
//! through [`RetryPolicy::run`], and returns an [`HttpReply`] holding the
//! status, the raw text, and the decoded JSON body. Replies are never judged
//! here; status and shape checks belong to the probes.
//!
//! A `POST` that timed out may already have been applied, so non-idempotent
//! requests are only retried when the connection was never established.

// ============================================================================
// SECTION: Imports
// ============================================================================

use cost_manager_contract::ContractViolation;
use cost_manager_contract::expect_status;
use reqwest::Method;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::RetryPolicy;
use crate::TransportError;
use crate::TransportFailure;
use crate::TransportKind;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum characters of a non-JSON body quoted in a violation.
const BODY_SNIPPET_CHARS: usize = 120;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Whether a route is requested with a trailing slash.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Slash {
    /// `/api/about`
    #[default]
    Bare,
    /// `/api/about/`
    Trailing,
}

impl Slash {
    /// Applies the flag to a route.
    #[must_use]
    pub fn apply(self, route: &str) -> String {
        match self {
            Self::Bare => route.to_string(),
            Self::Trailing => format!("{}/", route.trim_end_matches('/')),
        }
    }
}

/// A received HTTP response.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpReply {
    /// Request method.
    pub method: Method,
    /// Requested URL, query included.
    pub url: Url,
    /// Status code.
    pub status: u16,
    /// Decoded body; `Null` when the body is empty or not JSON.
    pub body: Value,
    /// Raw body text.
    pub text: String,
    /// Attempts it took to get the response.
    pub attempts: u32,
}

impl HttpReply {
    /// Returns `METHOD /path` for diagnostics.
    #[must_use]
    pub fn endpoint(&self) -> String {
        format!("{} {}", self.method, self.url.path())
    }

    /// Fails unless the status is one of `allowed`.
    ///
    /// # Errors
    ///
    /// Returns [`ContractViolation::UnexpectedStatus`] on mismatch.
    pub fn expect_status(&self, allowed: &[u16]) -> Result<&Self, ContractViolation> {
        expect_status(&self.endpoint(), self.status, allowed)?;
        Ok(self)
    }

    /// Returns the decoded body.
    ///
    /// # Errors
    ///
    /// Returns [`ContractViolation::InvalidBody`] when the body was empty or
    /// not JSON.
    pub fn json(&self) -> Result<&Value, ContractViolation> {
        if self.body.is_null() {
            let reason = if self.text.trim().is_empty() {
                "body is empty".to_string()
            } else {
                let snippet: String = self.text.chars().take(BODY_SNIPPET_CHARS).collect();
                format!("body is not JSON: {snippet}")
            };
            return Err(ContractViolation::InvalidBody {
                endpoint: self.endpoint(),
                reason,
            });
        }
        Ok(&self.body)
    }
}

// ============================================================================
// SECTION: Client
// ============================================================================

/// HTTP client for one service.
#[derive(Debug, Clone)]
pub struct ServiceClient {
    /// Service name used in operation labels.
    name: &'static str,
    /// Base URL every path is joined onto.
    base: Url,
    /// Shared connection pool.
    http: reqwest::Client,
    /// Timeout and retry bounds.
    retry: RetryPolicy,
}

impl ServiceClient {
    /// Creates a client sharing an existing `reqwest` connection pool.
    #[must_use]
    pub const fn new(
        name: &'static str,
        base: Url,
        http: reqwest::Client,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            name,
            base,
            http,
            retry,
        }
    }

    /// Returns the service name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the service base URL.
    #[must_use]
    pub const fn base(&self) -> &Url {
        &self.base
    }

    /// Sends `GET path?query`.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when no response arrives within the retry
    /// policy.
    pub async fn get(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<HttpReply, TransportError> {
        self.send(Method::GET, path, query, None).await
    }

    /// Sends `POST path` with a JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when no response arrives within the retry
    /// policy.
    pub async fn post_json(&self, path: &str, body: &Value) -> Result<HttpReply, TransportError> {
        self.send(Method::POST, path, &[], Some(body)).await
    }

    /// Sends `DELETE path` with a JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when no response arrives within the retry
    /// policy.
    pub async fn delete_json(
        &self,
        path: &str,
        body: &Value,
    ) -> Result<HttpReply, TransportError> {
        self.send(Method::DELETE, path, &[], Some(body)).await
    }

    /// Joins `path` onto the base URL and appends `query`.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when the base URL cannot carry a path.
    pub fn url(&self, path: &str, query: &[(&str, String)]) -> Result<Url, TransportError> {
        if self.base.cannot_be_a_base() {
            return Err(TransportError {
                operation: format!("{} {path}", self.name),
                attempts: 1,
                failure: TransportFailure::new(
                    TransportKind::Build,
                    format!("{} cannot carry a path", self.base),
                ),
            });
        }
        let mut url = self.base.clone();
        url.set_path(&format!("{}{path}", self.base.path().trim_end_matches('/')));
        url.set_query(None);
        url.set_fragment(None);
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (name, value) in query {
                pairs.append_pair(name, value);
            }
        }
        Ok(url)
    }

    /// Sends a request under the retry policy.
    async fn send(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&Value>,
    ) -> Result<HttpReply, TransportError> {
        let url = self.url(path, query)?;
        let operation = format!("{} {method} {path}", self.name);
        let mut attempts = 0u32;
        let retryable = if method.is_idempotent() {
            TransportKind::is_transient
        } else {
            TransportKind::is_unsent
        };
        let (status, text) = self
            .retry
            .run_while(&operation, retryable, || {
                attempts = attempts.saturating_add(1);
                self.send_once(method.clone(), url.clone(), body)
            })
            .await?;
        let decoded = serde_json::from_str(&text).unwrap_or(Value::Null);
        debug!(
            service = self.name,
            method = %method,
            url = %url,
            status,
            attempts,
            "http exchange"
        );
        Ok(HttpReply {
            method,
            url,
            status,
            body: decoded,
            text,
            attempts,
        })
    }

    /// Sends one attempt and reads the whole body.
    async fn send_once(
        &self,
        method: Method,
        url: Url,
        body: Option<&Value>,
    ) -> Result<(u16, String), TransportFailure> {
        let mut request = self.http.request(method, url).timeout(self.retry.timeout);
        if let Some(body) = body {
            request = request.json(body);
        }
        let response =
            request.send().await.map_err(|err| TransportFailure::from_reqwest(&err))?;
        let status = response.status().as_u16();
        let text = response.text().await.map_err(|err| TransportFailure::from_reqwest(&err))?;
        Ok((status, text))
    }
}
