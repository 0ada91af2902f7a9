// crates/cost-manager-probe/src/retry.rs
// ============================================================================
// Module: Retry Policy
// Description: Bounded retry with fixed backoff, and the safe-request wrapper.
// Purpose: Ride out cold-starting hosts without masking contract failures.
// Dependencies: tokio, tracing
// ============================================================================

//! ## Overview
//! [`RetryPolicy::run`] repeats an attempt while it fails with a transient
//! [`TransportFailure`], sleeping a fixed backoff in between, up to a fixed
//! attempt count. Any HTTP response, whatever its status, ends the loop:
//! status and shape are judged by the caller and never retried.
//! [`safe_request`] turns a transport error into `None` for setup and
//! teardown steps.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;
use tracing::warn;

use crate::TransportError;
use crate::TransportFailure;
use crate::TransportKind;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default per-request timeout against local services.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);
/// Per-request timeout against cold-starting remote hosts.
pub const REMOTE_TIMEOUT: Duration = Duration::from_secs(12);
/// Attempt count against cold-starting remote hosts.
pub const REMOTE_ATTEMPTS: u32 = 4;
/// Backoff between attempts against cold-starting remote hosts.
pub const REMOTE_BACKOFF: Duration = Duration::from_secs(3);

// ============================================================================
// SECTION: Policy
// ============================================================================

/// Timeout, attempt bound, and fixed delay applied to every request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first. Zero behaves as one.
    pub attempts: u32,
    /// Delay between attempts.
    pub backoff: Duration,
    /// Per-attempt timeout.
    pub timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::single(DEFAULT_TIMEOUT)
    }
}

impl RetryPolicy {
    /// One attempt with the given timeout.
    #[must_use]
    pub const fn single(timeout: Duration) -> Self {
        Self {
            attempts: 1,
            backoff: Duration::ZERO,
            timeout,
        }
    }

    /// Policy for hosts that sleep when idle.
    #[must_use]
    pub const fn cold_start() -> Self {
        Self {
            attempts: REMOTE_ATTEMPTS,
            backoff: REMOTE_BACKOFF,
            timeout: REMOTE_TIMEOUT,
        }
    }

    /// Runs `attempt` until it succeeds, fails permanently, or the attempt
    /// bound is reached.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] carrying the last failure and the number of
    /// attempts made.
    pub async fn run<T, F, Fut>(&self, operation: &str, attempt: F) -> Result<T, TransportError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, TransportFailure>>,
    {
        self.run_while(operation, TransportKind::is_transient, attempt).await
    }

    /// Like [`Self::run`], but only failures for which `retryable` holds are
    /// attempted again.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] carrying the last failure and the number of
    /// attempts made.
    pub async fn run_while<T, F, Fut>(
        &self,
        operation: &str,
        retryable: fn(TransportKind) -> bool,
        mut attempt: F,
    ) -> Result<T, TransportError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, TransportFailure>>,
    {
        let max_attempts = self.attempts.max(1);
        let mut made = 0u32;
        loop {
            made = made.saturating_add(1);
            match attempt().await {
                Ok(value) => return Ok(value),
                Err(failure) if retryable(failure.kind) && made < max_attempts => {
                    warn!(
                        operation,
                        attempt = made,
                        max_attempts,
                        kind = failure.kind.as_str(),
                        error = %failure.message,
                        "transient transport failure, retrying"
                    );
                    sleep(self.backoff).await;
                }
                Err(failure) => {
                    return Err(TransportError {
                        operation: operation.to_string(),
                        attempts: made,
                        failure,
                    });
                }
            }
        }
    }
}

// ============================================================================
// SECTION: Safe Request
// ============================================================================

/// Awaits a request, converting a transport error into `None`.
///
/// Used for fixture setup and teardown, where environment flakiness must not
/// be reported as a contract failure.
pub async fn safe_request<T, Fut>(request: Fut) -> Option<T>
where
    Fut: Future<Output = Result<T, TransportError>>,
{
    match request.await {
        Ok(value) => Some(value),
        Err(err) => {
            warn!(
                operation = %err.operation,
                attempts = err.attempts,
                kind = err.kind().as_str(),
                error = %err.failure.message,
                "ignoring transport failure"
            );
            None
        }
    }
}
