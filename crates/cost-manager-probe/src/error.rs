// crates/cost-manager-probe/src/error.rs
// ============================================================================
// Module: Probe Errors
// Description: Transport and probe error types.
// Purpose: Keep infrastructure flakiness apart from contract violations.
// Dependencies: cost-manager-contract, reqwest, thiserror
// ============================================================================

//! ## Overview
//! [`TransportFailure`] is a single failed attempt, classified from the
//! underlying `reqwest` error. [`TransportError`] is what remains once the
//! retry policy gave up. [`ProbeError`] is what a probe returns.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::error::Error as _;

use cost_manager_contract::ContractViolation;
use thiserror::Error;

// ============================================================================
// SECTION: Transport
// ============================================================================

/// Classification of a failed HTTP attempt.
///
/// # Invariants
/// - Variants are stable labels for logs and summaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    /// Connection could not be established.
    Connect,
    /// Request or response exceeded the timeout.
    Timeout,
    /// Connection dropped mid-exchange (reset, broken pipe, EOF).
    Interrupted,
    /// Response body could not be read to the end.
    Body,
    /// Request could not be built (bad URL, client construction).
    Build,
    /// Any other client error.
    Other,
}

impl TransportKind {
    /// Returns true when another attempt may succeed.
    #[must_use]
    pub const fn is_transient(self) -> bool {
        matches!(self, Self::Connect | Self::Timeout | Self::Interrupted | Self::Body)
    }

    /// Returns true when the request never reached the server.
    #[must_use]
    pub const fn is_unsent(self) -> bool {
        matches!(self, Self::Connect)
    }

    /// Returns a stable label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Connect => "connect",
            Self::Timeout => "timeout",
            Self::Interrupted => "interrupted",
            Self::Body => "body",
            Self::Build => "build",
            Self::Other => "other",
        }
    }
}

/// A single failed attempt.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{} error: {message}", .kind.as_str())]
pub struct TransportFailure {
    /// Failure class.
    pub kind: TransportKind,
    /// Underlying error text.
    pub message: String,
}

impl TransportFailure {
    /// Creates a failure of the given kind.
    #[must_use]
    pub fn new(kind: TransportKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Classifies a `reqwest` error.
    #[must_use]
    pub fn from_reqwest(err: &reqwest::Error) -> Self {
        Self::new(classify(err), error_chain(err))
    }
}

/// Transport failure after the retry policy is exhausted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{operation} failed after {attempts} attempt(s): {failure}")]
pub struct TransportError {
    /// Method and path, or another label for the operation.
    pub operation: String,
    /// Attempts made, including the last one.
    pub attempts: u32,
    /// Last observed failure.
    pub failure: TransportFailure,
}

impl TransportError {
    /// Returns the failure class of the last attempt.
    #[must_use]
    pub const fn kind(&self) -> TransportKind {
        self.failure.kind
    }
}

// ============================================================================
// SECTION: Probe Errors
// ============================================================================

/// Why a probe failed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProbeError {
    /// The service could not be reached.
    #[error("transport: {0}")]
    Transport(#[from] TransportError),
    /// The service answered outside the contract.
    #[error("contract: {0}")]
    Contract(#[from] ContractViolation),
    /// Fixture setup failed, so the probe did not run.
    #[error("setup: {0}")]
    Setup(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Maps a `reqwest` error onto a [`TransportKind`].
fn classify(err: &reqwest::Error) -> TransportKind {
    if err.is_builder() {
        return TransportKind::Build;
    }
    if err.is_timeout() {
        return TransportKind::Timeout;
    }
    if err.is_connect() {
        return TransportKind::Connect;
    }
    if err.is_body() || err.is_decode() {
        return TransportKind::Body;
    }
    let message = error_chain(err).to_ascii_lowercase();
    let interrupted = message.contains("connection reset")
        || message.contains("connection closed")
        || message.contains("connection aborted")
        || message.contains("broken pipe")
        || message.contains("incomplete message")
        || message.contains("eof");
    if interrupted {
        return TransportKind::Interrupted;
    }
    if message.contains("timed out") {
        return TransportKind::Timeout;
    }
    TransportKind::Other
}

/// Joins an error and its sources with `: `.
fn error_chain(err: &reqwest::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
