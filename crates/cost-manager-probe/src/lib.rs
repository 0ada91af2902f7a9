// crates/cost-manager-probe/src/lib.rs
// ============================================================================
// Module: Cost Manager Probe Library
// Description: HTTP probes and the sequential conformance suite runner.
// Purpose: Exercise running cost-manager services against the REST contract.
// Dependencies: cost-manager-contract, reqwest, serde, time, tokio, toml, tracing, url
// ============================================================================

//! ## Overview
//! `cost-manager-probe` drives the four cost-manager services over HTTP. It
//! separates two failure classes: transport failures (connection refused,
//! timeouts, interrupted bodies) are retried by a [`RetryPolicy`] or
//! swallowed by [`safe_request`] during setup, while contract violations are
//! fatal to the probe that observed them and never retried.
//!
//! ## Invariants
//! - Probes run one at a time, in [`ProbeId::ALL`] order.
//! - A failing probe never aborts the probes after it.
//! - Setup and teardown requests never fail a run on transport errors alone.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod fixtures;
pub mod probes;
pub mod retry;
pub mod suite;
pub mod summary;

#[cfg(test)]
mod probes_tests;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use api::CostManagerApi;
pub use client::HttpReply;
pub use client::ServiceClient;
pub use client::Slash;
pub use config::ConfigError;
pub use config::FixtureConfig;
pub use config::Profile;
pub use config::ServiceEndpoints;
pub use config::ServiceKind;
pub use config::SetupMode;
pub use config::SuiteConfig;
pub use error::ProbeError;
pub use error::TransportError;
pub use error::TransportFailure;
pub use error::TransportKind;
pub use fixtures::Fixtures;
pub use probes::ProbeId;
pub use probes::UnknownProbe;
pub use retry::RetryPolicy;
pub use retry::safe_request;
pub use suite::ConformanceSuite;
pub use suite::SuiteContext;
pub use summary::FailureKind;
pub use summary::ProbeOutcome;
pub use summary::ProbeStatus;
pub use summary::SuiteSummary;
