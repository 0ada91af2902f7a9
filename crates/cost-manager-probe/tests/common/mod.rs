// crates/cost-manager-probe/tests/common/mod.rs
// ============================================================================
// Module: Probe Test Helpers
// Description: Shared helpers for cost-manager-probe integration tests.
// Purpose: Provide the in-process service stub and small assertions.
// Dependencies: axum, cost-manager-probe, tokio
// ============================================================================

//! ## Overview
//! Shared helpers for cost-manager-probe integration tests.
//! Invariants:
//! - Stubs bind ephemeral loopback ports only.
//! - Every stub stops when its handle drops.

#![allow(dead_code, reason = "Shared helpers are reused across multiple test binaries.")]

pub mod stub;

use cost_manager_probe::FailureKind;
use cost_manager_probe::ProbeId;
use cost_manager_probe::ProbeStatus;
use cost_manager_probe::SuiteSummary;

/// Fails with `message` unless `condition` holds.
pub fn require(condition: bool, message: impl Into<String>) -> Result<(), String> {
    if condition { Ok(()) } else { Err(message.into()) }
}

/// Fails unless every probe in the summary passed.
pub fn require_all_passed(summary: &SuiteSummary) -> Result<(), String> {
    require(summary.is_success(), format!("expected every probe to pass:\n{}", summary.to_text()))
}

/// Fails unless `probe` failed with `kind` and a message containing `needle`.
pub fn require_failed(
    summary: &SuiteSummary,
    probe: ProbeId,
    kind: FailureKind,
    needle: &str,
) -> Result<(), String> {
    let outcome = summary.outcome(probe).ok_or_else(|| format!("{probe} did not run"))?;
    require(
        outcome.status == ProbeStatus::Failed && outcome.failure == Some(kind),
        format!("expected {probe} to fail with {kind:?}:\n{}", summary.to_text()),
    )?;
    let message = outcome.message.as_deref().unwrap_or_default();
    require(message.contains(needle), format!("{probe} message `{message}` lacks `{needle}`"))
}

/// Fails unless exactly the listed probes failed.
pub fn require_only_failed(summary: &SuiteSummary, probes: &[ProbeId]) -> Result<(), String> {
    let failed: Vec<ProbeId> = summary
        .outcomes
        .iter()
        .filter(|outcome| outcome.status == ProbeStatus::Failed)
        .map(|outcome| outcome.probe)
        .collect();
    require(
        failed == probes,
        format!("expected failures {probes:?}, got {failed:?}:\n{}", summary.to_text()),
    )
}
