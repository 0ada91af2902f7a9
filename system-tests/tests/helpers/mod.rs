// system-tests/tests/helpers/mod.rs
// ============================================================================
// Module: System Test Helpers
// Description: Shared helpers for live cost-manager system-tests.
// Purpose: Provide readiness polling and artifact utilities.
// Dependencies: system-tests, cost-manager-probe
// ============================================================================

//! ## Overview
//! Shared helpers for live cost-manager system-tests.
//! Invariants:
//! - Tests never start before every service answers.
//! - Every test leaves a verdict under its run root.

pub mod artifacts;
pub mod readiness;
