// system-tests/src/lib.rs
// ============================================================================
// Module: Cost Manager System Tests Library
// Description: Shared configuration for live system test scenarios.
// Purpose: Provide common utilities for system-test binaries.
// Dependencies: cost-manager-probe
// ============================================================================

//! ## Overview
//! This crate hosts shared configuration used by the live system-tests
//! binaries in `system-tests/tests`. They run the conformance suite against
//! a real deployment and are gated behind the `system-tests` feature.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
